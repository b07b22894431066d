// src/core/scanner/target.rs

use crate::core::error::RedinkError;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use std::net::IpAddr;
use tracing::{debug, error, info};
use url::Url;

/// Reduces user input to a bare host.
///
/// Accepts plain hosts, `host:port`, and full URLs (`https://example.com/x`).
/// Bracketed IPv6 literals lose their brackets.
pub fn normalize_target(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.parse::<IpAddr>().is_ok() {
        return trimmed.to_string();
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("scan://{}", trimmed)
    };

    Url::parse(&with_scheme)
        .ok()
        .and_then(|url| url.host_str().map(|h| h.trim_matches(['[', ']']).to_string()))
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Resolves a domain name or literal address.
///
/// Literal addresses are returned without touching DNS. This is the only
/// fatal stage of the pipeline: any failure aborts the scan with
/// [`RedinkError::TargetResolution`].
pub async fn resolve_target(target: &str) -> Result<IpAddr, RedinkError> {
    let host = normalize_target(target);
    if host.is_empty() {
        return Err(RedinkError::TargetResolution {
            target: target.to_string(),
            reason: "empty target".to_string(),
        });
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        debug!(%ip, "Target is a literal address.");
        return Ok(ip);
    }

    info!(target = %host, "Resolving target.");
    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

    match resolver.lookup_ip(host.as_str()).await {
        Ok(lookup) => match lookup.iter().next() {
            Some(ip) => {
                info!(target = %host, %ip, "Target resolved.");
                Ok(ip)
            }
            None => {
                error!(target = %host, "Resolution returned no addresses.");
                Err(RedinkError::TargetResolution {
                    target: host,
                    reason: "no addresses returned".to_string(),
                })
            }
        },
        Err(e) => {
            error!(target = %host, error = %e, "Target resolution failed.");
            Err(RedinkError::TargetResolution {
                target: host,
                reason: e.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn normalizes_urls_and_host_ports() {
        assert_eq!(normalize_target("example.com"), "example.com");
        assert_eq!(normalize_target("  https://example.com/login?x=1 "), "example.com");
        assert_eq!(normalize_target("example.com:8443"), "example.com");
        assert_eq!(normalize_target("192.168.1.10"), "192.168.1.10");
        assert_eq!(normalize_target("::1"), "::1");
        assert_eq!(normalize_target("http://[::1]:8080/"), "::1");
    }

    #[tokio::test]
    async fn literal_address_skips_dns() {
        let ip = resolve_target("127.0.0.1").await.unwrap();
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[tokio::test]
    async fn empty_target_is_a_resolution_error() {
        let err = resolve_target("   ").await.unwrap_err();
        assert!(matches!(err, RedinkError::TargetResolution { .. }));
        assert_eq!(err.exit_code(), crate::core::error::EXIT_TARGET_ERROR);
    }

    #[tokio::test]
    async fn reserved_invalid_domain_does_not_resolve() {
        let err = resolve_target("no-such-host.invalid").await.unwrap_err();
        assert!(matches!(err, RedinkError::TargetResolution { .. }));
    }
}
