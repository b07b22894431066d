// src/core/scanner/mod.rs

pub mod fingerprint_scanner;
pub mod port_scanner;
pub mod target;

use crate::config::RiskConfig;
use crate::core::engine::RiskEngine;
use crate::core::error::RedinkError;
use crate::core::models::ScanReport;
use self::fingerprint_scanner::Fingerprinter;
use self::port_scanner::{open_ports, scan_ports};
use self::target::resolve_target;
use std::sync::Arc;
use tracing::info;

/// Runs the whole pipeline against one target.
///
/// Resolve, probe every candidate port under the concurrency gate, fingerprint
/// the open ones, then evaluate and aggregate. Only resolution and client
/// setup can fail; per-port problems degrade that port's entry instead.
///
/// `ports` overrides the configured `default_ports` when given.
pub async fn run_full_scan(
    target: &str,
    config: Arc<RiskConfig>,
    ports: Option<Vec<u16>>,
) -> Result<ScanReport, RedinkError> {
    info!(target, "Starting scan.");
    let ip = resolve_target(target).await?;

    let candidates = ports.unwrap_or_else(|| config.default_ports.clone());
    let probes = scan_ports(
        ip,
        &candidates,
        config.scan.probe_timeout(),
        config.scan.concurrency,
    )
    .await;
    let open = open_ports(&probes);
    info!(%ip, open = ?open, "Port scan finished.");

    let fingerprinter = Fingerprinter::new(&config)?;
    let fingerprints = fingerprinter.fingerprint_services(ip, &open).await;

    let engine = RiskEngine::new(config);
    let report = engine.generate_risk_report(target, Some(ip), &fingerprints);
    info!(
        target,
        overall_score = report.overall_score,
        overall_risk_level = %report.overall_risk_level,
        "Scan complete."
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::RiskLevel;
    use tokio::net::TcpListener;

    fn fast_config() -> RiskConfig {
        let mut config = RiskConfig::default();
        config.scan.probe_timeout_ms = 300;
        config.scan.fingerprint_timeout_ms = 500;
        config
    }

    #[tokio::test]
    async fn all_closed_ports_give_an_empty_report() {
        // Bind then drop to obtain ports that refuse connections.
        let mut closed = Vec::new();
        for _ in 0..3 {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            closed.push(listener.local_addr().unwrap().port());
        }

        let report = run_full_scan("127.0.0.1", Arc::new(fast_config()), Some(closed))
            .await
            .unwrap();
        assert_eq!(report.open_port_count, 0);
        assert_eq!(report.overall_score, 0.0);
        assert_eq!(report.overall_risk_level, RiskLevel::None);
        assert_eq!(report.resolved_address, Some("127.0.0.1".parse().unwrap()));
    }

    #[tokio::test]
    async fn open_port_is_fingerprinted_and_scored() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            while let Ok((_socket, _)) = listener.accept().await {}
        });

        let report = run_full_scan("127.0.0.1", Arc::new(fast_config()), Some(vec![port]))
            .await
            .unwrap();
        assert_eq!(report.open_port_count, 1);
        assert_eq!(report.findings[0].port, port);
        assert_eq!(report.findings[0].service, "unknown");
    }

    #[tokio::test]
    async fn unresolvable_target_aborts_the_scan() {
        let err = run_full_scan("no-such-host.invalid", Arc::new(fast_config()), Some(vec![80]))
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), crate::core::error::EXIT_TARGET_ERROR);
    }
}
