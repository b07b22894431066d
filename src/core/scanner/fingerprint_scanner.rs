// src/core/scanner/fingerprint_scanner.rs

use crate::config::RiskConfig;
use crate::core::error::RedinkError;
use crate::core::models::ServiceFingerprint;
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Service labels answered with an HTTP request instead of a banner grab.
pub const HTTP_FAMILY: &[&str] = &["http", "https", "http-alt"];

/// Security-relevant response headers always captured into the fingerprint,
/// as `(lookup name, canonical name)`. Headers listed in
/// `required_security_headers` are captured as well.
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("content-security-policy", "Content-Security-Policy"),
    ("x-frame-options", "X-Frame-Options"),
    ("strict-transport-security", "Strict-Transport-Security"),
    ("x-content-type-options", "X-Content-Type-Options"),
];

pub fn is_http_family(service: &str) -> bool {
    HTTP_FAMILY.contains(&service)
}

/// Collects service evidence from open ports.
///
/// Holds one HTTP client for the whole scan. Certificates are not validated
/// and redirects are not followed, so the evidence describes the probed port
/// itself.
pub struct Fingerprinter {
    client: reqwest::Client,
    services: std::collections::BTreeMap<u16, String>,
    timeout: Duration,
    banner_bytes: usize,
    captured_headers: Vec<(String, String)>,
}

/// Built-in security headers plus any configured required header not already
/// among them, as `(lookup name, canonical name)`.
fn captured_headers(config: &RiskConfig) -> Vec<(String, String)> {
    let mut captured: Vec<(String, String)> = SECURITY_HEADERS
        .iter()
        .map(|(lookup, canonical)| (lookup.to_string(), canonical.to_string()))
        .collect();
    for required in &config.required_security_headers {
        let name = required.trim();
        let lookup = name.to_ascii_lowercase();
        if name.is_empty() || captured.iter().any(|(l, _)| *l == lookup) {
            continue;
        }
        captured.push((lookup, name.to_string()));
    }
    captured
}

impl Fingerprinter {
    pub fn new(config: &RiskConfig) -> Result<Self, RedinkError> {
        let timeout = config.scan.fingerprint_timeout();
        let client = reqwest::Client::builder()
            .user_agent(concat!("redink/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .redirect(Policy::none())
            .build()
            .map_err(|e| RedinkError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            services: config.services.clone(),
            timeout,
            banner_bytes: config.scan.banner_bytes,
            captured_headers: captured_headers(config),
        })
    }

    pub fn service_label(&self, port: u16) -> String {
        self.services
            .get(&port)
            .cloned()
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Fingerprints every open port in order.
    ///
    /// A failure on one port is logged and yields an evidence-free fingerprint
    /// carrying the error, so the output always has one entry per input port.
    pub async fn fingerprint_services(&self, ip: IpAddr, ports: &[u16]) -> Vec<ServiceFingerprint> {
        info!(%ip, open_ports = ports.len(), "Executing fingerprint.");
        let mut results = Vec::with_capacity(ports.len());
        for &port in ports {
            let fingerprint = match self.fingerprint_service(ip, port).await {
                Ok(fp) => fp,
                Err(e) => {
                    warn!(port, error = %e, "Fingerprinting failed, continuing with empty evidence.");
                    let mut fp = ServiceFingerprint::new(port, self.service_label(port));
                    fp.error = Some(e.to_string());
                    fp
                }
            };
            results.push(fingerprint);
        }
        info!(count = results.len(), "Fingerprint finished.");
        results
    }

    pub async fn fingerprint_service(
        &self,
        ip: IpAddr,
        port: u16,
    ) -> Result<ServiceFingerprint, RedinkError> {
        let service = self.service_label(port);
        debug!(port, service = %service, "Fingerprinting service.");

        if is_http_family(&service) {
            self.fingerprint_http(ip, port, service).await
        } else {
            let mut fp = ServiceFingerprint::new(port, service);
            fp.banner = self.grab_banner(ip, port).await;
            Ok(fp)
        }
    }

    async fn fingerprint_http(
        &self,
        ip: IpAddr,
        port: u16,
        service: String,
    ) -> Result<ServiceFingerprint, RedinkError> {
        let scheme = if port == 443 || service == "https" { "https" } else { "http" };
        let url = format!("{}://{}/", scheme, SocketAddr::new(ip, port));

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "HTTP request failed.");
            RedinkError::ScanExecution {
                port,
                reason: format!("HTTP fingerprinting failed for {}: {}", url, e),
            }
        })?;

        info!(port, status = %response.status(), "Received HTTP response.");
        let headers = response.headers();
        let mut fp = ServiceFingerprint::new(port, service);
        fp.status_code = Some(response.status().as_u16());
        fp.server = header_value(headers, "server");
        for (lookup, canonical) in &self.captured_headers {
            if let Some(value) = header_value(headers, lookup) {
                debug!(header_name = %canonical, value = %value, "Header found.");
                fp.headers.insert(canonical.clone(), value);
            }
        }
        Ok(fp)
    }

    /// Reads whatever the service volunteers on connect, up to the banner
    /// budget. Timeouts and errors mean "no banner", never a failure.
    async fn grab_banner(&self, ip: IpAddr, port: u16) -> Option<String> {
        let addr = SocketAddr::new(ip, port);
        let mut stream = match tokio::time::timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(s)) => s,
            Ok(Err(e)) => {
                warn!(%addr, error = %e, "Banner grabbing failed.");
                return None;
            }
            Err(_) => {
                warn!(%addr, "Banner grabbing timed out on connect.");
                return None;
            }
        };

        let mut buffer = vec![0u8; self.banner_bytes.max(1)];
        match tokio::time::timeout(self.timeout, stream.read(&mut buffer)).await {
            Ok(Ok(n)) if n > 0 => {
                let banner = String::from_utf8_lossy(&buffer[..n])
                    .replace('\u{FFFD}', "")
                    .trim()
                    .to_string();
                debug!(%addr, banner = %banner, "Banner received.");
                Some(banner).filter(|b| !b.is_empty())
            }
            Ok(Ok(_)) => None,
            Ok(Err(e)) => {
                warn!(%addr, error = %e, "Banner read failed.");
                None
            }
            Err(_) => {
                debug!(%addr, "No banner within timeout.");
                None
            }
        }
    }
}

/// Header value as text; non-UTF-8 values are kept as a placeholder so their
/// presence still counts.
fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).map(|value| match value.to_str() {
        Ok(s) => s.to_string(),
        Err(_) => {
            warn!(header_name = name, "Header found but contained invalid UTF-8.");
            "[Invalid UTF-8]".to_string()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    fn config_for(port: u16, service: &str) -> RiskConfig {
        let mut config = RiskConfig::default();
        config.services.insert(port, service.to_string());
        config.scan.fingerprint_timeout_ms = 1500;
        config
    }

    /// Serves `payload` to every connection after reading the request (if any).
    async fn serve(payload: &'static [u8], read_first: bool) -> u16 {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                if read_first {
                    let mut buf = [0u8; 2048];
                    let _ = socket.read(&mut buf).await;
                }
                let _ = socket.write_all(payload).await;
                let _ = socket.shutdown().await;
            }
        });
        port
    }

    #[tokio::test]
    async fn http_fingerprint_captures_status_server_and_security_headers() {
        let port = serve(
            b"HTTP/1.1 200 OK\r\nServer: nginx/1.18.0\r\nX-Frame-Options: DENY\r\nX-Powered-By: PHP\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            true,
        )
        .await;
        let fingerprinter = Fingerprinter::new(&config_for(port, "http")).unwrap();

        let fp = fingerprinter.fingerprint_service(LOCALHOST, port).await.unwrap();
        assert_eq!(fp.service, "http");
        assert_eq!(fp.status_code, Some(200));
        assert_eq!(fp.server.as_deref(), Some("nginx/1.18.0"));
        assert_eq!(fp.headers.get("X-Frame-Options").map(String::as_str), Some("DENY"));
        assert!(!fp.has_header("x-powered-by"));
        assert!(fp.banner.is_none());
    }

    #[tokio::test]
    async fn banner_is_read_for_non_http_services() {
        let port = serve(b"SSH-2.0-OpenSSH_8.9p1 Ubuntu-3\r\n\xff", false).await;
        let fingerprinter = Fingerprinter::new(&config_for(port, "ssh")).unwrap();

        let fp = fingerprinter.fingerprint_service(LOCALHOST, port).await.unwrap();
        assert_eq!(fp.service, "ssh");
        assert_eq!(fp.banner.as_deref(), Some("SSH-2.0-OpenSSH_8.9p1 Ubuntu-3"));
        assert!(fp.headers.is_empty());
    }

    #[tokio::test]
    async fn silent_service_yields_empty_evidence() {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        let mut config = config_for(port, "mysql");
        config.scan.fingerprint_timeout_ms = 200;
        let fingerprinter = Fingerprinter::new(&config).unwrap();

        let fp = fingerprinter.fingerprint_service(LOCALHOST, port).await.unwrap();
        assert!(fp.banner.is_none());
        assert!(fp.error.is_none());
    }

    #[tokio::test]
    async fn non_http_response_on_web_port_fails_only_that_port() {
        let bad = serve(b"220 not an http server\r\n", true).await;
        let good = serve(b"RFB 003.008\n", false).await;
        let mut config = config_for(bad, "http");
        config.services.insert(good, "vnc".to_string());
        let fingerprinter = Fingerprinter::new(&config).unwrap();

        let direct = fingerprinter.fingerprint_service(LOCALHOST, bad).await;
        assert!(matches!(direct, Err(RedinkError::ScanExecution { .. })));

        let fps = fingerprinter.fingerprint_services(LOCALHOST, &[bad, good]).await;
        assert_eq!(fps.len(), 2);
        assert_eq!(fps[0].port, bad);
        assert!(fps[0].error.is_some());
        assert!(fps[0].status_code.is_none());
        assert_eq!(fps[1].banner.as_deref(), Some("RFB 003.008"));
    }

    #[tokio::test]
    async fn configured_required_header_is_captured() {
        let port = serve(
            b"HTTP/1.1 200 OK\r\nReferrer-Policy: no-referrer\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            true,
        )
        .await;
        let mut config = config_for(port, "http");
        config.required_security_headers = ["Referrer-Policy".to_string()].into_iter().collect();
        let config = config.normalized();
        let fingerprinter = Fingerprinter::new(&config).unwrap();

        let fp = fingerprinter.fingerprint_service(LOCALHOST, port).await.unwrap();
        assert_eq!(fp.headers.get("Referrer-Policy").map(String::as_str), Some("no-referrer"));
        assert_eq!(crate::core::scoring::score_security_headers(&fp.headers, &config), 0.0);
    }

    #[test]
    fn required_headers_extend_the_builtin_list_once() {
        let mut config = RiskConfig::default();
        config.required_security_headers = ["x-frame-options", " Permissions-Policy "]
            .into_iter()
            .map(String::from)
            .collect();
        let captured = captured_headers(&config);
        assert_eq!(captured.len(), SECURITY_HEADERS.len() + 1);
        assert!(captured.contains(&(
            "permissions-policy".to_string(),
            "Permissions-Policy".to_string()
        )));
        assert_eq!(captured.iter().filter(|(l, _)| l == "x-frame-options").count(), 1);
    }

    #[test]
    fn unmapped_port_is_unknown() {
        let fingerprinter = Fingerprinter::new(&RiskConfig::default()).unwrap();
        assert_eq!(fingerprinter.service_label(4444), "unknown");
        assert_eq!(fingerprinter.service_label(22), "ssh");
        assert!(is_http_family("http-alt"));
        assert!(!is_http_family("ssh"));
    }
}
