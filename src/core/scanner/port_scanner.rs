// src/core/scanner/port_scanner.rs

use crate::core::models::{PortProbeResult, PortStatus};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Attempts a single TCP connection.
///
/// Timeouts, refusals and every other network error classify the port as
/// closed; none of them is surfaced as a failure.
pub async fn probe_port(ip: IpAddr, port: u16, timeout: Duration) -> PortProbeResult {
    let addr = SocketAddr::new(ip, port);
    let status = match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => {
            debug!(%addr, "open");
            PortStatus::Open
        }
        Ok(Err(e)) => {
            debug!(%addr, error = %e, "closed");
            PortStatus::Closed
        }
        Err(_) => {
            debug!(%addr, "closed (timeout)");
            PortStatus::Closed
        }
    };
    PortProbeResult { port, status }
}

/// Probes every port with at most `concurrency` connection attempts in flight.
pub async fn scan_ports(
    ip: IpAddr,
    ports: &[u16],
    timeout: Duration,
    concurrency: usize,
) -> Vec<PortProbeResult> {
    info!(%ip, ports = ports.len(), concurrency, "Scanning ports.");
    let results = scan_with(ports, concurrency, move |port| probe_port(ip, port, timeout)).await;

    let open = results.iter().filter(|r| r.is_open()).count();
    info!(open, total = results.len(), "Port scan finished.");
    results
}

/// Runs `probe` for every port, admitting at most `concurrency` at a time.
///
/// Each probe runs in its own task and must take a permit from a shared
/// semaphore first; the permit is dropped on every exit path. Results are
/// collected by awaiting the handles in input order, so the output order
/// always matches `ports` regardless of completion order.
async fn scan_with<F, Fut>(ports: &[u16], concurrency: usize, probe: F) -> Vec<PortProbeResult>
where
    F: Fn(u16) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = PortProbeResult> + Send + 'static,
{
    let gate = Arc::new(Semaphore::new(concurrency.max(1)));

    let handles: Vec<_> = ports
        .iter()
        .map(|&port| {
            let gate = Arc::clone(&gate);
            let probe = probe.clone();
            tokio::spawn(async move {
                let _permit = match gate.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return PortProbeResult { port, status: PortStatus::Closed },
                };
                probe(port).await
            })
        })
        .collect();

    let mut results = Vec::with_capacity(ports.len());
    for (handle, &port) in handles.into_iter().zip(ports) {
        match handle.await {
            Ok(result) => results.push(result),
            Err(e) => {
                warn!(port, error = %e, "Probe task failed, treating port as closed.");
                results.push(PortProbeResult { port, status: PortStatus::Closed });
            }
        }
    }
    results
}

/// Extracts the open ports, preserving order.
pub fn open_ports(results: &[PortProbeResult]) -> Vec<u16> {
    results
        .iter()
        .filter(|r| r.is_open())
        .map(|r| r.port)
        .collect()
}
