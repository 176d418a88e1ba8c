//! TCP connect probe

use crate::probe::{Probe, ProbeError, ProbeOutcome};
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tracing::debug;

/// Resolve `host:port`, skipping DNS for literal addresses
pub async fn resolve(host: &str, port: u16) -> Result<SocketAddr, ProbeError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }
    lookup_host((host, port))
        .await
        .map_err(|_| ProbeError::Resolve(host.to_string()))?
        .next()
        .ok_or_else(|| ProbeError::Resolve(host.to_string()))
}

/// Opens a TCP connection and measures how long it took
#[derive(Debug, Clone)]
pub struct SocketProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl SocketProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }
}

#[async_trait]
impl Probe for SocketProbe {
    fn name(&self) -> &str {
        "socket"
    }

    async fn measure(&self) -> Result<ProbeOutcome, ProbeError> {
        let started = Instant::now();
        let budget = self.timeout;

        let stream = timeout(budget, async {
            let addr = resolve(&self.host, self.port).await?;
            debug!("Connecting to {}", addr);
            Ok::<_, ProbeError>(TcpStream::connect(addr).await?)
        })
        .await
        .map_err(|_| ProbeError::Timeout(budget.as_secs_f64()))??;

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        drop(stream);
        Ok(ProbeOutcome::reachable(elapsed_ms))
    }
}
