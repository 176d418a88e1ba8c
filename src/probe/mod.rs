//! Connectivity probes

pub mod http;
pub mod outcome;
pub mod ping;
pub mod socket;
pub mod udp;

use async_trait::async_trait;
use tracing::warn;

pub use http::HttpProbe;
pub use outcome::{PingStats, ProbeError, ProbeOutcome};
pub use ping::PingProbe;
pub use socket::SocketProbe;
pub use udp::UdpProbe;

/// Trait for single-latency probes - allows swapping real network access
/// for scripted results in tests
#[async_trait]
pub trait Probe: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Perform one measurement
    async fn measure(&self) -> Result<ProbeOutcome, ProbeError>;

    /// Perform one measurement, treating any error as unreachable
    async fn check(&self) -> ProbeOutcome {
        match self.measure().await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("{} probe failed: {}", self.name(), e);
                ProbeOutcome::unreachable()
            }
        }
    }
}

/// Trait for the ping probe, which reports loss and jitter as well
#[async_trait]
pub trait PingSource: Send + Sync {
    async fn check(&self) -> PingStats;
}

#[async_trait]
impl PingSource for PingProbe {
    async fn check(&self) -> PingStats {
        PingProbe::check(self).await
    }
}
