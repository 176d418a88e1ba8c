//! Runs the selected probes and folds them into one sample

use crate::core::{CheckMethod, MonitorConfig, Sample};
use crate::probe::{
    HttpProbe, PingProbe, PingSource, Probe, ProbeError, SocketProbe, UdpProbe,
};
use chrono::Local;
use std::sync::Arc;
use tracing::debug;

/// Performs one check with the configured probe selection
#[derive(Clone)]
pub struct Checker {
    method: CheckMethod,
    ping: Arc<dyn PingSource>,
    socket: Arc<dyn Probe>,
    http: Arc<dyn Probe>,
    udp: Arc<dyn Probe>,
}

impl Checker {
    /// Assemble a checker from explicit probes
    pub fn new(
        method: CheckMethod,
        ping: Arc<dyn PingSource>,
        socket: Arc<dyn Probe>,
        http: Arc<dyn Probe>,
        udp: Arc<dyn Probe>,
    ) -> Self {
        Self {
            method,
            ping,
            socket,
            http,
            udp,
        }
    }

    /// Build the real network probes described by a config
    pub fn from_config(config: &MonitorConfig) -> Result<Self, ProbeError> {
        let timeout = config.timeout();
        Ok(Self::new(
            config.check_method,
            Arc::new(PingProbe::new(&config.host, config.ping_count, timeout)),
            Arc::new(SocketProbe::new(&config.host, config.socket_port, timeout)),
            Arc::new(HttpProbe::new(&config.http_url, timeout)?),
            Arc::new(UdpProbe::new(&config.host, timeout)),
        ))
    }

    pub fn method(&self) -> CheckMethod {
        self.method
    }

    /// Run one check
    ///
    /// With `CheckMethod::All` the four probes run concurrently and the
    /// host counts as connected if any of them reached it.
    pub async fn check(&self) -> Sample {
        let mut sample = Sample::new(Local::now(), false);

        match self.method {
            CheckMethod::Ping => {
                let ping = self.ping.check().await;
                sample.connected = ping.reachable;
                sample.ping_ms = ping.avg_ms;
                sample.jitter_ms = ping.jitter_ms;
                sample.packet_loss_pct = ping.packet_loss_pct;
            }
            CheckMethod::Socket => {
                let socket = self.socket.check().await;
                sample.connected = socket.reachable;
                sample.socket_ms = socket.latency_ms;
            }
            CheckMethod::Http => {
                let http = self.http.check().await;
                sample.connected = http.reachable;
                sample.http_ms = http.latency_ms;
            }
            CheckMethod::Udp => {
                let udp = self.udp.check().await;
                sample.connected = udp.reachable;
                sample.udp_ms = udp.latency_ms;
            }
            CheckMethod::All => {
                let (ping, socket, http, udp) = tokio::join!(
                    self.ping.check(),
                    self.socket.check(),
                    self.http.check(),
                    self.udp.check(),
                );
                sample.connected =
                    ping.reachable || socket.reachable || http.reachable || udp.reachable;
                sample.ping_ms = ping.avg_ms;
                sample.jitter_ms = ping.jitter_ms;
                sample.packet_loss_pct = ping.packet_loss_pct;
                sample.socket_ms = socket.latency_ms;
                sample.http_ms = http.latency_ms;
                sample.udp_ms = udp.latency_ms;
            }
        }

        debug!("Check ({}) connected={}", self.method, sample.connected);
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{PingStats, ProbeOutcome};
    use async_trait::async_trait;

    struct FixedPing(PingStats);

    #[async_trait]
    impl PingSource for FixedPing {
        async fn check(&self) -> PingStats {
            self.0
        }
    }

    struct FixedProbe(Option<f64>);

    #[async_trait]
    impl Probe for FixedProbe {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn measure(&self) -> Result<ProbeOutcome, ProbeError> {
            match self.0 {
                Some(ms) => Ok(ProbeOutcome::reachable(ms)),
                None => Err(ProbeError::Protocol("scripted failure".to_string())),
            }
        }
    }

    fn checker(method: CheckMethod, ping: PingStats, socket: Option<f64>, http: Option<f64>, udp: Option<f64>) -> Checker {
        Checker::new(
            method,
            Arc::new(FixedPing(ping)),
            Arc::new(FixedProbe(socket)),
            Arc::new(FixedProbe(http)),
            Arc::new(FixedProbe(udp)),
        )
    }

    #[tokio::test]
    async fn test_all_is_connected_if_any_probe_is() {
        let c = checker(CheckMethod::All, PingStats::failed(), None, None, Some(25.0));
        let sample = c.check().await;

        assert!(sample.connected);
        assert_eq!(sample.udp_ms, Some(25.0));
        assert!(sample.ping_ms.is_none());
        assert!(sample.socket_ms.is_none());
        assert!(sample.http_ms.is_none());
    }

    #[tokio::test]
    async fn test_all_fills_every_column() {
        let ping = PingStats::from_times(&[10.0, 20.0], 2);
        let c = checker(CheckMethod::All, ping, Some(5.0), Some(80.0), Some(12.0));
        let sample = c.check().await;

        assert!(sample.connected);
        assert_eq!(sample.ping_ms, Some(15.0));
        assert_eq!(sample.packet_loss_pct, Some(0.0));
        assert_eq!(sample.socket_ms, Some(5.0));
        assert_eq!(sample.http_ms, Some(80.0));
        assert_eq!(sample.udp_ms, Some(12.0));
    }

    #[tokio::test]
    async fn test_all_disconnected_when_every_probe_fails() {
        let c = checker(CheckMethod::All, PingStats::from_times(&[], 3), None, None, None);
        let sample = c.check().await;

        assert!(!sample.connected);
        assert_eq!(sample.packet_loss_pct, Some(100.0));
    }

    #[tokio::test]
    async fn test_single_method_uses_only_its_probe() {
        // Socket up, but HTTP is the selected method and it is down
        let c = checker(CheckMethod::Http, PingStats::failed(), Some(3.0), None, Some(3.0));
        let sample = c.check().await;
        assert!(!sample.connected);
        assert!(sample.socket_ms.is_none());

        let c = checker(CheckMethod::Socket, PingStats::failed(), Some(3.0), None, None);
        let sample = c.check().await;
        assert!(sample.connected);
        assert_eq!(sample.socket_ms, Some(3.0));
        assert!(sample.ping_ms.is_none());
    }

    #[tokio::test]
    async fn test_ping_method_records_loss_and_jitter() {
        let c = checker(CheckMethod::Ping, PingStats::from_times(&[10.0], 3), None, None, None);
        let sample = c.check().await;

        assert!(sample.connected);
        assert_eq!(sample.jitter_ms, Some(0.0));
        assert!((sample.packet_loss_pct.unwrap() - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_from_config() {
        let config = MonitorConfig {
            check_method: CheckMethod::Udp,
            ..MonitorConfig::default()
        };
        let c = Checker::from_config(&config).unwrap();
        assert_eq!(c.method(), CheckMethod::Udp);
    }
}
