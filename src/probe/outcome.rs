//! Probe result types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for probe operations
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Timeout after {0:.1} seconds")]
    Timeout(f64),

    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not resolve host '{0}'")]
    Resolve(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Result of a single-latency probe (socket, HTTP, UDP)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// Whether the host answered
    pub reachable: bool,

    /// Round trip in milliseconds, only when reachable
    pub latency_ms: Option<f64>,
}

impl ProbeOutcome {
    pub fn reachable(latency_ms: f64) -> Self {
        Self {
            reachable: true,
            latency_ms: Some(latency_ms),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            latency_ms: None,
        }
    }
}

/// Result of a ping probe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PingStats {
    /// At least one echo reply arrived
    pub reachable: bool,

    /// Mean round trip (ms)
    pub avg_ms: Option<f64>,

    /// Sample standard deviation of round trips (ms)
    pub jitter_ms: Option<f64>,

    /// Lost echo requests (%)
    pub packet_loss_pct: Option<f64>,
}

impl PingStats {
    /// Ping could not be run at all
    pub fn failed() -> Self {
        Self {
            reachable: false,
            avg_ms: None,
            jitter_ms: None,
            packet_loss_pct: None,
        }
    }

    /// Summarize reply times out of `sent` requests
    pub fn from_times(times: &[f64], sent: u32) -> Self {
        let successes = times.len();
        let sent = sent.max(1) as f64;
        let packet_loss_pct = ((sent - successes as f64) / sent * 100.0).max(0.0);

        if successes == 0 {
            return Self {
                reachable: false,
                avg_ms: None,
                jitter_ms: None,
                packet_loss_pct: Some(packet_loss_pct),
            };
        }

        let avg = times.iter().sum::<f64>() / successes as f64;
        let jitter = if successes > 1 {
            let variance = times.iter().map(|t| (t - avg).powi(2)).sum::<f64>()
                / (successes - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        Self {
            reachable: true,
            avg_ms: Some(avg),
            jitter_ms: Some(jitter),
            packet_loss_pct: Some(packet_loss_pct),
        }
    }
}
