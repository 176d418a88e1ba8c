//! Check samples

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Format used for the human-readable `datetime` column
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Result of one check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// When the check started
    pub at: DateTime<Local>,

    /// Whether any selected probe reached the host
    pub connected: bool,

    /// Average ping round trip (ms)
    pub ping_ms: Option<f64>,

    /// Ping jitter, sample standard deviation of round trips (ms)
    pub jitter_ms: Option<f64>,

    /// Lost echo requests (%)
    pub packet_loss_pct: Option<f64>,

    /// UDP DNS query round trip (ms)
    pub udp_ms: Option<f64>,

    /// TCP connect time (ms)
    pub socket_ms: Option<f64>,

    /// HTTP response time (ms)
    pub http_ms: Option<f64>,
}

impl Sample {
    /// An empty sample at the given time
    pub fn new(at: DateTime<Local>, connected: bool) -> Self {
        Self {
            at,
            connected,
            ping_ms: None,
            jitter_ms: None,
            packet_loss_pct: None,
            udp_ms: None,
            socket_ms: None,
            http_ms: None,
        }
    }

    /// Unix timestamp in fractional seconds
    pub fn timestamp(&self) -> f64 {
        self.at.timestamp_micros() as f64 / 1_000_000.0
    }

    /// Local time in the log's `datetime` format
    pub fn datetime_label(&self) -> String {
        self.at.format(DATETIME_FORMAT).to_string()
    }
}
