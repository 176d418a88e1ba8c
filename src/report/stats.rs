//! Log analysis

use crate::core::Sample;
use chrono::{DateTime, Local};
use serde::Serialize;

/// A span during which the host was unreachable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outage {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl Outage {
    pub fn duration_secs(&self) -> f64 {
        self.end.signed_duration_since(self.start).num_milliseconds() as f64 / 1000.0
    }
}

/// Average, maximum and minimum of a series; all zero when it is empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Spread {
    pub avg: f64,
    pub max: f64,
    pub min: f64,
}

impl Spread {
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        Self {
            avg: mean(values),
            max: values.iter().copied().fold(f64::MIN, f64::max),
            min: values.iter().copied().fold(f64::MAX, f64::min),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn present(samples: &[Sample], field: fn(&Sample) -> Option<f64>) -> Vec<f64> {
    samples.iter().filter_map(field).collect()
}

/// Everything the report prints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportStats {
    pub period_start: DateTime<Local>,
    pub period_end: DateTime<Local>,
    /// Last timestamp minus first, in seconds
    pub total_secs: f64,

    pub total_checks: usize,
    pub connected_checks: usize,
    pub disconnected_checks: usize,
    pub connected_pct: f64,
    pub uptime_pct: f64,

    pub outages: Vec<Outage>,
    /// Outage durations; None without outages
    pub outage_spread: Option<Spread>,

    pub ping: Spread,
    pub avg_jitter_ms: f64,
    pub avg_packet_loss_pct: f64,
    pub avg_udp_ms: f64,
    pub avg_http_ms: f64,
    pub avg_socket_ms: f64,
}

/// Find outages in a status series
///
/// An outage opens on a connected → disconnected step and closes on the
/// next disconnected → connected step. A series that starts disconnected
/// does not open one at its first sample. An outage still open at the end
/// closes at the last sample.
pub fn find_outages(samples: &[Sample]) -> Vec<Outage> {
    let mut outages = Vec::new();
    let mut open: Option<DateTime<Local>> = None;

    for pair in samples.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        if prev.connected && !cur.connected {
            open = Some(cur.at);
        } else if !prev.connected && cur.connected {
            if let Some(start) = open.take() {
                outages.push(Outage { start, end: cur.at });
            }
        }
    }

    if let (Some(start), Some(last)) = (open, samples.last()) {
        outages.push(Outage { start, end: last.at });
    }
    outages
}

/// Analyze a log; None when it holds no samples
pub fn analyze(samples: &[Sample]) -> Option<ReportStats> {
    let first = samples.first()?;
    let last = samples.last()?;

    let total_checks = samples.len();
    let connected_checks = samples.iter().filter(|s| s.connected).count();
    let disconnected_checks = total_checks - connected_checks;
    let connected_pct = connected_checks as f64 / total_checks as f64 * 100.0;
    let total_secs = last.timestamp() - first.timestamp();

    let outages = find_outages(samples);
    let durations: Vec<f64> = outages.iter().map(Outage::duration_secs).collect();
    let total_outage_secs: f64 = durations.iter().sum();
    let uptime_pct = if total_secs > 0.0 {
        (1.0 - total_outage_secs / total_secs) * 100.0
    } else {
        0.0
    };
    let outage_spread = (!durations.is_empty()).then(|| Spread::of(&durations));

    Some(ReportStats {
        period_start: first.at,
        period_end: last.at,
        total_secs,
        total_checks,
        connected_checks,
        disconnected_checks,
        connected_pct,
        uptime_pct,
        outages,
        outage_spread,
        ping: Spread::of(&present(samples, |s| s.ping_ms)),
        avg_jitter_ms: mean(&present(samples, |s| s.jitter_ms)),
        avg_packet_loss_pct: mean(&present(samples, |s| s.packet_loss_pct)),
        avg_udp_ms: mean(&present(samples, |s| s.udp_ms)),
        avg_http_ms: mean(&present(samples, |s| s.http_ms)),
        avg_socket_ms: mean(&present(samples, |s| s.socket_ms)),
    })
}
