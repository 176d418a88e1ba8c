//! Ping probe - runs the system `ping` binary as a subprocess

use crate::probe::{PingStats, ProbeError};
use encoding_rs::IBM866;
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Matches per-reply round trips in English and Russian `ping` output,
/// e.g. `time=12.3 ms`, `time<1ms`, `время=14мс`.
fn reply_time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:time|время)\s*[=<]\s*([0-9]+(?:[.,][0-9]+)?)")
            .expect("reply time pattern is valid")
    })
}

/// Extract every reply round trip (ms) from `ping` output
pub fn parse_reply_times(output: &str) -> Vec<f64> {
    output
        .lines()
        .filter_map(|line| reply_time_regex().captures(line))
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().replace(',', ".").parse::<f64>().ok())
        .collect()
}

/// Decode `ping` stdout
///
/// Windows ping writes in the OEM code page; cp866 covers the Russian
/// locale and leaves ASCII output unchanged.
pub fn decode_output(flavor: PingFlavor, bytes: &[u8]) -> Cow<'_, str> {
    match flavor {
        PingFlavor::Windows => IBM866.decode_without_bom_handling(bytes).0,
        PingFlavor::Unix => String::from_utf8_lossy(bytes),
    }
}

/// Platform flavour of the `ping` command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingFlavor {
    Windows,
    Unix,
}

impl PingFlavor {
    pub fn current() -> Self {
        if cfg!(windows) {
            PingFlavor::Windows
        } else {
            PingFlavor::Unix
        }
    }
}

/// Build `ping` arguments for a flavour
pub fn ping_args(flavor: PingFlavor, host: &str, count: u32, timeout: Duration) -> Vec<String> {
    match flavor {
        PingFlavor::Windows => vec![
            "-n".to_string(),
            count.to_string(),
            "-w".to_string(),
            timeout.as_millis().to_string(),
            host.to_string(),
        ],
        // -W takes whole seconds; 0 would mean "wait forever" on some systems
        PingFlavor::Unix => vec![
            "-c".to_string(),
            count.to_string(),
            "-W".to_string(),
            timeout.as_secs().max(1).to_string(),
            host.to_string(),
        ],
    }
}

/// Client for running `ping` as a subprocess
#[derive(Debug, Clone)]
pub struct PingProbe {
    /// Path to ping executable
    ping_path: String,

    host: String,

    /// Echo requests per check
    count: u32,

    /// Per-reply timeout
    timeout: Duration,

    flavor: PingFlavor,
}

impl PingProbe {
    /// Create a ping probe using `ping` from PATH
    pub fn new(host: impl Into<String>, count: u32, timeout: Duration) -> Self {
        Self {
            ping_path: "ping".to_string(),
            host: host.into(),
            count,
            timeout,
            flavor: PingFlavor::current(),
        }
    }

    /// Use a different ping executable
    pub fn with_ping_path(mut self, ping_path: impl Into<String>) -> Self {
        self.ping_path = ping_path.into();
        self
    }

    /// Whole command budget: count × timeout × 1.5
    pub fn command_budget(&self) -> Duration {
        let secs = self.timeout.as_secs_f64() * self.count as f64 * 1.5;
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Run ping once and summarize the replies
    ///
    /// A non-zero exit status is not an error: ping exits non-zero on
    /// partial loss, and the replies it did get still count.
    pub async fn measure(&self) -> Result<PingStats, ProbeError> {
        let args = ping_args(self.flavor, &self.host, self.count, self.timeout);
        debug!("Spawning {} {}", self.ping_path, args.join(" "));

        let budget = self.command_budget();
        let output = timeout(
            budget,
            Command::new(&self.ping_path)
                .args(&args)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| ProbeError::Timeout(budget.as_secs_f64()))?
        .map_err(|source| ProbeError::Spawn {
            command: self.ping_path.clone(),
            source,
        })?;

        let stdout = decode_output(self.flavor, &output.stdout);
        let times = parse_reply_times(&stdout);

        if times.is_empty() && !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                debug!("ping exited with {}: {}", output.status, stderr.trim());
            }
        }

        Ok(PingStats::from_times(&times, self.count))
    }

    /// Like [`measure`](Self::measure), folding errors into a failed result
    pub async fn check(&self) -> PingStats {
        match self.measure().await {
            Ok(stats) => stats,
            Err(e) => {
                warn!("Ping to {} failed: {}", self.host, e);
                PingStats::failed()
            }
        }
    }
}
