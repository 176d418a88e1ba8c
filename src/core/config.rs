//! Monitor configuration from YAML

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Which probes a check runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CheckMethod {
    /// ICMP echo through the system `ping` binary
    Ping,
    /// TCP connect to `socket_port`
    Socket,
    /// HTTP GET against `http_url`
    Http,
    /// DNS query over UDP port 53
    Udp,
    /// All of the above; connected if any succeeds
    #[default]
    All,
}

impl CheckMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckMethod::Ping => "ping",
            CheckMethod::Socket => "socket",
            CheckMethod::Http => "http",
            CheckMethod::Udp => "udp",
            CheckMethod::All => "all",
        }
    }
}

impl fmt::Display for CheckMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ping" => Ok(CheckMethod::Ping),
            "socket" => Ok(CheckMethod::Socket),
            "http" => Ok(CheckMethod::Http),
            "udp" => Ok(CheckMethod::Udp),
            "all" => Ok(CheckMethod::All),
            other => anyhow::bail!(
                "Unknown check method '{}' (expected ping, socket, http, udp or all)",
                other
            ),
        }
    }
}

/// Settings for one monitoring run
///
/// Every field is optional in YAML and falls back to its default, so a
/// settings file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Host to check
    pub host: String,

    /// Pause between checks in seconds
    pub interval_secs: f64,

    /// CSV sample log
    pub log_file: String,

    /// Echo requests per ping check
    pub ping_count: u32,

    /// Per-probe timeout in seconds
    pub timeout_secs: f64,

    /// Text report output
    pub report_file: String,

    /// Chart output (SVG)
    pub chart_file: String,

    /// Probe selection
    pub check_method: CheckMethod,

    /// URL for the HTTP probe
    pub http_url: String,

    /// TCP port for the socket probe
    pub socket_port: u16,

    /// Stop after this many seconds (None = until interrupted)
    pub duration_secs: Option<f64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            host: "8.8.8.8".to_string(),
            interval_secs: 1.0,
            log_file: "connection_log.csv".to_string(),
            ping_count: 3,
            timeout_secs: 1.0,
            report_file: "connection_report.txt".to_string(),
            chart_file: "connection_stats.svg".to_string(),
            check_method: CheckMethod::All,
            http_url: "https://www.google.com/".to_string(),
            socket_port: 53,
            duration_secs: None,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config = Self::parse_yaml(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file without validating it
    ///
    /// For layering: the result is validated once the other sources have
    /// been applied on top.
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse a YAML string without validating it
    pub fn parse_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            anyhow::bail!("Host must not be empty");
        }
        check_seconds("Interval", self.interval_secs)?;
        check_seconds("Timeout", self.timeout_secs)?;
        if self.ping_count == 0 {
            anyhow::bail!("Ping count must be at least 1");
        }
        if self.socket_port == 0 {
            anyhow::bail!("Socket port must be between 1 and 65535");
        }
        if !(self.http_url.starts_with("http://") || self.http_url.starts_with("https://")) {
            anyhow::bail!("HTTP URL must start with http:// or https://, got '{}'", self.http_url);
        }
        if let Some(duration) = self.duration_secs {
            check_seconds("Duration", duration)?;
        }
        if self.log_file.trim().is_empty() || self.report_file.trim().is_empty() {
            anyhow::bail!("Log and report file paths must not be empty");
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        to_duration(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        to_duration(self.timeout_secs)
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration_secs.map(to_duration)
    }
}

/// Seconds must be positive and fit in a `Duration`
fn check_seconds(label: &str, secs: f64) -> Result<()> {
    if !secs.is_finite() || secs <= 0.0 {
        anyhow::bail!("{} must be a positive number of seconds, got {}", label, secs);
    }
    if Duration::try_from_secs_f64(secs).is_err() {
        anyhow::bail!("{} of {} seconds is too large", label, secs);
    }
    Ok(())
}

/// Saturating conversion for settings that skipped validation
fn to_duration(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
