//! CLI command definitions

use crate::core::{CheckMethod, MonitorConfig};
use clap::Args;

/// Settings that can be overridden on the command line
///
/// Unset flags leave the value from the config file (or the default) alone.
#[derive(Debug, Args, Clone, Default)]
pub struct MonitorOverrides {
    /// Host to check
    #[arg(long)]
    pub host: Option<String>,

    /// Seconds between checks
    #[arg(long)]
    pub interval: Option<f64>,

    /// CSV file for the sample log
    #[arg(long)]
    pub log_file: Option<String>,

    /// Echo requests per ping check
    #[arg(long)]
    pub ping_count: Option<u32>,

    /// Per-probe timeout in seconds
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Text report output
    #[arg(long)]
    pub report_file: Option<String>,

    /// Chart output (SVG)
    #[arg(long)]
    pub chart_file: Option<String>,

    /// Probe selection
    #[arg(long, value_enum)]
    pub check_method: Option<CheckMethod>,

    /// URL for the HTTP probe
    #[arg(long)]
    pub http_url: Option<String>,

    /// TCP port for the socket probe
    #[arg(long)]
    pub socket_port: Option<u16>,

    /// Stop after this many seconds (default: run until Ctrl+C)
    #[arg(long)]
    pub duration: Option<f64>,
}

impl MonitorOverrides {
    /// Apply the flags that were given
    pub fn apply(&self, config: &mut MonitorConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(interval) = self.interval {
            config.interval_secs = interval;
        }
        if let Some(log_file) = &self.log_file {
            config.log_file = log_file.clone();
        }
        if let Some(ping_count) = self.ping_count {
            config.ping_count = ping_count;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(report_file) = &self.report_file {
            config.report_file = report_file.clone();
        }
        if let Some(chart_file) = &self.chart_file {
            config.chart_file = chart_file.clone();
        }
        if let Some(method) = self.check_method {
            config.check_method = method;
        }
        if let Some(url) = &self.http_url {
            config.http_url = url.clone();
        }
        if let Some(port) = self.socket_port {
            config.socket_port = port;
        }
        if let Some(duration) = self.duration {
            config.duration_secs = Some(duration);
        }
    }
}

/// Monitor a connection
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    #[command(flatten)]
    pub overrides: MonitorOverrides,

    /// Prompt for each setting before starting
    #[arg(short, long)]
    pub interactive: bool,

    /// Don't save the run to history
    #[arg(long)]
    pub no_history: bool,

    /// Don't draw the chart
    #[arg(long)]
    pub no_chart: bool,
}

/// Build a report from an existing log
#[derive(Debug, Args, Clone)]
pub struct ReportCommand {
    /// CSV sample log to read
    #[arg(long)]
    pub log_file: Option<String>,

    /// Text report output
    #[arg(long)]
    pub report_file: Option<String>,

    /// Chart output (SVG)
    #[arg(long)]
    pub chart_file: Option<String>,

    /// Don't draw the chart
    #[arg(long)]
    pub no_chart: bool,

    /// Also print the report to stdout
    #[arg(long)]
    pub print: bool,
}

impl ReportCommand {
    pub fn apply(&self, config: &mut MonitorConfig) {
        if let Some(log_file) = &self.log_file {
            config.log_file = log_file.clone();
        }
        if let Some(report_file) = &self.report_file {
            config.report_file = report_file.clone();
        }
        if let Some(chart_file) = &self.chart_file {
            config.chart_file = chart_file.clone();
        }
    }
}

/// Show monitoring history
#[derive(Debug, Args, Clone)]
pub struct HistoryCommand {
    /// Only runs against this host
    #[arg(long)]
    pub host: Option<String>,

    /// Number of recent runs to show
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Show a single run by ID
    #[arg(long)]
    pub run_id: Option<String>,
}

/// Print the effective settings as YAML
#[derive(Debug, Args, Clone)]
pub struct SettingsCommand {
    #[command(flatten)]
    pub overrides: MonitorOverrides,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_only_touch_given_fields() {
        let mut config = MonitorConfig {
            host: "from-file.example".to_string(),
            ping_count: 7,
            ..MonitorConfig::default()
        };
        let overrides = MonitorOverrides {
            interval: Some(5.0),
            check_method: Some(CheckMethod::Ping),
            duration: Some(60.0),
            ..MonitorOverrides::default()
        };

        overrides.apply(&mut config);

        assert_eq!(config.host, "from-file.example");
        assert_eq!(config.ping_count, 7);
        assert_eq!(config.interval_secs, 5.0);
        assert_eq!(config.check_method, CheckMethod::Ping);
        assert_eq!(config.duration_secs, Some(60.0));
    }

    #[test]
    fn test_flags_repair_invalid_file_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.yaml");
        std::fs::write(&path, "interval_secs: 0\nhost: from-file.example\n").unwrap();

        let mut config = MonitorConfig::read_file(&path).unwrap();
        let overrides = MonitorOverrides {
            interval: Some(2.0),
            ..MonitorOverrides::default()
        };
        overrides.apply(&mut config);

        config.validate().unwrap();
        assert_eq!(config.interval_secs, 2.0);
        assert_eq!(config.host, "from-file.example");
    }

    #[test]
    fn test_report_command_paths() {
        let mut config = MonitorConfig::default();
        let cmd = ReportCommand {
            log_file: Some("old.csv".to_string()),
            report_file: None,
            chart_file: Some("old.svg".to_string()),
            no_chart: false,
            print: false,
        };
        cmd.apply(&mut config);
        assert_eq!(config.log_file, "old.csv");
        assert_eq!(config.report_file, "connection_report.txt");
        assert_eq!(config.chart_file, "old.svg");
    }
}
