//! Interactive settings prompts

use crate::core::{CheckMethod, MonitorConfig};
use anyhow::{Context, Result};
use console::{style, Term};
use std::fmt::Display;
use std::io;
use std::str::FromStr;

/// Something that answers prompts one line at a time
pub trait LineSource {
    fn ask(&mut self, question: &str) -> io::Result<String>;

    /// Report an answer that could not be used
    fn complain(&mut self, _message: &str) {}
}

impl LineSource for Term {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        self.write_str(question)?;
        self.read_line()
    }

    fn complain(&mut self, message: &str) {
        let _ = self.write_line(&style(message).yellow().to_string());
    }
}

/// Ask until the answer parses; an empty answer keeps `current`
fn ask_value<T, S>(source: &mut S, label: &str, current: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: Display,
    S: LineSource,
{
    loop {
        let answer = source
            .ask(&format!("{} [{}]: ", label, current))
            .with_context(|| format!("Failed to read {}", label))?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(current);
        }
        match answer.parse::<T>() {
            Ok(value) => return Ok(value),
            Err(e) => source.complain(&format!("Invalid value for {}: {}", label, e)),
        }
    }
}

/// Like [`ask_value`], with `none` clearing the value
fn ask_optional<S: LineSource>(source: &mut S, label: &str, current: Option<f64>) -> Result<Option<f64>> {
    let shown = current.map_or_else(|| "none".to_string(), |v| v.to_string());
    loop {
        let answer = source
            .ask(&format!("{} [{}]: ", label, shown))
            .with_context(|| format!("Failed to read {}", label))?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(current);
        }
        if answer.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        match answer.parse::<f64>() {
            Ok(value) => return Ok(Some(value)),
            Err(e) => source.complain(&format!("Invalid value for {}: {}", label, e)),
        }
    }
}

/// Walk through every setting, starting from `config`
pub fn prompt_settings<S: LineSource>(source: &mut S, config: &MonitorConfig) -> Result<MonitorConfig> {
    Ok(MonitorConfig {
        host: ask_value(source, "Host", config.host.clone())?,
        check_method: ask_value::<CheckMethod, _>(source, "Check method (ping/socket/http/udp/all)", config.check_method)?,
        interval_secs: ask_value(source, "Interval (s)", config.interval_secs)?,
        ping_count: ask_value(source, "Ping count", config.ping_count)?,
        timeout_secs: ask_value(source, "Timeout (s)", config.timeout_secs)?,
        http_url: ask_value(source, "HTTP URL", config.http_url.clone())?,
        socket_port: ask_value(source, "Socket port", config.socket_port)?,
        duration_secs: ask_optional(source, "Duration (s, none = until Ctrl+C)", config.duration_secs)?,
        log_file: ask_value(source, "Log file", config.log_file.clone())?,
        report_file: ask_value(source, "Report file", config.report_file.clone())?,
        chart_file: ask_value(source, "Chart file", config.chart_file.clone())?,
    })
}
