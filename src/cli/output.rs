//! CLI output formatting

use crate::{
    core::{MonitorConfig, RunStatus, Sample},
    execution::MonitorEvent,
    persistence::RunSummary,
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

const DEFAULT_WIDTH: usize = 60;

/// Progress bar over a fixed-length run, ticking once per second
pub fn create_progress_bar(total: Duration) -> ProgressBar {
    let progress = ProgressBar::new(total.as_secs().max(1));
    let bar_style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}s {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    progress.set_style(bar_style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// A horizontal rule as wide as the terminal
pub fn separator() -> String {
    let width = term_size::dimensions().map(|(w, _)| w).unwrap_or(DEFAULT_WIDTH);
    "-".repeat(width.min(DEFAULT_WIDTH * 2))
}

/// Format a run status for display
pub fn format_status(status: RunStatus) -> String {
    match status {
        RunStatus::Pending => style("PENDING").dim().to_string(),
        RunStatus::Running => style("RUNNING").yellow().to_string(),
        RunStatus::Completed => style("COMPLETED").green().to_string(),
        RunStatus::Interrupted => style("INTERRUPTED").yellow().to_string(),
        RunStatus::Failed => style("FAILED").red().to_string(),
    }
}

fn metric(label: &str, value: Option<f64>, unit: &str) -> Option<String> {
    value.map(|v| format!("{}: {:.1}{}", label, v, unit))
}

/// Format one check result
pub fn format_sample(sample: &Sample) -> String {
    let status = if sample.connected {
        format!("{}{}", CHECK, style("CONNECTED").green())
    } else {
        format!("{}{}", CROSS, style("DISCONNECTED").red())
    };

    let metrics: Vec<String> = [
        metric("ping", sample.ping_ms, " ms"),
        metric("jitter", sample.jitter_ms, " ms"),
        metric("loss", sample.packet_loss_pct, "%"),
        metric("udp", sample.udp_ms, " ms"),
        metric("socket", sample.socket_ms, " ms"),
        metric("http", sample.http_ms, " ms"),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut line = format!("[{}] {}", style(sample.datetime_label()).dim(), status);
    if !metrics.is_empty() {
        line.push_str(&format!(" {}", style(metrics.join(", ")).dim()));
    }
    line
}

/// Format a monitor event for display
pub fn format_monitor_event(event: &MonitorEvent) -> String {
    match event {
        MonitorEvent::Started {
            run_id,
            host,
            method,
            interval,
            log_file,
        } => format!(
            "{} Monitoring {} with {} every {:.1}s, logging to {} ({})",
            ROCKET,
            style(host).bold(),
            style(method).cyan(),
            interval.as_secs_f64(),
            style(log_file).dim(),
            style(&run_id.to_string()[..8]).dim()
        ),
        MonitorEvent::CheckCompleted { sample } => format_sample(sample),
        MonitorEvent::LinkLost { outage_number, at } => format!(
            "{}{} at {} (outage #{})",
            WARN,
            style("Connection lost").red().bold(),
            at.format("%H:%M:%S"),
            outage_number
        ),
        MonitorEvent::LinkRestored { at, after } => format!(
            "{}{} at {} after {}",
            CHECK,
            style("Connection restored").green().bold(),
            at.format("%H:%M:%S"),
            format_duration(after.to_std().unwrap_or_default())
        ),
        MonitorEvent::Stopped {
            run_id,
            status,
            checks,
        } => format!(
            "{} Monitoring ({}) {} after {} checks",
            INFO,
            style(&run_id.to_string()[..8]).dim(),
            format_status(*status),
            checks
        ),
    }
}

/// Format a history entry on one line
pub fn format_run_summary(summary: &RunSummary) -> String {
    let status_icon = match summary.status {
        RunStatus::Completed => CHECK,
        RunStatus::Failed => CROSS,
        RunStatus::Running => SPINNER,
        _ => INFO,
    };

    format!(
        "{} {} - {} - {} - {} ({} checks, {} outages) - {}",
        status_icon,
        style(&summary.run_id.to_string()[..8]).dim(),
        style(summary.started_at.format("%Y-%m-%d %H:%M")).dim(),
        style(&summary.host).bold(),
        format_status(summary.status),
        summary.checks,
        summary.outages,
        style(format!("{:.1}%", summary.availability() * 100.0)).cyan()
    )
}

/// Format the effective settings as a labelled block
pub fn format_settings(config: &MonitorConfig) -> String {
    let duration = match config.duration_secs {
        Some(secs) => format!("{} s", secs),
        None => "until Ctrl+C".to_string(),
    };
    let rows = [
        ("Host", config.host.clone()),
        ("Check method", config.check_method.to_string()),
        ("Interval", format!("{} s", config.interval_secs)),
        ("Ping count", config.ping_count.to_string()),
        ("Timeout", format!("{} s", config.timeout_secs)),
        ("HTTP URL", config.http_url.clone()),
        ("Socket port", config.socket_port.to_string()),
        ("Duration", duration),
        ("Log file", config.log_file.clone()),
        ("Report file", config.report_file.clone()),
        ("Chart file", config.chart_file.clone()),
    ];

    rows.iter()
        .map(|(label, value)| format!("  {:<13} {}", format!("{}:", label), style(value).cyan()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a duration compactly
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
