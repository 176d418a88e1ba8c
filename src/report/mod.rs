//! Reports built from the sample log

pub mod chart;
pub mod stats;
pub mod text;

pub use chart::render_chart;
pub use stats::{analyze, find_outages, Outage, ReportStats, Spread};
pub use text::{render_text, write_report};

use crate::persistence::SampleLog;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where a report goes
#[derive(Debug, Clone)]
pub struct ReportTargets {
    pub report_file: PathBuf,
    /// None skips the chart
    pub chart_file: Option<PathBuf>,
}

/// What [`generate`] produced
#[derive(Debug, Clone)]
pub enum ReportOutcome {
    /// The log does not exist
    NoLog,
    /// The log exists but holds no samples
    NoSamples,
    /// Report written; `chart_written` tells whether the chart was too
    Written {
        stats: Box<ReportStats>,
        chart_written: bool,
    },
}

/// Analyze `log` and write the text report and chart
///
/// A chart failure is logged and does not fail the report.
pub fn generate(log: &SampleLog, targets: &ReportTargets) -> Result<ReportOutcome> {
    if !log.exists() {
        return Ok(ReportOutcome::NoLog);
    }

    let samples = log
        .read_all()
        .with_context(|| format!("Failed to read {}", log.path().display()))?;
    let Some(stats) = analyze(&samples) else {
        return Ok(ReportOutcome::NoSamples);
    };

    write_report(&stats, &targets.report_file)
        .with_context(|| format!("Failed to write {}", targets.report_file.display()))?;
    info!("Report written to {}", targets.report_file.display());

    let chart_written = match &targets.chart_file {
        Some(path) => write_chart(&samples, path),
        None => false,
    };

    Ok(ReportOutcome::Written {
        stats: Box::new(stats),
        chart_written,
    })
}

fn write_chart(samples: &[crate::core::Sample], path: &Path) -> bool {
    match render_chart(samples, path) {
        Ok(()) => {
            info!("Chart written to {}", path.display());
            true
        }
        Err(e) => {
            warn!("Failed to render chart: {:#}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Sample;
    use chrono::{Local, TimeZone};

    fn targets(dir: &Path, chart: bool) -> ReportTargets {
        ReportTargets {
            report_file: dir.join("report.txt"),
            chart_file: chart.then(|| dir.join("chart.svg")),
        }
    }

    #[test]
    fn test_missing_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = SampleLog::new(dir.path().join("absent.csv"));
        let outcome = generate(&log, &targets(dir.path(), true)).unwrap();
        assert!(matches!(outcome, ReportOutcome::NoLog));
        assert!(!dir.path().join("report.txt").exists());
    }

    #[test]
    fn test_header_only_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, format!("{}\n", crate::persistence::sample_log::HEADER.join(","))).unwrap();

        let outcome = generate(&SampleLog::new(&path), &targets(dir.path(), true)).unwrap();
        assert!(matches!(outcome, ReportOutcome::NoSamples));
    }

    #[test]
    fn test_generate_writes_report_and_chart() {
        let dir = tempfile::tempdir().unwrap();
        let log = SampleLog::new(dir.path().join("log.csv"));
        for (i, connected) in [true, false, true].into_iter().enumerate() {
            let at = Local.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap();
            log.append(&Sample::new(at, connected)).unwrap();
        }

        let outcome = generate(&log, &targets(dir.path(), true)).unwrap();
        match outcome {
            ReportOutcome::Written { stats, chart_written } => {
                assert_eq!(stats.total_checks, 3);
                assert_eq!(stats.outages.len(), 1);
                assert!(chart_written);
            }
            other => panic!("Expected Written, got {:?}", other),
        }
        assert!(dir.path().join("report.txt").exists());
        assert!(dir.path().join("chart.svg").exists());
    }

    #[test]
    fn test_generate_without_chart() {
        let dir = tempfile::tempdir().unwrap();
        let log = SampleLog::new(dir.path().join("log.csv"));
        log.append(&Sample::new(Local::now(), true)).unwrap();

        let outcome = generate(&log, &targets(dir.path(), false)).unwrap();
        assert!(matches!(outcome, ReportOutcome::Written { chart_written: false, .. }));
        assert!(!dir.path().join("chart.svg").exists());
    }
}
