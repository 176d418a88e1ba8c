//! Plain-text stability report

use crate::report::stats::ReportStats;
use std::fmt::Write as _;
use std::path::Path;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render the report
pub fn render_text(stats: &ReportStats) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_sections(&mut out, stats);
    out
}

fn write_sections(out: &mut String, stats: &ReportStats) -> std::fmt::Result {
    writeln!(out, "=== CONNECTION STABILITY REPORT ===")?;
    writeln!(out)?;
    writeln!(
        out,
        "Monitoring period: {} - {}",
        stats.period_start.format(TIME_FORMAT),
        stats.period_end.format(TIME_FORMAT)
    )?;
    writeln!(
        out,
        "Total duration: {:.1} seconds ({:.1} hours)",
        stats.total_secs,
        stats.total_secs / 3600.0
    )?;
    writeln!(out)?;

    writeln!(out, "--- CONNECTION STATISTICS ---")?;
    writeln!(out, "Total checks: {}", stats.total_checks)?;
    writeln!(
        out,
        "Successful checks: {} ({:.1}%)",
        stats.connected_checks, stats.connected_pct
    )?;
    writeln!(
        out,
        "Failed checks: {} ({:.1}%)",
        stats.disconnected_checks,
        100.0 - stats.connected_pct
    )?;
    writeln!(out, "Uptime: {:.2}%", stats.uptime_pct)?;
    writeln!(out, "Outages: {}", stats.outages.len())?;
    writeln!(out)?;

    if !stats.outages.is_empty() {
        writeln!(out, "--- OUTAGES ---")?;
        for (i, outage) in stats.outages.iter().enumerate() {
            writeln!(
                out,
                "Outage #{}: start {}, end {}, duration {:.1} s",
                i + 1,
                outage.start.format(TIME_FORMAT),
                outage.end.format(TIME_FORMAT),
                outage.duration_secs()
            )?;
        }
        if let Some(spread) = &stats.outage_spread {
            writeln!(out)?;
            writeln!(out, "Average outage duration: {:.1} s", spread.avg)?;
            writeln!(out, "Longest outage: {:.1} s", spread.max)?;
            writeln!(out, "Shortest outage: {:.1} s", spread.min)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "--- PING ---")?;
    writeln!(out, "Average ping: {:.1} ms", stats.ping.avg)?;
    writeln!(out, "Maximum ping: {:.1} ms", stats.ping.max)?;
    writeln!(out, "Minimum ping: {:.1} ms", stats.ping.min)?;
    writeln!(out, "Average jitter: {:.1} ms", stats.avg_jitter_ms)?;
    writeln!(out, "Average packet loss: {:.1}%", stats.avg_packet_loss_pct)?;
    writeln!(out)?;

    writeln!(out, "--- UDP ---")?;
    writeln!(out, "Average UDP response time: {:.1} ms", stats.avg_udp_ms)?;
    writeln!(out)?;

    writeln!(out, "--- HTTP ---")?;
    writeln!(out, "Average HTTP response time: {:.1} ms", stats.avg_http_ms)?;
    writeln!(out)?;

    writeln!(out, "--- SOCKET ---")?;
    writeln!(out, "Average socket connect time: {:.1} ms", stats.avg_socket_ms)?;
    writeln!(out)?;

    write!(out, "=== END OF REPORT ===")
}

/// Render and write the report to `path`
pub fn write_report(stats: &ReportStats, path: &Path) -> std::io::Result<()> {
    std::fs::write(path, render_text(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Sample;
    use crate::report::stats::analyze;
    use chrono::{Local, TimeZone};

    fn samples(statuses: &[bool]) -> Vec<Sample> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let mut s = Sample::new(
                    Local.timestamp_opt(1_700_000_000 + i as i64 * 5, 0).unwrap(),
                    *c,
                );
                if *c {
                    s.ping_ms = Some(12.0);
                }
                s
            })
            .collect()
    }

    #[test]
    fn test_report_sections() {
        let stats = analyze(&samples(&[true, false, true, true])).unwrap();
        let text = render_text(&stats);

        assert!(text.starts_with("=== CONNECTION STABILITY REPORT ==="));
        assert!(text.contains("Total duration: 15.0 seconds (0.0 hours)"));
        assert!(text.contains("Total checks: 4"));
        assert!(text.contains("Successful checks: 3 (75.0%)"));
        assert!(text.contains("Failed checks: 1 (25.0%)"));
        assert!(text.contains("Uptime: 66.67%"));
        assert!(text.contains("Outages: 1"));
        assert!(text.contains("duration 5.0 s"));
        assert!(text.contains("Average ping: 12.0 ms"));
        assert!(text.ends_with("=== END OF REPORT ==="));
    }

    #[test]
    fn test_no_outage_section_without_outages() {
        let stats = analyze(&samples(&[true, true])).unwrap();
        let text = render_text(&stats);
        assert!(!text.contains("--- OUTAGES ---"));
        assert!(text.contains("Uptime: 100.00%"));
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        let stats = analyze(&samples(&[true])).unwrap();

        write_report(&stats, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), render_text(&stats));
    }
}
