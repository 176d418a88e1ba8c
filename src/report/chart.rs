//! SVG chart of status and latency over time

use crate::core::Sample;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local};
use plotters::prelude::*;
use std::path::Path;

const SIZE: (u32, u32) = (1200, 1200);
const CAPTION_FONT: (&str, u32) = ("sans-serif", 22);

/// Seconds since `start` for each sample that has the metric
fn series(samples: &[Sample], start: DateTime<Local>, field: fn(&Sample) -> Option<f64>) -> Vec<(f64, f64)> {
    samples
        .iter()
        .filter_map(|s| field(s).map(|v| (offset_secs(start, s.at), v)))
        .collect()
}

fn offset_secs(start: DateTime<Local>, at: DateTime<Local>) -> f64 {
    at.signed_duration_since(start).num_milliseconds() as f64 / 1000.0
}

fn clock_label(start: DateTime<Local>, secs: f64) -> String {
    (start + Duration::milliseconds((secs * 1000.0) as i64))
        .format("%H:%M:%S")
        .to_string()
}

fn y_ceiling(points: &[(f64, f64)]) -> f64 {
    let max = points.iter().map(|(_, y)| *y).fold(0.0, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

/// Draw the three-panel chart to `path`
pub fn render_chart(samples: &[Sample], path: &Path) -> Result<()> {
    let (first, last) = match (samples.first(), samples.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => anyhow::bail!("No samples to chart"),
    };
    let start = first.at;
    let x_end = offset_secs(start, last.at).max(1.0);

    let status: Vec<(f64, f64)> = samples
        .iter()
        .map(|s| (offset_secs(start, s.at), if s.connected { 1.0 } else { 0.0 }))
        .collect();
    let ping = series(samples, start, |s| s.ping_ms);
    let udp = series(samples, start, |s| s.udp_ms);

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((3, 1));
    let x_fmt = |x: &f64| clock_label(start, *x);

    // Connection status
    let mut chart = ChartBuilder::on(&panels[0])
        .caption("Connection status over time", CAPTION_FONT)
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(90)
        .build_cartesian_2d(0.0..x_end, -0.1..1.1)?;
    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Status")
        .x_label_formatter(&x_fmt)
        .y_labels(3)
        .y_label_formatter(&|y: &f64| {
            if *y >= 0.99 {
                "Connected".to_string()
            } else if y.abs() <= 0.01 {
                "Down".to_string()
            } else {
                String::new()
            }
        })
        .draw()?;
    chart.draw_series(
        AreaSeries::new(status.iter().copied(), 0.0, BLUE.mix(0.25)).border_style(BLUE),
    )?;

    // Ping latency
    let mut chart = ChartBuilder::on(&panels[1])
        .caption("Ping response time over time", CAPTION_FONT)
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(90)
        .build_cartesian_2d(0.0..x_end, 0.0..y_ceiling(&ping))?;
    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Ping (ms)")
        .x_label_formatter(&x_fmt)
        .draw()?;
    if !ping.is_empty() {
        chart.draw_series(
            AreaSeries::new(ping.iter().copied(), 0.0, GREEN.mix(0.25)).border_style(GREEN),
        )?;
    }

    // UDP latency
    let mut chart = ChartBuilder::on(&panels[2])
        .caption("UDP response time over time", CAPTION_FONT)
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(90)
        .build_cartesian_2d(0.0..x_end, 0.0..y_ceiling(&udp))?;
    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("UDP (ms)")
        .x_label_formatter(&x_fmt)
        .draw()?;
    if !udp.is_empty() {
        chart.draw_series(LineSeries::new(udp.iter().copied(), MAGENTA))?;
    }

    root.present()
        .with_context(|| format!("Failed to write chart to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn samples() -> Vec<Sample> {
        (0..6)
            .map(|i| {
                let at = Local.timestamp_opt(1_700_000_000 + i * 2, 0).unwrap();
                let mut s = Sample::new(at, i != 3);
                if i != 3 {
                    s.ping_ms = Some(10.0 + i as f64);
                }
                if i % 2 == 0 {
                    s.udp_ms = Some(25.0);
                }
                s
            })
            .collect()
    }

    #[test]
    fn test_series_skips_absent_values() {
        let samples = samples();
        let ping = series(&samples, samples[0].at, |s| s.ping_ms);
        assert_eq!(ping.len(), 5);
        assert_eq!(ping[0], (0.0, 10.0));
        assert_eq!(ping[3], (8.0, 14.0));
    }

    #[test]
    fn test_y_ceiling() {
        assert_eq!(y_ceiling(&[]), 1.0);
        assert!((y_ceiling(&[(0.0, 10.0)]) - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_clock_label() {
        let start = Local.timestamp_opt(1_700_000_000, 0).unwrap();
        let expected = (start + Duration::seconds(65)).format("%H:%M:%S").to_string();
        assert_eq!(clock_label(start, 65.0), expected);
    }

    #[test]
    fn test_render_chart_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");

        render_chart(&samples(), &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Connection status over time"));
    }

    #[test]
    fn test_render_chart_rejects_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        assert!(render_chart(&[], &dir.path().join("chart.svg")).is_err());
    }
}
