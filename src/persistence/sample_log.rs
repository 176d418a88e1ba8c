//! CSV sample log
//!
//! One row per check, appended as the monitor runs. The column layout is
//! shared with older logs, which wrote absent metrics as the literal
//! `None`; both that and an empty cell read back as absent.

use crate::core::Sample;
use chrono::{Local, TimeZone};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Log columns, in order
pub const HEADER: [&str; 9] = [
    "timestamp",
    "datetime",
    "connected",
    "ping_time",
    "jitter",
    "packet_loss",
    "udp_time",
    "socket_time",
    "http_time",
];

/// Error types for the sample log
#[derive(Debug, Error)]
pub enum LogError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Log is missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("Malformed row at line {line}: {message}")]
    Malformed { line: u64, message: String },
}

/// Append-only CSV log of samples
#[derive(Debug, Clone)]
pub struct SampleLog {
    path: PathBuf,
}

impl SampleLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn io_error(&self, source: std::io::Error) -> LogError {
        LogError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Append one sample, writing the header first if the file is new or empty
    pub fn append(&self, sample: &Sample) -> Result<(), LogError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        let is_empty = file.metadata().map_err(|e| self.io_error(e))?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_empty {
            debug!("Starting new sample log at {}", self.path.display());
            writer.write_record(HEADER)?;
        }
        writer.write_record(encode_row(sample))?;
        writer.flush().map_err(|e| self.io_error(e))?;
        Ok(())
    }

    /// Read every sample in file order
    pub fn read_all(&self) -> Result<Vec<Sample>, LogError> {
        let file = std::fs::File::open(&self.path).map_err(|e| self.io_error(e))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(LogError::MissingColumn(name))
        };
        let columns = Columns {
            timestamp: column("timestamp")?,
            connected: column("connected")?,
            ping: column("ping_time")?,
            jitter: column("jitter")?,
            packet_loss: column("packet_loss")?,
            udp: column("udp_time")?,
            socket: column("socket_time")?,
            http: column("http_time")?,
        };

        let mut samples = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            samples.push(decode_row(&record, &columns, line)?);
        }
        Ok(samples)
    }
}

struct Columns {
    timestamp: usize,
    connected: usize,
    ping: usize,
    jitter: usize,
    packet_loss: usize,
    udp: usize,
    socket: usize,
    http: usize,
}

fn encode_metric(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn encode_row(sample: &Sample) -> [String; 9] {
    [
        sample.timestamp().to_string(),
        sample.datetime_label(),
        if sample.connected { "1" } else { "0" }.to_string(),
        encode_metric(sample.ping_ms),
        encode_metric(sample.jitter_ms),
        encode_metric(sample.packet_loss_pct),
        encode_metric(sample.udp_ms),
        encode_metric(sample.socket_ms),
        encode_metric(sample.http_ms),
    ]
}

fn decode_metric(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    line: u64,
) -> Result<Option<f64>, LogError> {
    match record.get(index).unwrap_or("") {
        "" | "None" => Ok(None),
        raw => raw.parse::<f64>().map(Some).map_err(|_| LogError::Malformed {
            line,
            message: format!("{} is not a number: '{}'", name, raw),
        }),
    }
}

fn decode_row(record: &csv::StringRecord, columns: &Columns, line: u64) -> Result<Sample, LogError> {
    let raw_ts = record.get(columns.timestamp).unwrap_or("");
    let timestamp: f64 = raw_ts.parse().map_err(|_| LogError::Malformed {
        line,
        message: format!("timestamp is not a number: '{}'", raw_ts),
    })?;
    let at = Local
        .timestamp_micros((timestamp * 1_000_000.0).round() as i64)
        .single()
        .ok_or_else(|| LogError::Malformed {
            line,
            message: format!("timestamp out of range: {}", timestamp),
        })?;

    let connected = match record.get(columns.connected).unwrap_or("") {
        "1" | "True" | "true" => true,
        "0" | "False" | "false" => false,
        other => {
            return Err(LogError::Malformed {
                line,
                message: format!("connected must be 0 or 1, got '{}'", other),
            })
        }
    };

    Ok(Sample {
        at,
        connected,
        ping_ms: decode_metric(record, columns.ping, "ping_time", line)?,
        jitter_ms: decode_metric(record, columns.jitter, "jitter", line)?,
        packet_loss_pct: decode_metric(record, columns.packet_loss, "packet_loss", line)?,
        udp_ms: decode_metric(record, columns.udp, "udp_time", line)?,
        socket_ms: decode_metric(record, columns.socket, "socket_time", line)?,
        http_ms: decode_metric(record, columns.http, "http_time", line)?,
    })
}
