//! Command-line interface

pub mod commands;
pub mod output;
pub mod prompt;

use clap::{Parser, Subcommand};
use commands::{HistoryCommand, ReportCommand, RunCommand, SettingsCommand};
use std::ffi::OsString;

/// Network connection stability monitor
#[derive(Debug, Parser, Clone)]
#[command(name = "connection-monitor")]
#[command(version)]
#[command(about = "Monitor network connection stability and report on outages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a YAML settings file
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Monitor a connection until the duration elapses or Ctrl+C
    Run(RunCommand),

    /// Build a report from an existing log without monitoring
    Report(ReportCommand),

    /// Show past monitoring runs
    History(HistoryCommand),

    /// Print the effective settings as YAML
    Settings(SettingsCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
