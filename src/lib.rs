//! connection-monitor - Network connection stability monitor

pub mod cli;
pub mod core;
pub mod execution;
pub mod persistence;
pub mod probe;
pub mod report;

// Re-export commonly used types
pub use crate::core::{CheckMethod, LinkState, LinkTransition, MonitorConfig, RunState, RunStatus, Sample};
pub use crate::execution::{Checker, Monitor, MonitorEvent, MonitorOptions};
pub use crate::persistence::{PersistenceBackend, RunSummary, SampleLog};
pub use crate::probe::{PingSource, Probe, ProbeError, ProbeOutcome};
pub use crate::report::{analyze, ReportStats};
