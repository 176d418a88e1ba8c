//! Check execution and the monitoring loop

pub mod checker;
pub mod monitor;

pub use checker::Checker;
pub use monitor::{EventHandler, Monitor, MonitorEvent, MonitorOptions};
