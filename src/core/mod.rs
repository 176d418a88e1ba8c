//! Core domain models for the monitor
//!
//! Settings, check samples, and the state tracked while a run is in
//! progress.

pub mod config;
pub mod sample;
pub mod state;

pub use config::{CheckMethod, MonitorConfig};
pub use sample::*;
pub use state::*;
