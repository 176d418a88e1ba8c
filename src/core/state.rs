//! Monitoring state models

use chrono::{DateTime, Duration, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall status of a monitoring run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run has not started
    Pending,
    /// Run is checking
    Running,
    /// Configured duration elapsed
    Completed,
    /// Stopped by the user (Ctrl+C)
    Interrupted,
    /// Stopped by an error (e.g. the log became unwritable)
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "Pending",
            RunStatus::Running => "Running",
            RunStatus::Completed => "Completed",
            RunStatus::Interrupted => "Interrupted",
            RunStatus::Failed => "Failed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Running" => RunStatus::Running,
            "Completed" => RunStatus::Completed,
            "Interrupted" => RunStatus::Interrupted,
            "Failed" => RunStatus::Failed,
            _ => RunStatus::Pending,
        }
    }
}

/// A change of link status seen by [`LinkState`]
#[derive(Debug, Clone, PartialEq)]
pub enum LinkTransition {
    /// Connected → disconnected
    Lost {
        outage_number: usize,
        at: DateTime<Local>,
    },
    /// Disconnected → connected
    Restored {
        at: DateTime<Local>,
        after: Duration,
    },
}

/// Live tracker of connected/disconnected transitions
#[derive(Debug, Clone, Default)]
pub struct LinkState {
    last_connected: Option<bool>,
    outages: usize,
    outage_started: Option<DateTime<Local>>,
}

impl LinkState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one check result
    ///
    /// The first observation only sets the baseline.
    pub fn observe(&mut self, connected: bool, at: DateTime<Local>) -> Option<LinkTransition> {
        let previous = self.last_connected.replace(connected)?;
        match (previous, connected) {
            (true, false) => {
                self.outages += 1;
                self.outage_started = Some(at);
                Some(LinkTransition::Lost {
                    outage_number: self.outages,
                    at,
                })
            }
            (false, true) => {
                let after = self
                    .outage_started
                    .take()
                    .map(|start| at.signed_duration_since(start))
                    .unwrap_or_else(Duration::zero);
                Some(LinkTransition::Restored { at, after })
            }
            _ => None,
        }
    }

    /// Number of outages seen so far
    pub fn outages(&self) -> usize {
        self.outages
    }

    /// Last observed status
    pub fn is_connected(&self) -> Option<bool> {
        self.last_connected
    }
}

/// Bookkeeping for a monitoring run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Unique run ID
    pub run_id: Uuid,

    /// Current status
    pub status: RunStatus,

    /// When monitoring started
    pub started_at: Option<DateTime<Utc>>,

    /// When monitoring stopped
    pub completed_at: Option<DateTime<Utc>>,

    /// Checks performed
    pub checks: usize,

    /// Checks that found the host reachable
    pub connected_checks: usize,

    /// Connection losses seen live
    pub outages: usize,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            status: RunStatus::Pending,
            started_at: None,
            completed_at: None,
            checks: 0,
            connected_checks: 0,
            outages: 0,
        }
    }

    /// Mark run as started
    pub fn start(&mut self) {
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Count one check
    pub fn record(&mut self, connected: bool) {
        self.checks += 1;
        if connected {
            self.connected_checks += 1;
        }
    }

    /// Mark run as stopped with the given status
    pub fn finish(&mut self, status: RunStatus) {
        self.status = status;
        self.completed_at = Some(Utc::now());
    }

    /// Share of connected checks (0.0 to 1.0)
    pub fn availability(&self) -> f64 {
        if self.checks == 0 {
            return 0.0;
        }
        self.connected_checks as f64 / self.checks as f64
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}
