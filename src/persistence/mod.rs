//! Persistence: the CSV sample log and the run history

pub mod sample_log;
#[cfg(feature = "sqlite")]
pub mod store;

pub use sample_log::{LogError, SampleLog};
#[cfg(feature = "sqlite")]
pub use store::SqliteHistoryStore;

use crate::core::{CheckMethod, MonitorConfig, RunState, RunStatus};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Summary of one monitoring run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique run ID
    pub run_id: Uuid,

    /// Monitored host
    pub host: String,

    /// Probe selection used
    pub check_method: CheckMethod,

    /// How the run ended
    pub status: RunStatus,

    /// When monitoring started
    pub started_at: DateTime<Utc>,

    /// When monitoring stopped
    pub completed_at: Option<DateTime<Utc>>,

    /// Checks performed
    pub checks: usize,

    /// Checks that found the host reachable
    pub connected_checks: usize,

    /// Connection losses
    pub outages: usize,

    /// Sample log written by the run
    pub log_file: String,
}

impl RunSummary {
    /// Share of connected checks (0.0 to 1.0)
    pub fn availability(&self) -> f64 {
        if self.checks == 0 {
            return 0.0;
        }
        self.connected_checks as f64 / self.checks as f64
    }
}

/// Trait for run history backends
#[async_trait::async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Save (or overwrite) a run
    async fn save_run(&self, run: &RunSummary) -> Result<()>;

    /// Load a run by ID
    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>>;

    /// List runs, newest first, optionally only for one host
    async fn list_runs(&self, host: Option<&str>) -> Result<Vec<RunSummary>>;

    /// List monitored hosts
    async fn list_hosts(&self) -> Result<Vec<String>>;
}

/// In-memory history (for testing or `--no-history` runs)
pub struct InMemoryPersistence {
    runs: RwLock<HashMap<Uuid, RunSummary>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self {
            runs: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for InMemoryPersistence {
    async fn save_run(&self, run: &RunSummary) -> Result<()> {
        self.runs.write().await.insert(run.run_id, run.clone());
        Ok(())
    }

    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>> {
        Ok(self.runs.read().await.get(&run_id).cloned())
    }

    async fn list_runs(&self, host: Option<&str>) -> Result<Vec<RunSummary>> {
        let runs = self.runs.read().await;
        let mut result: Vec<RunSummary> = runs
            .values()
            .filter(|r| host.map_or(true, |h| r.host == h))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(result)
    }

    async fn list_hosts(&self) -> Result<Vec<String>> {
        let runs = self.runs.read().await;
        let mut hosts: Vec<String> = runs.values().map(|r| r.host.clone()).collect();
        hosts.sort();
        hosts.dedup();
        Ok(hosts)
    }
}

/// Create a summary from a finished run
pub fn create_summary(config: &MonitorConfig, state: &RunState) -> RunSummary {
    RunSummary {
        run_id: state.run_id,
        host: config.host.clone(),
        check_method: config.check_method,
        status: state.status,
        started_at: state.started_at.unwrap_or_else(Utc::now),
        completed_at: state.completed_at,
        checks: state.checks,
        connected_checks: state.connected_checks,
        outages: state.outages,
        log_file: config.log_file.clone(),
    }
}
