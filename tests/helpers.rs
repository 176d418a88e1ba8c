//! Scripted probes and monitor plumbing shared by the integration tests

use async_trait::async_trait;
use connection_monitor::core::CheckMethod;
use connection_monitor::execution::{Checker, Monitor, MonitorEvent, MonitorOptions};
use connection_monitor::persistence::SampleLog;
use connection_monitor::probe::{PingSource, PingStats, Probe, ProbeError, ProbeOutcome};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Probe that replays a fixed list of latencies; `None` means unreachable.
/// Once the script runs out the last entry repeats.
pub struct ScriptedProbe {
    name: String,
    script: Arc<Vec<Option<f64>>>,
    index: Arc<AtomicUsize>,
}

impl ScriptedProbe {
    pub fn new(name: &str, script: Vec<Option<f64>>) -> Self {
        Self {
            name: name.to_string(),
            script: Arc::new(script),
            index: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A probe that never answers
    pub fn silent(name: &str) -> Self {
        Self::new(name, vec![None])
    }

    fn next(&self) -> Option<f64> {
        let idx = self.index.fetch_add(1, Ordering::SeqCst);
        self.script
            .get(idx)
            .or_else(|| self.script.last())
            .copied()
            .flatten()
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn measure(&self) -> Result<ProbeOutcome, ProbeError> {
        match self.next() {
            Some(ms) => Ok(ProbeOutcome::reachable(ms)),
            None => Err(ProbeError::Timeout(0.1)),
        }
    }
}

/// Ping source that replays round-trip averages, three echoes per check
pub struct ScriptedPing {
    inner: ScriptedProbe,
}

impl ScriptedPing {
    pub fn new(script: Vec<Option<f64>>) -> Self {
        Self {
            inner: ScriptedProbe::new("ping", script),
        }
    }
}

#[async_trait]
impl PingSource for ScriptedPing {
    async fn check(&self) -> PingStats {
        match self.inner.next() {
            Some(ms) => PingStats::from_times(&[ms, ms, ms], 3),
            None => PingStats::from_times(&[], 3),
        }
    }
}

/// Checker that only pings, following `script`
pub fn ping_checker(script: Vec<Option<f64>>) -> Checker {
    Checker::new(
        CheckMethod::Ping,
        Arc::new(ScriptedPing::new(script)),
        Arc::new(ScriptedProbe::silent("socket")),
        Arc::new(ScriptedProbe::silent("http")),
        Arc::new(ScriptedProbe::silent("udp")),
    )
}

/// A monitor that checks every millisecond with no duration limit
pub fn fast_monitor(checker: Checker, log_path: &Path) -> Monitor {
    Monitor::new(
        checker,
        SampleLog::new(log_path),
        MonitorOptions {
            host: "scripted.test".to_string(),
            interval: Duration::from_millis(1),
            duration: None,
        },
    )
}

/// Records events and fires `stop` once `checks` checks have completed
pub struct StopAfter {
    pub stop: Arc<Notify>,
    pub events: Arc<Mutex<Vec<MonitorEvent>>>,
}

impl StopAfter {
    pub fn install(monitor: &mut Monitor, checks: usize) -> Self {
        let stop = Arc::new(Notify::new());
        let events = Arc::new(Mutex::new(Vec::new()));
        let seen = AtomicUsize::new(0);

        let (stop_handle, events_handle) = (stop.clone(), events.clone());
        monitor.add_event_handler(move |event| {
            events_handle.lock().unwrap().push(event.clone());
            if let MonitorEvent::CheckCompleted { .. } = event {
                if seen.fetch_add(1, Ordering::SeqCst) + 1 == checks {
                    stop_handle.notify_one();
                }
            }
        });

        Self { stop, events }
    }

    /// Future that resolves when the requested number of checks is done
    pub fn shutdown(&self) -> impl std::future::Future<Output = ()> {
        let stop = self.stop.clone();
        async move { stop.notified().await }
    }

    pub fn events(&self) -> Vec<MonitorEvent> {
        self.events.lock().unwrap().clone()
    }
}
