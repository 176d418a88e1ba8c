//! Monitoring loop - checks, logs and tracks link transitions until stopped

use crate::core::{CheckMethod, LinkState, LinkTransition, RunState, RunStatus, Sample};
use crate::execution::Checker;
use crate::persistence::SampleLog;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Local};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};
use uuid::Uuid;

/// Events that occur during a monitoring run
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    Started {
        run_id: Uuid,
        host: String,
        method: CheckMethod,
        interval: Duration,
        log_file: String,
    },
    CheckCompleted {
        sample: Sample,
    },
    LinkLost {
        outage_number: usize,
        at: DateTime<Local>,
    },
    LinkRestored {
        at: DateTime<Local>,
        after: ChronoDuration,
    },
    Stopped {
        run_id: Uuid,
        status: RunStatus,
        checks: usize,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&MonitorEvent) + Send + Sync>;

/// Monitor settings that shape the loop itself
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub host: String,
    pub interval: Duration,
    pub duration: Option<Duration>,
}

/// Main monitoring engine
pub struct Monitor {
    checker: Checker,
    log: SampleLog,
    options: MonitorOptions,
    event_handlers: Vec<EventHandler>,
}

impl Monitor {
    pub fn new(checker: Checker, log: SampleLog, options: MonitorOptions) -> Self {
        Self {
            checker,
            log,
            options,
            event_handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&MonitorEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    fn emit_event(&self, event: MonitorEvent) {
        for handler in &self.event_handlers {
            handler(&event);
        }
    }

    /// Run until the duration elapses, `shutdown` resolves, or the log
    /// cannot be written
    ///
    /// `state` is updated in place so the caller keeps the counts even when
    /// the run ends in an error.
    pub async fn run<F>(&self, state: &mut RunState, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            "Starting monitoring of {} ({}) every {:?}",
            self.options.host,
            self.checker.method(),
            self.options.interval
        );
        state.start();
        self.emit_event(MonitorEvent::Started {
            run_id: state.run_id,
            host: self.options.host.clone(),
            method: self.checker.method(),
            interval: self.options.interval,
            log_file: self.log.path().display().to_string(),
        });

        let started = Instant::now();
        let mut link = LinkState::new();

        let result = loop {
            let sample = tokio::select! {
                biased;
                _ = &mut shutdown => break Ok(RunStatus::Interrupted),
                sample = self.checker.check() => sample,
            };

            if let Err(e) = self.log.append(&sample) {
                error!("Failed to write sample log: {}", e);
                break Err(e).with_context(|| {
                    format!("Failed to append to {}", self.log.path().display())
                });
            }

            state.record(sample.connected);
            let transition = link.observe(sample.connected, sample.at);
            self.emit_event(MonitorEvent::CheckCompleted { sample });

            match transition {
                Some(LinkTransition::Lost { outage_number, at }) => {
                    state.outages = outage_number;
                    self.emit_event(MonitorEvent::LinkLost { outage_number, at });
                }
                Some(LinkTransition::Restored { at, after }) => {
                    self.emit_event(MonitorEvent::LinkRestored { at, after });
                }
                None => {}
            }

            if let Some(limit) = self.options.duration {
                if started.elapsed() >= limit {
                    break Ok(RunStatus::Completed);
                }
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => break Ok(RunStatus::Interrupted),
                _ = tokio::time::sleep(self.options.interval) => {}
            }
        };

        let status = match &result {
            Ok(status) => *status,
            Err(_) => RunStatus::Failed,
        };
        state.finish(status);
        info!("Monitoring stopped: {:?} after {} checks", status, state.checks);
        self.emit_event(MonitorEvent::Stopped {
            run_id: state.run_id,
            status,
            checks: state.checks,
        });

        result.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MonitorConfig;
    use std::sync::Mutex;

    fn monitor(dir: &tempfile::TempDir, duration: Option<Duration>) -> Monitor {
        // Probes point at a closed local port so checks fail fast
        let config = MonitorConfig {
            host: "127.0.0.1".to_string(),
            check_method: CheckMethod::Socket,
            socket_port: 9,
            timeout_secs: 0.2,
            ..MonitorConfig::default()
        };
        let checker = Checker::from_config(&config).unwrap();
        let log = SampleLog::new(dir.path().join("log.csv"));
        Monitor::new(
            checker,
            log,
            MonitorOptions {
                host: config.host.clone(),
                interval: Duration::from_millis(10),
                duration,
            },
        )
    }

    #[tokio::test]
    async fn test_ready_shutdown_stops_before_first_check() {
        let dir = tempfile::tempdir().unwrap();
        let monitor = monitor(&dir, None);
        let mut state = RunState::new();

        monitor.run(&mut state, async {}).await.unwrap();

        assert_eq!(state.status, RunStatus::Interrupted);
        assert_eq!(state.checks, 0);
        assert!(!dir.path().join("log.csv").exists());
    }

    #[tokio::test]
    async fn test_duration_limit_completes_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut monitor = monitor(&dir, Some(Duration::from_millis(30)));

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        monitor.add_event_handler(move |event| {
            let name = match event {
                MonitorEvent::Started { .. } => "started",
                MonitorEvent::CheckCompleted { .. } => "check",
                MonitorEvent::LinkLost { .. } => "lost",
                MonitorEvent::LinkRestored { .. } => "restored",
                MonitorEvent::Stopped { .. } => "stopped",
            };
            sink.lock().unwrap().push(name);
        });

        let mut state = RunState::new();
        monitor.run(&mut state, std::future::pending()).await.unwrap();

        assert_eq!(state.status, RunStatus::Completed);
        assert!(state.checks >= 1);

        let events = events.lock().unwrap();
        assert_eq!(events.first(), Some(&"started"));
        assert_eq!(events.last(), Some(&"stopped"));
        assert_eq!(events.iter().filter(|e| **e == "check").count(), state.checks);
    }

    #[tokio::test]
    async fn test_unwritable_log_fails_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = MonitorConfig {
            host: "127.0.0.1".to_string(),
            check_method: CheckMethod::Socket,
            socket_port: 9,
            timeout_secs: 0.2,
            ..MonitorConfig::default()
        };
        let monitor = Monitor::new(
            Checker::from_config(&config).unwrap(),
            SampleLog::new(dir.path().join("missing-dir").join("log.csv")),
            MonitorOptions {
                host: config.host.clone(),
                interval: Duration::from_millis(10),
                duration: None,
            },
        );

        let mut state = RunState::new();
        let result = monitor.run(&mut state, std::future::pending()).await;

        assert!(result.is_err());
        assert_eq!(state.status, RunStatus::Failed);
        assert_eq!(state.checks, 0);
    }
}
