//! Smoke test - a short real monitoring run against localhost
//!
//! Needs a `ping` binary and permission to use it. Run with:
//!
//!     cargo test --test smoke_test -- --ignored

use connection_monitor::core::{CheckMethod, MonitorConfig, RunState, RunStatus};
use connection_monitor::execution::{Checker, Monitor, MonitorOptions};
use connection_monitor::persistence::SampleLog;
use std::time::Duration;

#[tokio::test]
#[ignore] // Requires ping and a loopback interface
async fn smoke_test_localhost_ping() {
    let dir = tempfile::tempdir().unwrap();
    let config = MonitorConfig {
        host: "127.0.0.1".to_string(),
        check_method: CheckMethod::Ping,
        ping_count: 1,
        interval_secs: 0.2,
        duration_secs: Some(1.0),
        log_file: dir.path().join("log.csv").display().to_string(),
        ..MonitorConfig::default()
    };

    let checker = Checker::from_config(&config).expect("Should build probes");
    let monitor = Monitor::new(
        checker,
        SampleLog::new(&config.log_file),
        MonitorOptions {
            host: config.host.clone(),
            interval: config.interval(),
            duration: config.duration(),
        },
    );

    let mut state = RunState::new();
    let result = tokio::time::timeout(
        Duration::from_secs(30),
        monitor.run(&mut state, std::future::pending()),
    )
    .await;

    match result {
        Ok(Ok(())) => {
            assert_eq!(state.status, RunStatus::Completed);
            assert!(state.checks >= 1);
            assert_eq!(state.connected_checks, state.checks, "localhost should answer");
        }
        Ok(Err(e)) => panic!("Monitoring failed: {:?}", e),
        Err(_) => panic!("Monitoring timed out"),
    }

    let samples = SampleLog::new(&config.log_file).read_all().unwrap();
    assert_eq!(samples.len(), state.checks);
    assert!(samples.iter().all(|s| s.ping_ms.is_some()));
}
