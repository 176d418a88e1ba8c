use anyhow::{Context, Result};
use connection_monitor::cli::commands::{HistoryCommand, ReportCommand, RunCommand, SettingsCommand};
use connection_monitor::cli::output::*;
use connection_monitor::cli::prompt::prompt_settings;
use connection_monitor::cli::{Cli, Command};
use connection_monitor::core::{MonitorConfig, RunState};
use connection_monitor::execution::{Checker, Monitor, MonitorEvent, MonitorOptions};
use connection_monitor::persistence::{create_summary, InMemoryPersistence, PersistenceBackend, RunSummary, SampleLog};
use connection_monitor::report::{self, render_text, ReportOutcome, ReportTargets};
use console::Term;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_monitor(cmd, &cli).await?,
        Command::Report(cmd) => build_report(cmd, &cli)?,
        Command::History(cmd) => show_history(cmd).await?,
        Command::Settings(cmd) => show_settings(cmd, &cli)?,
    }

    Ok(())
}

/// Defaults, overlaid by the settings file when one is given
///
/// Not validated yet; callers validate after applying flags.
fn load_config(cli: &Cli) -> Result<MonitorConfig> {
    match &cli.config {
        Some(path) => MonitorConfig::read_file(path)
            .with_context(|| format!("Failed to load settings from {}", path)),
        None => Ok(MonitorConfig::default()),
    }
}

#[cfg(feature = "sqlite")]
async fn open_history() -> Result<Arc<dyn PersistenceBackend>> {
    let store = connection_monitor::persistence::SqliteHistoryStore::with_default_path()
        .await
        .context("Failed to open history database")?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "sqlite"))]
async fn open_history() -> Result<Arc<dyn PersistenceBackend>> {
    warn!("Built without sqlite; history is kept in memory only");
    Ok(Arc::new(InMemoryPersistence::new()))
}

async fn run_monitor(cmd: &RunCommand, cli: &Cli) -> Result<()> {
    let mut config = load_config(cli)?;
    cmd.overrides.apply(&mut config);
    if cmd.interactive {
        config = prompt_settings(&mut Term::stdout(), &config)?;
    }
    config.validate().context("Invalid settings")?;

    println!("{} Settings:", INFO);
    println!("{}", format_settings(&config));
    println!("{}", separator());

    // Set up persistence
    let store: Arc<dyn PersistenceBackend> = if cmd.no_history {
        Arc::new(InMemoryPersistence::new())
    } else {
        open_history().await?
    };

    let checker = Checker::from_config(&config).context("Failed to set up probes")?;
    let log = SampleLog::new(&config.log_file);
    let mut monitor = Monitor::new(
        checker,
        log.clone(),
        MonitorOptions {
            host: config.host.clone(),
            interval: config.interval(),
            duration: config.duration(),
        },
    );

    // Set up event handler for console output
    let progress = config.duration().map(create_progress_bar);
    monitor.add_event_handler(move |event| {
        let line = format_monitor_event(event);
        match &progress {
            Some(bar) => {
                bar.println(line);
                match event {
                    MonitorEvent::CheckCompleted { .. } => bar.set_position(bar.elapsed().as_secs()),
                    MonitorEvent::Stopped { .. } => bar.finish_and_clear(),
                    _ => {}
                }
            }
            None => println!("{}", line),
        }
    });

    println!("{} Press Ctrl+C to stop", INFO);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let mut state = RunState::new();
    let result = monitor.run(&mut state, shutdown).await;
    println!("{}", separator());

    // The report covers whatever reached the log, even after a failure
    let targets = ReportTargets {
        report_file: PathBuf::from(&config.report_file),
        chart_file: (!cmd.no_chart).then(|| PathBuf::from(&config.chart_file)),
    };
    match report::generate(&log, &targets) {
        Ok(outcome) => print_report_outcome(&outcome, &log, &targets),
        Err(e) => println!("{} Report failed: {}", CROSS, style(format!("{:#}", e)).red()),
    }

    // Save to history
    if !cmd.no_history {
        let summary = create_summary(&config, &state);
        store.save_run(&summary).await?;
        println!(
            "{} Run saved to history (ID: {})",
            INFO,
            style(&summary.run_id.to_string()[..8]).dim()
        );
    }

    if let Err(e) = result {
        println!("\n{} Monitoring {}", CROSS, style("failed").red());
        error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn print_report_outcome(outcome: &ReportOutcome, log: &SampleLog, targets: &ReportTargets) {
    match outcome {
        ReportOutcome::NoLog => {
            println!("{} No log found at {}", WARN, style(log.path().display()).dim());
        }
        ReportOutcome::NoSamples => {
            println!("{} {} holds no samples, nothing to report", WARN, style(log.path().display()).dim());
        }
        ReportOutcome::Written { stats, chart_written } => {
            println!(
                "{} Report written to {}",
                CHECK,
                style(targets.report_file.display()).bold()
            );
            if let (true, Some(chart)) = (*chart_written, &targets.chart_file) {
                println!("{} Chart written to {}", CHECK, style(chart.display()).bold());
            }
            println!(
                "  Uptime: {}  Outages: {}  Checks: {}",
                style(format!("{:.2}%", stats.uptime_pct)).cyan(),
                style(stats.outages.len()).cyan(),
                style(stats.total_checks).cyan()
            );
        }
    }
}

fn build_report(cmd: &ReportCommand, cli: &Cli) -> Result<()> {
    let mut config = load_config(cli)?;
    cmd.apply(&mut config);

    let log = SampleLog::new(&config.log_file);
    let targets = ReportTargets {
        report_file: PathBuf::from(&config.report_file),
        chart_file: (!cmd.no_chart).then(|| PathBuf::from(&config.chart_file)),
    };

    let outcome = report::generate(&log, &targets)?;
    print_report_outcome(&outcome, &log, &targets);

    if let (true, ReportOutcome::Written { stats, .. }) = (cmd.print, &outcome) {
        println!("\n{}", render_text(stats));
    }

    Ok(())
}

async fn show_history(cmd: &HistoryCommand) -> Result<()> {
    let store = open_history().await?;

    // If specific run ID is requested
    if let Some(run_id) = &cmd.run_id {
        let run_id = uuid::Uuid::parse_str(run_id).context("Invalid run ID format")?;
        match store.load_run(run_id).await? {
            Some(summary) if cmd.json => println!("{}", serde_json::to_string_pretty(&summary)?),
            Some(summary) => print_run_details(&summary),
            None => println!("{} Run not found", WARN),
        }
        return Ok(());
    }

    let runs: Vec<RunSummary> = store
        .list_runs(cmd.host.as_deref())
        .await?
        .into_iter()
        .take(cmd.limit)
        .collect();

    if cmd.json {
        let data = serde_json::json!({ "runs": runs });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!("{} No runs found", INFO);
        return Ok(());
    }

    println!("{} Run history (showing latest {}):", INFO, cmd.limit);
    for summary in &runs {
        println!("  {}", format_run_summary(summary));
    }

    Ok(())
}

fn print_run_details(summary: &RunSummary) {
    println!("{} Run Details", INFO);
    println!("  ID: {}", style(summary.run_id).cyan());
    println!("  Host: {}", style(&summary.host).bold());
    println!("  Method: {}", style(summary.check_method).cyan());
    println!("  Status: {}", format_status(summary.status));
    println!("  Started: {}", style(summary.started_at.to_rfc3339()).dim());
    if let Some(completed) = summary.completed_at {
        println!("  Completed: {}", style(completed.to_rfc3339()).dim());
        if let Ok(duration) = completed.signed_duration_since(summary.started_at).to_std() {
            println!("  Duration: {}", style(format_duration(duration)).dim());
        }
    }
    println!(
        "  Checks: {} ({} connected, {})",
        summary.checks,
        summary.connected_checks,
        style(format!("{:.1}%", summary.availability() * 100.0)).cyan()
    );
    println!("  Outages: {}", summary.outages);
    println!("  Log: {}", style(&summary.log_file).dim());
}

fn show_settings(cmd: &SettingsCommand, cli: &Cli) -> Result<()> {
    let mut config = load_config(cli)?;
    cmd.overrides.apply(&mut config);
    config.validate().context("Invalid settings")?;
    print!("{}", config.to_yaml()?);
    Ok(())
}
