//! Synthetic HTTP availability checker.
//!
//! Probes every declared endpoint once per cycle and prints the running
//! availability of each domain.
//!
//! # Architecture Overview
//!
//! ```text
//!   endpoints.yaml ──▶ config::loader ──▶ Vec<Endpoint>
//!                                              │
//!                                              ▼
//!   ┌──────────────────────── HealthMonitor (every interval) ─────────────────────┐
//!   │                                                                              │
//!   │   ticker ──▶ EndpointWorker × N ──▶ AdmissionGate ──▶ HostRateLimiter        │
//!   │                     │                                      │                 │
//!   │                     │               ┌──────────────────────┘                 │
//!   │                     ▼               ▼                                        │
//!   │                Prober::check ──▶ HTTP attempt ──▶ RetryPolicy ─┐             │
//!   │                     │                 ▲                        │ retry       │
//!   │                     │                 └────── backoff ─────────┘             │
//!   │                     ▼                                                        │
//!   │               Outcome (Up/Down) ──▶ AvailabilityTracker ──▶ CycleReport      │
//!   └──────────────────────────────────────────────────────────────────────────────┘
//!                                                                      │
//!                                                                      ▼
//!                                                       stdout / tracing (report)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::mpsc;

use healthcheck::config::HealthcheckConfig;
use healthcheck::health::report;
use healthcheck::lifecycle::{signals, startup, Shutdown};
use healthcheck::observability::logging;
use healthcheck::HealthMonitor;

#[derive(Parser)]
#[command(name = "healthcheck")]
#[command(about = "Start healthcheck cycle for a given set of endpoints.\nPress CTRL-C to exit.")]
struct Cli {
    /// Path to YAML file with serialized endpoint data.
    endpoints: PathBuf,

    /// Path to a TOML config file (defaults apply when omitted).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single cycle, print it and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (config, endpoints) = match startup::prepare(cli.config.as_deref(), &cli.endpoints) {
        Ok(loaded) => loaded,
        Err(e) => {
            // Logging is not configured yet; fall back to the default subscriber.
            let _ = logging::init(&HealthcheckConfig::default().logging);
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };
    logging::init(&config.logging)?;

    tracing::info!(
        endpoints = endpoints.len(),
        interval_secs = config.healthcheck.interval_secs,
        max_concurrent_requests = config.healthcheck.max_concurrent_requests,
        request_timeout_secs = config.session.request_timeout_secs,
        per_second = config.rate_limiter.per_second,
        "Configuration loaded"
    );

    let output = config.report.output;
    let monitor = HealthMonitor::new(endpoints, &config)?;

    if cli.once {
        let cycle_report = monitor.run_cycle(1).await;
        report::emit(&cycle_report, output, &mut std::io::stdout())?;
        return Ok(());
    }

    let shutdown = Shutdown::new();
    let (report_tx, mut report_rx) = mpsc::unbounded_channel();
    let monitor_task = tokio::spawn(monitor.run(report_tx, shutdown.subscribe()));
    tokio::spawn(signals::wait_for_signal(shutdown.clone()));

    while let Some(cycle_report) = report_rx.recv().await {
        if let Err(e) = report::emit(&cycle_report, output, &mut std::io::stdout()) {
            tracing::error!(error = %e, "Failed to write availability report");
            shutdown.trigger();
        }
    }

    monitor_task.await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
