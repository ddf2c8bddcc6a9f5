//! Active health checking.
//!
//! # Responsibilities
//! - Drive the global cycle ticker
//! - Fan out one check per idle endpoint worker
//! - Wait for the cycle's checks (bounded by a grace period)
//! - Publish one availability report per cycle

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::HealthcheckConfig;
use crate::health::availability::{availability_line, AvailabilityTracker};
use crate::health::endpoint::Endpoint;
use crate::health::state::Outcome;
use crate::health::worker::{EndpointWorker, Prober};
use crate::limits::AdmissionGate;
use crate::observability::metrics;

/// Ticks arriving later than this are reported as missed start times.
const LATE_TICK_TOLERANCE: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Availability snapshot taken at the end of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// 1-based cycle number.
    pub cycle: u64,
    /// Percentage per domain, ordered by domain name.
    pub availability: BTreeMap<String, u64>,
    /// Checks that finished within the grace period.
    pub completed: usize,
    /// Checks still running when the report was taken.
    pub pending: usize,
    /// Endpoints skipped because their previous check was still in flight.
    pub skipped: usize,
}

impl CycleReport {
    /// One `"{domain} has {percentage}% availability percentage"` line per domain.
    pub fn lines(&self) -> Vec<String> {
        self.availability
            .iter()
            .map(|(domain, percentage)| availability_line(domain, *percentage))
            .collect()
    }
}

pub struct HealthMonitor {
    workers: Vec<EndpointWorker>,
    prober: Arc<Prober>,
    tracker: Arc<AvailabilityTracker>,
    gate: AdmissionGate,
    interval: Duration,
    first_check_delay: Duration,
    grace_period: Duration,
}

impl HealthMonitor {
    pub fn new(
        endpoints: Vec<Endpoint>,
        config: &HealthcheckConfig,
    ) -> Result<Self, MonitorError> {
        let prober = Prober::new(config)?;
        Ok(Self::with_prober(endpoints, config, prober))
    }

    pub fn with_prober(
        endpoints: Vec<Endpoint>,
        config: &HealthcheckConfig,
        prober: Prober,
    ) -> Self {
        let cycle = &config.healthcheck;
        Self {
            workers: endpoints.into_iter().map(EndpointWorker::new).collect(),
            prober: Arc::new(prober),
            tracker: Arc::new(AvailabilityTracker::new()),
            gate: AdmissionGate::new(cycle.max_concurrent_requests),
            interval: cycle.interval(),
            first_check_delay: cycle.first_check_delay(),
            grace_period: cycle.grace_period(),
        }
    }

    pub fn tracker(&self) -> &Arc<AvailabilityTracker> {
        &self.tracker
    }

    pub fn workers(&self) -> &[EndpointWorker] {
        &self.workers
    }

    /// Run cycles until shutdown, sending each report to `reports`.
    pub async fn run(
        self,
        reports: mpsc::UnboundedSender<CycleReport>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        tracing::info!(
            endpoints = self.workers.len(),
            interval = ?self.interval,
            max_concurrent_requests = self.gate.capacity(),
            "Health monitor starting"
        );

        let mut ticker = time::interval_at(Instant::now() + self.first_check_delay, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut cycle = 0;

        loop {
            tokio::select! {
                scheduled = ticker.tick() => {
                    let lag = Instant::now().saturating_duration_since(scheduled);
                    if lag > LATE_TICK_TOLERANCE {
                        tracing::warn!(lag = ?lag, "Missed start time");
                    }

                    cycle += 1;
                    let report = tokio::select! {
                        report = self.run_cycle(cycle) => report,
                        _ = shutdown.recv() => break,
                    };
                    if reports.send(report).is_err() {
                        tracing::info!("Report receiver dropped, stopping health monitor");
                        break;
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }

        self.gate.close();
    }

    /// Run a single cycle and return its report.
    ///
    /// Checks that outlive the grace period keep running in the background and
    /// record their outcome when they finish; their endpoints are skipped by
    /// later cycles until then.
    pub async fn run_cycle(&self, cycle: u64) -> CycleReport {
        let mut checks = JoinSet::new();
        let mut skipped = 0;

        for worker in &self.workers {
            let Some(guard) = worker.try_begin() else {
                tracing::warn!(
                    cycle,
                    endpoint = %worker.endpoint().name,
                    "Previous check still in flight, skipping endpoint this cycle"
                );
                skipped += 1;
                continue;
            };

            let endpoint = worker.endpoint().clone();
            let prober = self.prober.clone();
            let tracker = self.tracker.clone();
            let gate = self.gate.clone();
            checks.spawn(async move {
                let _guard = guard;
                let _permit = gate.admit().await.ok()?;
                let result = prober.check(&endpoint).await;
                tracker.record(endpoint.domain(), result.outcome);
                metrics::record_outcome(endpoint.domain(), result.outcome);
                Some(result.outcome)
            });
        }

        let triggered = checks.len();
        let mut completed = 0;
        let mut up = 0;
        let deadline = Instant::now() + self.grace_period;
        while !checks.is_empty() {
            match time::timeout_at(deadline, checks.join_next()).await {
                Ok(Some(Ok(Some(outcome)))) => {
                    completed += 1;
                    if outcome == Outcome::Up {
                        up += 1;
                    }
                }
                Ok(Some(Ok(None))) => {}
                Ok(Some(Err(e))) => tracing::error!(cycle, error = %e, "Health check task failed"),
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        cycle,
                        pending = checks.len(),
                        "Cycle overran grace period, reporting anyway"
                    );
                    break;
                }
            }
        }
        let pending = checks.len();
        checks.detach_all();

        let availability = self.tracker.snapshot();
        for (domain, percentage) in &availability {
            metrics::record_availability(domain, *percentage);
        }
        tracing::debug!(cycle, triggered, completed, up, pending, skipped, "Cycle complete");

        CycleReport {
            cycle,
            availability,
            completed,
            pending,
            skipped,
        }
    }
}
