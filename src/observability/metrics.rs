//! Metrics collection.
//!
//! # Responsibilities
//! - Define checker metrics (attempts, retries, outcomes, availability)
//! - Record through the `metrics` facade; installing a recorder is up to the embedder
//!
//! # Metrics
//! - `healthcheck_attempts_total` (counter): HTTP attempts by host, result
//! - `healthcheck_attempt_duration_seconds` (histogram): time to response headers
//! - `healthcheck_retries_total` (counter): retries by host
//! - `healthcheck_rate_limited_total` (counter): throttling statuses by host
//! - `healthcheck_rate_limit_wait_seconds` (histogram): time spent waiting for a slot
//! - `healthcheck_outcomes_total` (counter): outcomes by domain, outcome
//! - `healthcheck_availability_percent` (gauge): latest availability by domain
//! - `healthcheck_in_flight` (gauge): checks holding an admission permit

use std::time::Duration;

use crate::health::state::{AttemptResult, Outcome};

pub fn record_attempt(host: &str, result: &AttemptResult) {
    let label = match result {
        AttemptResult::Response { status, .. } => status.as_u16().to_string(),
        AttemptResult::Failed { kind, .. } => kind.as_str().to_string(),
    };
    metrics::counter!(
        "healthcheck_attempts_total",
        "host" => host.to_string(),
        "result" => label
    )
    .increment(1);
    metrics::histogram!("healthcheck_attempt_duration_seconds", "host" => host.to_string())
        .record(result.latency().as_secs_f64());
}

pub fn record_retry(host: &str) {
    metrics::counter!("healthcheck_retries_total", "host" => host.to_string()).increment(1);
}

pub fn record_rate_limited(host: &str, status: u16) {
    metrics::counter!(
        "healthcheck_rate_limited_total",
        "host" => host.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_rate_limit_wait(host: &str, waited: Duration) {
    metrics::histogram!("healthcheck_rate_limit_wait_seconds", "host" => host.to_string())
        .record(waited.as_secs_f64());
}

pub fn record_outcome(domain: &str, outcome: Outcome) {
    metrics::counter!(
        "healthcheck_outcomes_total",
        "domain" => domain.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

pub fn record_availability(domain: &str, percentage: u64) {
    metrics::gauge!("healthcheck_availability_percent", "domain" => domain.to_string())
        .set(percentage as f64);
}

pub fn record_in_flight(count: usize) {
    metrics::gauge!("healthcheck_in_flight").set(count as f64);
}
