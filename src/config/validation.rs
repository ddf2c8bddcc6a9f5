//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, jitter within bounds)
//! - Check status codes and method names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HealthcheckConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use reqwest::Method;
use thiserror::Error;

use crate::config::schema::{HealthcheckConfig, MAX_DURATION_SECS};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be at most {max}, got {value}")]
    TooLarge {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("{field} contains invalid HTTP status {status}")]
    InvalidStatus { field: &'static str, status: u16 },

    #[error("request_retry.allowed_methods contains invalid method '{0}'")]
    InvalidMethod(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &HealthcheckConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let max_secs = MAX_DURATION_SECS as f64;

    let cycle = &config.healthcheck;
    check_secs("healthcheck.interval_secs", cycle.interval_secs, &mut errors);
    if cycle.max_concurrent_requests == 0 {
        errors.push(ValidationError::NotPositive {
            field: "healthcheck.max_concurrent_requests",
        });
    }
    if cycle.latency_threshold_ms == 0 {
        errors.push(ValidationError::NotPositive {
            field: "healthcheck.latency_threshold_ms",
        });
    }
    if cycle.first_check_delay_ms > MAX_DURATION_SECS * 1000 {
        errors.push(ValidationError::TooLarge {
            field: "healthcheck.first_check_delay_ms",
            value: cycle.first_check_delay_ms,
            max: MAX_DURATION_SECS * 1000,
        });
    }
    if let Some(grace) = cycle.grace_period_secs {
        check_secs("healthcheck.grace_period_secs", grace, &mut errors);
    }

    let timeout = config.session.request_timeout_secs;
    if timeout.is_finite() && timeout <= 0.0 {
        errors.push(ValidationError::NotPositive {
            field: "session.request_timeout_secs",
        });
    } else {
        check_range("session.request_timeout_secs", timeout, 0.0, max_secs, &mut errors);
    }

    let limiter = &config.rate_limiter;
    if limiter.per_second == 0 {
        errors.push(ValidationError::NotPositive {
            field: "rate_limiter.per_second",
        });
    }
    check_statuses("rate_limiter.limit_statuses", &limiter.limit_statuses, &mut errors);

    let retry = &config.request_retry;
    check_statuses("request_retry.status_forcelist", &retry.status_forcelist, &mut errors);
    check_range("request_retry.backoff_factor", retry.backoff_factor, 0.0, max_secs, &mut errors);
    check_range("request_retry.backoff_jitter", retry.backoff_jitter, 0.0, 1.0, &mut errors);
    check_range(
        "request_retry.backoff_max_secs",
        retry.backoff_max_secs,
        0.0,
        max_secs,
        &mut errors,
    );
    for method in &retry.allowed_methods {
        if Method::from_bytes(method.to_ascii_uppercase().as_bytes()).is_err() {
            errors.push(ValidationError::InvalidMethod(method.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_secs(field: &'static str, value: u64, errors: &mut Vec<ValidationError>) {
    if value == 0 {
        errors.push(ValidationError::NotPositive { field });
    } else if value > MAX_DURATION_SECS {
        errors.push(ValidationError::TooLarge {
            field,
            value,
            max: MAX_DURATION_SECS,
        });
    }
}

fn check_statuses(field: &'static str, statuses: &[u16], errors: &mut Vec<ValidationError>) {
    for &status in statuses {
        if !(100..=599).contains(&status) {
            errors.push(ValidationError::InvalidStatus { field, status });
        }
    }
}

fn check_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
    errors: &mut Vec<ValidationError>,
) {
    if !value.is_finite() || value < min || value > max {
        errors.push(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
}
