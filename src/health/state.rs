//! Attempt results and outcome classification.
//!
//! # States
//! - Up: the endpoint answered 2xx faster than the latency threshold
//! - Down: anything else
//!
//! # Classification
//! ```text
//! Up   ⟺ 200 <= status <= 299 && latency < threshold
//! Down otherwise (other statuses, slow 2xx, transport errors)
//! ```

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;

use crate::resilience::timeouts::ErrorKind;

/// Terminal classification of one health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Up,
    Down,
}

impl Outcome {
    pub fn is_up(&self) -> bool {
        matches!(self, Outcome::Up)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Up => "up",
            Outcome::Down => "down",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single HTTP attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    /// The server answered.
    Response {
        status: StatusCode,
        latency: Duration,
        /// Parsed Retry-After header, if any.
        retry_after: Option<Duration>,
    },
    /// No response was received.
    Failed { kind: ErrorKind, latency: Duration },
}

impl AttemptResult {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AttemptResult::Response { status, .. } => Some(*status),
            AttemptResult::Failed { .. } => None,
        }
    }

    pub fn latency(&self) -> Duration {
        match self {
            AttemptResult::Response { latency, .. } | AttemptResult::Failed { latency, .. } => {
                *latency
            }
        }
    }

    /// Classify this attempt as the terminal outcome of a check.
    pub fn classify(&self, latency_threshold: Duration) -> Outcome {
        classify(self.status(), self.latency(), latency_threshold)
    }
}

/// Classify a check from its final status and latency.
pub fn classify(
    status: Option<StatusCode>,
    latency: Duration,
    latency_threshold: Duration,
) -> Outcome {
    match status {
        Some(status) if status.is_success() && latency < latency_threshold => Outcome::Up,
        _ => Outcome::Down,
    }
}
