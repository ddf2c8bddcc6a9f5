//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Attempt finished:
//!     → timeouts.rs (classify transport failures: connect / read / other)
//!     → retries.rs (check budget for that class or status)
//!     → backoff.rs (exponential delay with jitter, or Retry-After)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every attempt has a deadline
//! - Each failure class has its own budget
//! - Jittered backoff prevents thundering herd

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{RetryDecision, RetryPolicy, RetryState};
