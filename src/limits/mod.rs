//! Outbound limits subsystem.
//!
//! # Data Flow
//! ```text
//! Check triggered:
//!     → admission.rs (global cap on in-flight checks)
//!     → rate_limit.rs (per-host sliding window, per attempt)
//!     → HTTP attempt
//!     → rate_limit.rs (throttling statuses push the host back)
//! ```
//!
//! # Design Decisions
//! - The admission gate and the rate limiter are independent
//! - Limiter state is per host; unrelated hosts never share a lock
//! - Waiting is async; no worker blocks a runtime thread

pub mod admission;
pub mod rate_limit;

pub use admission::{AdmissionGate, AdmissionPermit};
pub use rate_limit::HostRateLimiter;
