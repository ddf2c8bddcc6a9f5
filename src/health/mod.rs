//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Cycle ticker (active.rs):
//!     Periodic timer
//!     → one check per idle endpoint worker (worker.rs)
//!     → outcome classified (state.rs)
//!     → recorded per domain (availability.rs)
//!     → snapshot rendered (report.rs)
//! ```
//!
//! # Design Decisions
//! - One outcome per endpoint per cycle, however many attempts it took
//! - Aggregation is per domain (URL host), not per endpoint
//! - A worker never runs two checks at once; overdue ticks are skipped

pub mod active;
pub mod availability;
pub mod endpoint;
pub mod report;
pub mod state;
pub mod worker;

pub use active::{CycleReport, HealthMonitor, MonitorError};
pub use availability::{AvailabilityTracker, DomainStats};
pub use endpoint::{Endpoint, EndpointError, EndpointSpec};
pub use state::{AttemptResult, Outcome};
pub use worker::{CheckResult, EndpointWorker, Prober};
