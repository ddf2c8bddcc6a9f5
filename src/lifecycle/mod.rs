//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Load endpoints → Start monitor
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop ticking → Abandon in-flight checks → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then endpoints, then the monitor
//! - No state to flush on exit; counters live only in memory

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
