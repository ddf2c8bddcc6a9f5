//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Workers, limiter and monitor produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stderr (pretty, compact or JSON)
//!     → whatever `metrics` recorder the embedder installs
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event (endpoint, host, attempt)
//! - Metrics are cheap and exporter-agnostic
//! - Availability lines are output, not logs; see `health::report`

pub mod logging;
pub mod metrics;
