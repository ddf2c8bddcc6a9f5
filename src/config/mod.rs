//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → HealthcheckConfig (validated, immutable)
//!     → handed by value to each subsystem at startup
//!
//! endpoint file (YAML)
//!     → loader.rs (parse)
//!     → Endpoint::try_from (request-ready descriptors)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_endpoints, ConfigError, EndpointsError};
pub use schema::{
    CycleConfig, HealthcheckConfig, LogFormat, LoggingConfig, RateLimiterConfig, ReportConfig,
    ReportOutput, RetryConfig, SessionConfig, MAX_DURATION_SECS,
};
