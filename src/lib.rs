//! Synthetic HTTP availability checker library.

pub mod config;
pub mod health;
pub mod lifecycle;
pub mod limits;
pub mod observability;
pub mod resilience;

pub use config::schema::HealthcheckConfig;
pub use health::HealthMonitor;
pub use lifecycle::Shutdown;
