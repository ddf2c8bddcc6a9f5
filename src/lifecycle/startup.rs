//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration (defaults when no file is given)
//! - Load the endpoint list
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Nothing is probed until every endpoint has been accepted

use std::path::Path;

use thiserror::Error;

use crate::config::{load_config, load_endpoints, ConfigError, EndpointsError, HealthcheckConfig};
use crate::health::Endpoint;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("config {path}: {source}")]
    Config { path: String, source: ConfigError },

    #[error("endpoints {path}: {source}")]
    Endpoints { path: String, source: EndpointsError },
}

/// Load the configuration and the endpoints the checker will run with.
pub fn prepare(
    config_path: Option<&Path>,
    endpoints_path: &Path,
) -> Result<(HealthcheckConfig, Vec<Endpoint>), StartupError> {
    let config = match config_path {
        Some(path) => load_config(path).map_err(|source| StartupError::Config {
            path: path.display().to_string(),
            source,
        })?,
        None => HealthcheckConfig::default(),
    };

    let endpoints = load_endpoints(endpoints_path).map_err(|source| StartupError::Endpoints {
        path: endpoints_path.display().to_string(),
        source,
    })?;

    Ok((config, endpoints))
}
