//! Configuration and endpoint loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::HealthcheckConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::health::endpoint::{Endpoint, EndpointError, EndpointSpec};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

/// Error type for endpoint file loading.
#[derive(Debug, Error)]
pub enum EndpointsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("endpoint file declares no endpoints")]
    Empty,

    #[error("Invalid endpoints: {}", join(.0))]
    Invalid(Vec<InvalidEndpoint>),
}

/// An endpoint entry that was rejected, with its position in the file.
#[derive(Debug, Error)]
#[error("#{index} ({name}): {error}")]
pub struct InvalidEndpoint {
    pub index: usize,
    pub name: String,
    pub error: EndpointError,
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<HealthcheckConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<HealthcheckConfig, ConfigError> {
    let config: HealthcheckConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load the endpoint list from a YAML file.
pub fn load_endpoints(path: &Path) -> Result<Vec<Endpoint>, EndpointsError> {
    let content = fs::read_to_string(path)?;
    parse_endpoints(&content)
}

/// Parse the endpoint list, rejecting the whole file if any entry is malformed.
pub fn parse_endpoints(content: &str) -> Result<Vec<Endpoint>, EndpointsError> {
    let specs: Vec<EndpointSpec> = serde_yaml::from_str(content)?;
    if specs.is_empty() {
        return Err(EndpointsError::Empty);
    }

    let mut endpoints = Vec::with_capacity(specs.len());
    let mut invalid = Vec::new();
    for (index, spec) in specs.into_iter().enumerate() {
        let name = spec.name.clone();
        match Endpoint::try_from(spec) {
            Ok(endpoint) => endpoints.push(endpoint),
            Err(error) => invalid.push(InvalidEndpoint { index, name, error }),
        }
    }

    if invalid.is_empty() {
        Ok(endpoints)
    } else {
        Err(EndpointsError::Invalid(invalid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{LogFormat, ReportOutput};

    const ENDPOINTS: &str = r#"
- headers:
    user-agent: fetch-synthetic-monitor
  method: GET
  name: fetch index page
  url: https://fetch.com/
- name: fetch some fake post endpoint
  url: https://fetch.com/some/post/endpoint
  method: POST
  headers:
    content-type: application/json
  body: '{"foo":"bar"}'
- name: fetch rewards index page
  url: https://www.fetchrewards.com/
"#;

    #[test]
    fn test_parse_endpoints() {
        let endpoints = parse_endpoints(ENDPOINTS).unwrap();
        assert_eq!(endpoints.len(), 3);
        assert_eq!(endpoints[0].domain(), "fetch.com");
        assert_eq!(endpoints[1].method, reqwest::Method::POST);
        assert_eq!(endpoints[2].domain(), "www.fetchrewards.com");
    }

    #[test]
    fn test_parse_endpoints_reports_every_bad_entry() {
        let content = r#"
- name: ok
  url: https://fetch.com/
- name: bad url
  url: "::"
- name: bad scheme
  url: ftp://fetch.com/
"#;
        match parse_endpoints(content) {
            Err(EndpointsError::Invalid(invalid)) => {
                let indexes: Vec<_> = invalid.iter().map(|i| i.index).collect();
                assert_eq!(indexes, vec![1, 2]);
                assert_eq!(invalid[1].name, "bad scheme");
            }
            other => panic!("expected invalid endpoints, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_endpoints_rejects_empty_and_missing_fields() {
        assert!(matches!(parse_endpoints("[]"), Err(EndpointsError::Empty)));
        assert!(matches!(
            parse_endpoints("- name: no url\n"),
            Err(EndpointsError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_config_applies_defaults() {
        let config = parse_config(
            r#"
[healthcheck]
interval_secs = 2

[rate_limiter]
per_second = 10

[logging]
format = "json"

[report]
output = "log"
"#,
        )
        .unwrap();

        assert_eq!(config.healthcheck.interval_secs, 2);
        assert_eq!(config.healthcheck.max_concurrent_requests, 100);
        assert_eq!(config.rate_limiter.per_second, 10);
        assert_eq!(config.rate_limiter.limit_statuses, vec![429]);
        assert_eq!(config.request_retry.status, 3);
        assert_eq!(config.session.request_timeout_secs, 0.5);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.report.output, ReportOutput::Log);
    }

    #[test]
    fn test_parse_config_rejects_invalid_values() {
        let err = parse_config("[healthcheck]\ninterval_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().contains("healthcheck.interval_secs"));
    }

    #[test]
    fn test_parse_config_rejects_unrepresentable_durations() {
        for content in [
            "[request_retry]\nbackoff_max_secs = 1e20\n",
            "[session]\nrequest_timeout_secs = 1e20\n",
            "[healthcheck]\ngrace_period_secs = 9223372036854775807\n",
        ] {
            let err = parse_config(content).unwrap_err();
            assert!(
                matches!(err, ConfigError::Validation(ref e) if e.len() == 1),
                "{}: {:?}",
                content,
                err
            );
        }
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("healthcheck.toml");
        std::fs::write(&path, "[session]\nrequest_timeout_secs = 1.5\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.session.request_timeout_secs, 1.5);

        let missing = load_config(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
