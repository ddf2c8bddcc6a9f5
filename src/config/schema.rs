//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the checker.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Longest duration any setting may express: one day.
pub const MAX_DURATION_SECS: u64 = 86_400;

/// Convert fractional seconds, clamped to `0..=MAX_DURATION_SECS`. NaN maps to zero.
pub(crate) fn duration_from_secs_f64(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.clamp(0.0, MAX_DURATION_SECS as f64)).unwrap_or(Duration::ZERO)
}

fn capped_secs(secs: u64) -> Duration {
    Duration::from_secs(secs.min(MAX_DURATION_SECS))
}

/// Root configuration for the health checker.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HealthcheckConfig {
    /// Cycle scheduling and classification.
    pub healthcheck: CycleConfig,

    /// HTTP session settings.
    pub session: SessionConfig,

    /// Outbound rate limiting.
    pub rate_limiter: RateLimiterConfig,

    /// Retry budgets and backoff.
    pub request_retry: RetryConfig,

    /// Diagnostic logging.
    pub logging: LoggingConfig,

    /// Where availability lines go.
    pub report: ReportConfig,
}

/// Cycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Seconds between the start of two cycles.
    pub interval_secs: u64,

    /// Maximum number of checks in flight across all endpoints.
    pub max_concurrent_requests: usize,

    /// A 2xx response slower than this is classified DOWN.
    pub latency_threshold_ms: u64,

    /// Delay before the first cycle starts.
    pub first_check_delay_ms: u64,

    /// How long a cycle waits for its checks before reporting.
    /// Defaults to one interval.
    pub grace_period_secs: Option<u64>,
}

impl CycleConfig {
    pub fn interval(&self) -> Duration {
        capped_secs(self.interval_secs)
    }

    pub fn latency_threshold(&self) -> Duration {
        Duration::from_millis(self.latency_threshold_ms)
    }

    pub fn first_check_delay(&self) -> Duration {
        Duration::from_millis(self.first_check_delay_ms).min(capped_secs(MAX_DURATION_SECS))
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period_secs
            .map(capped_secs)
            .unwrap_or_else(|| self.interval())
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            interval_secs: 15,
            max_concurrent_requests: 100,
            latency_threshold_ms: 500,
            first_check_delay_ms: 500,
            grace_period_secs: None,
        }
    }
}

/// HTTP session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Per-attempt timeout in seconds, applied to connect and to the whole request.
    pub request_timeout_secs: f64,

    /// User-Agent sent when the endpoint does not set one.
    pub user_agent: Option<String>,

    /// Honor HTTP(S)_PROXY / NO_PROXY from the environment.
    pub proxy_from_env: bool,
}

impl SessionConfig {
    pub fn request_timeout(&self) -> Duration {
        duration_from_secs_f64(self.request_timeout_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 0.5,
            user_agent: None,
            proxy_from_env: true,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimiterConfig {
    /// Maximum requests per second (per host when `per_host` is set).
    pub per_second: u32,

    /// Keep a separate window for each host.
    pub per_host: bool,

    /// Response statuses that signal the host is throttling us.
    pub limit_statuses: Vec<u16>,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            per_second: 5,
            per_host: true,
            limit_statuses: vec![429],
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries allowed for statuses in `status_forcelist`.
    pub status: u32,

    /// Statuses that are retried.
    pub status_forcelist: Vec<u16>,

    /// Methods eligible for status and read retries.
    pub allowed_methods: Vec<String>,

    /// Use the server's Retry-After value instead of the computed backoff.
    pub respect_retry_after_header: bool,

    /// Backoff for retry n is `backoff_factor * 2^(n-1)` seconds.
    pub backoff_factor: f64,

    /// Fraction of the backoff that may be shaved off at random (0.0..=1.0).
    pub backoff_jitter: f64,

    /// Upper bound on the computed backoff in seconds.
    pub backoff_max_secs: f64,

    /// Retries allowed for connection errors.
    pub connect: u32,

    /// Retries allowed for read errors and timeouts.
    pub read: u32,

    /// Retries allowed for any other transport error.
    pub other: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            status: 3,
            status_forcelist: vec![429],
            allowed_methods: ["DELETE", "GET", "HEAD", "OPTIONS", "PUT", "TRACE"]
                .into_iter()
                .map(String::from)
                .collect(),
            respect_retry_after_header: true,
            backoff_factor: 0.5,
            backoff_jitter: 1.0,
            backoff_max_secs: 120.0,
            connect: 0,
            read: 0,
            other: 0,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub level: String,

    /// Output format for diagnostic events.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Destination of the per-cycle availability lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportOutput {
    /// Bare lines on stdout.
    #[default]
    Stdout,
    /// One `info` event per line through the logging subscriber.
    Log,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ReportConfig {
    pub output: ReportOutput,
}
