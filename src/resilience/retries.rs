//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether a finished attempt is retried
//! - Keep separate budgets for status, connect, read and other failures
//! - Compute the delay before the next attempt
//!
//! # Design Decisions
//! - Status and read retries only for methods in `allowed_methods`
//! - Connect errors always retryable (the request never left)
//! - A server-sent Retry-After replaces the computed backoff when honored

use std::collections::HashSet;
use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::Method;

use crate::config::schema::duration_from_secs_f64;
use crate::config::RetryConfig;
use crate::health::state::AttemptResult;
use crate::resilience::backoff::{apply_jitter, calculate_backoff};
use crate::resilience::timeouts::ErrorKind;

/// What to do after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the given delay, then try again.
    Retry(Duration),
    /// The attempt is final.
    Stop,
}

/// Retries consumed so far by one health check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    pub status: u32,
    pub connect: u32,
    pub read: u32,
    pub other: u32,
}

impl RetryState {
    /// Total retries taken.
    pub fn retries(&self) -> u32 {
        self.status + self.connect + self.read + self.other
    }

    /// Number of the attempt that was just made (1-based).
    pub fn attempt(&self) -> u32 {
        self.retries() + 1
    }
}

/// Retry policy built from configuration. Immutable and shared by all workers.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    status: u32,
    connect: u32,
    read: u32,
    other: u32,
    status_forcelist: HashSet<u16>,
    allowed_methods: HashSet<Method>,
    respect_retry_after: bool,
    backoff_factor: f64,
    backoff_jitter: f64,
    backoff_max: Duration,
}

impl RetryPolicy {
    pub fn new(config: &RetryConfig) -> Self {
        let allowed_methods = config
            .allowed_methods
            .iter()
            .filter_map(|m| Method::from_bytes(m.to_ascii_uppercase().as_bytes()).ok())
            .collect();

        Self {
            status: config.status,
            connect: config.connect,
            read: config.read,
            other: config.other,
            status_forcelist: config.status_forcelist.iter().copied().collect(),
            allowed_methods,
            respect_retry_after: config.respect_retry_after_header,
            backoff_factor: config.backoff_factor.max(0.0),
            backoff_jitter: config.backoff_jitter,
            backoff_max: duration_from_secs_f64(config.backoff_max_secs),
        }
    }

    /// Decide what follows `result`, charging the matching budget in `state` on retry.
    pub fn decide(
        &self,
        state: &mut RetryState,
        method: &Method,
        result: &AttemptResult,
    ) -> RetryDecision {
        let retry_after = match result {
            AttemptResult::Response { status, retry_after, .. } => {
                if !self.status_forcelist.contains(&status.as_u16())
                    || !self.is_method_retryable(method)
                {
                    return RetryDecision::Stop;
                }
                if state.status >= self.status {
                    return RetryDecision::Stop;
                }
                state.status += 1;
                *retry_after
            }
            AttemptResult::Failed { kind, .. } => {
                let (used, budget) = match kind {
                    ErrorKind::Connect => (&mut state.connect, self.connect),
                    ErrorKind::Read => {
                        if !self.is_method_retryable(method) {
                            return RetryDecision::Stop;
                        }
                        (&mut state.read, self.read)
                    }
                    ErrorKind::Other => (&mut state.other, self.other),
                };
                if *used >= budget {
                    return RetryDecision::Stop;
                }
                *used += 1;
                None
            }
        };

        let delay = match retry_after {
            Some(hint) if self.respect_retry_after => self.cap_retry_after(hint),
            _ => self.backoff(state.retries()),
        };
        RetryDecision::Retry(delay)
    }

    /// Jittered backoff before the given retry (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        apply_jitter(
            calculate_backoff(retry, self.backoff_factor, self.backoff_max),
            self.backoff_jitter,
        )
    }

    /// Bound a server-sent Retry-After hint by `backoff_max`.
    pub fn cap_retry_after(&self, hint: Duration) -> Duration {
        hint.min(self.backoff_max)
    }

    fn is_method_retryable(&self, method: &Method) -> bool {
        self.allowed_methods.contains(method)
    }
}

/// Parse a Retry-After header given in delta-seconds.
///
/// HTTP-date values are not understood and yield `None`.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    value.parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use reqwest::StatusCode;

    fn policy(config: RetryConfig) -> RetryPolicy {
        RetryPolicy::new(&RetryConfig {
            backoff_jitter: 0.0,
            ..config
        })
    }

    fn response(code: u16, retry_after: Option<Duration>) -> AttemptResult {
        AttemptResult::Response {
            status: StatusCode::from_u16(code).unwrap(),
            latency: Duration::from_millis(20),
            retry_after,
        }
    }

    fn failed(kind: ErrorKind) -> AttemptResult {
        AttemptResult::Failed {
            kind,
            latency: Duration::from_millis(500),
        }
    }

    fn is_retry(decision: &RetryDecision) -> bool {
        matches!(decision, RetryDecision::Retry(_))
    }

    #[test]
    fn test_terminal_statuses_stop_immediately() {
        let policy = policy(RetryConfig::default());
        for code in [200, 204, 404, 500, 503] {
            let mut state = RetryState::default();
            let decision = policy.decide(&mut state, &Method::GET, &response(code, None));
            assert_eq!(decision, RetryDecision::Stop);
            assert_eq!(state.retries(), 0);
        }
    }

    #[test]
    fn test_status_budget_exhaustion() {
        let policy = policy(RetryConfig {
            respect_retry_after_header: false,
            ..RetryConfig::default()
        });
        let mut state = RetryState::default();
        let mut delays = Vec::new();
        while let RetryDecision::Retry(delay) =
            policy.decide(&mut state, &Method::GET, &response(429, None))
        {
            delays.push(delay);
        }

        assert_eq!(state.attempt(), 4);
        assert_eq!(
            delays,
            vec![Duration::from_millis(500), Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[test]
    fn test_retry_after_overrides_backoff() {
        let policy = policy(RetryConfig::default());
        let mut state = RetryState::default();
        let hint = Some(Duration::from_secs(7));
        assert_eq!(
            policy.decide(&mut state, &Method::GET, &response(429, hint)),
            RetryDecision::Retry(Duration::from_secs(7))
        );

        let ignoring = self::policy(RetryConfig {
            respect_retry_after_header: false,
            ..RetryConfig::default()
        });
        let mut state = RetryState::default();
        assert_eq!(
            ignoring.decide(&mut state, &Method::GET, &response(429, hint)),
            RetryDecision::Retry(Duration::from_millis(500))
        );
    }

    #[test]
    fn test_non_idempotent_methods_skip_status_retries() {
        let policy = policy(RetryConfig::default());
        let mut state = RetryState::default();
        let decision = policy.decide(&mut state, &Method::POST, &response(429, None));
        assert_eq!(decision, RetryDecision::Stop);
    }

    #[test]
    fn test_error_budgets_are_independent() {
        let policy = policy(RetryConfig {
            connect: 1,
            read: 2,
            other: 0,
            ..RetryConfig::default()
        });
        let mut state = RetryState::default();

        let sequence = [
            (ErrorKind::Connect, true),
            (ErrorKind::Connect, false),
            (ErrorKind::Read, true),
            (ErrorKind::Read, true),
            (ErrorKind::Read, false),
            (ErrorKind::Other, false),
        ];
        for (kind, expect_retry) in sequence {
            let decision = policy.decide(&mut state, &Method::GET, &failed(kind));
            assert_eq!(is_retry(&decision), expect_retry, "{:?}", kind);
        }
        assert_eq!(
            state,
            RetryState {
                status: 0,
                connect: 1,
                read: 2,
                other: 0
            }
        );
    }

    #[test]
    fn test_connect_errors_retry_for_any_method() {
        let policy = policy(RetryConfig {
            connect: 1,
            read: 1,
            ..RetryConfig::default()
        });
        let mut state = RetryState::default();
        let connect = policy.decide(&mut state, &Method::POST, &failed(ErrorKind::Connect));
        assert!(is_retry(&connect));
        let read = policy.decide(&mut state, &Method::POST, &failed(ErrorKind::Read));
        assert_eq!(read, RetryDecision::Stop);
    }

    #[test]
    fn test_retry_after_hint_is_capped_by_backoff_max() {
        let policy = policy(RetryConfig {
            backoff_max_secs: 2.0,
            ..RetryConfig::default()
        });
        let mut state = RetryState::default();
        let huge = Some(Duration::from_secs(u64::MAX));
        assert_eq!(
            policy.decide(&mut state, &Method::GET, &response(429, huge)),
            RetryDecision::Retry(Duration::from_secs(2))
        );
        assert_eq!(
            policy.cap_retry_after(Duration::from_secs(1)),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static(" 3 "));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(3)));

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after(&headers), None);
    }
}
