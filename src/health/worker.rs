//! Endpoint workers and the per-check retry loop.
//!
//! # Responsibilities
//! - Issue HTTP attempts for one endpoint, strictly one after another
//! - Wait on the rate limiter before every attempt
//! - Consult the retry policy and sleep between attempts
//! - Classify the final attempt into a single outcome
//!
//! # Check lifecycle
//! ```text
//! IDLE → AWAIT_TOKEN → SENDING → (RETRY_WAIT → AWAIT_TOKEN → SENDING)*
//!      → CLASSIFIED → REPORTED → IDLE
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::HealthcheckConfig;
use crate::health::endpoint::Endpoint;
use crate::health::state::{AttemptResult, Outcome};
use crate::limits::HostRateLimiter;
use crate::observability::metrics;
use crate::resilience::retries::{parse_retry_after, RetryDecision, RetryPolicy, RetryState};
use crate::resilience::timeouts::classify_error;

/// Result of one complete health check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub outcome: Outcome,
    /// Number of HTTP attempts made, retries included.
    pub attempts: u32,
    /// The attempt the outcome was classified from.
    pub last: AttemptResult,
}

/// Executes health checks. Shared by all workers.
pub struct Prober {
    client: reqwest::Client,
    limiter: Arc<HostRateLimiter>,
    retry: RetryPolicy,
    latency_threshold: Duration,
}

impl Prober {
    /// Build a prober with its own HTTP client.
    pub fn new(config: &HealthcheckConfig) -> Result<Self, reqwest::Error> {
        let timeout = config.session.request_timeout();
        let mut builder = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout);
        if let Some(user_agent) = &config.session.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        if !config.session.proxy_from_env {
            builder = builder.no_proxy();
        }

        Ok(Self::with_client(
            builder.build()?,
            Arc::new(HostRateLimiter::new(&config.rate_limiter)),
            RetryPolicy::new(&config.request_retry),
            config.healthcheck.latency_threshold(),
        ))
    }

    pub fn with_client(
        client: reqwest::Client,
        limiter: Arc<HostRateLimiter>,
        retry: RetryPolicy,
        latency_threshold: Duration,
    ) -> Self {
        Self {
            client,
            limiter,
            retry,
            latency_threshold,
        }
    }

    /// Run one health check for `endpoint`, retries included.
    pub async fn check(&self, endpoint: &Endpoint) -> CheckResult {
        let host = endpoint.domain();
        let mut state = RetryState::default();

        loop {
            self.limiter.acquire(host).await;
            let result = self.attempt(endpoint).await;
            metrics::record_attempt(host, &result);

            if let AttemptResult::Response {
                status,
                retry_after,
                ..
            } = &result
            {
                let hint = retry_after.map(|h| self.retry.cap_retry_after(h));
                self.limiter.observe(host, status.as_u16(), hint);
            }

            match self.retry.decide(&mut state, &endpoint.method, &result) {
                RetryDecision::Retry(delay) => {
                    tracing::debug!(
                        endpoint = %endpoint.name,
                        attempt = state.attempt() - 1,
                        status = ?result.status(),
                        delay = ?delay,
                        "Retrying health check"
                    );
                    metrics::record_retry(host);
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::Stop => {
                    let outcome = result.classify(self.latency_threshold);
                    tracing::debug!(
                        endpoint = %endpoint.name,
                        url = %endpoint.url,
                        outcome = %outcome,
                        attempts = state.attempt(),
                        status = ?result.status(),
                        latency = ?result.latency(),
                        "Health check classified"
                    );
                    return CheckResult {
                        outcome,
                        attempts: state.attempt(),
                        last: result,
                    };
                }
            }
        }
    }

    /// Send a single request and measure the time to response headers.
    async fn attempt(&self, endpoint: &Endpoint) -> AttemptResult {
        let mut request = self
            .client
            .request(endpoint.method.clone(), endpoint.url.clone())
            .headers(endpoint.headers.clone());
        if let Some(body) = &endpoint.body {
            request = request.body(body.clone());
        }

        let started = Instant::now();
        match request.send().await {
            Ok(response) => AttemptResult::Response {
                status: response.status(),
                latency: started.elapsed(),
                retry_after: parse_retry_after(response.headers()),
            },
            Err(e) => {
                let kind = classify_error(&e);
                tracing::warn!(
                    endpoint = %endpoint.name,
                    kind = %kind,
                    error = %e,
                    "Health check attempt failed"
                );
                AttemptResult::Failed {
                    kind,
                    latency: started.elapsed(),
                }
            }
        }
    }
}

/// One worker per declared endpoint.
///
/// A worker runs at most one check at a time; a tick that arrives while the
/// previous check is still in flight is skipped for this endpoint.
#[derive(Debug, Clone)]
pub struct EndpointWorker {
    endpoint: Arc<Endpoint>,
    busy: Arc<AtomicBool>,
}

/// Marks a worker busy until dropped.
#[derive(Debug)]
pub struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl EndpointWorker {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn endpoint(&self) -> &Arc<Endpoint> {
        &self.endpoint
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claim the worker for a new check, or `None` if one is already running.
    pub fn try_begin(&self) -> Option<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard {
                busy: self.busy.clone(),
            })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::endpoint::EndpointSpec;

    fn worker() -> EndpointWorker {
        EndpointWorker::new(
            Endpoint::try_from(EndpointSpec {
                name: "index".into(),
                url: "https://fetch.com/".into(),
                method: None,
                headers: None,
                body: None,
            })
            .unwrap(),
        )
    }

    #[test]
    fn test_only_one_check_in_flight() {
        let worker = worker();
        let guard = worker.try_begin().expect("idle worker");
        assert!(worker.is_busy());
        assert!(worker.try_begin().is_none());

        let clone = worker.clone();
        assert!(clone.try_begin().is_none(), "clones share the busy flag");

        drop(guard);
        assert!(!worker.is_busy());
        assert!(worker.try_begin().is_some());
    }
}
