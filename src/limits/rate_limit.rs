//! Per-host outbound rate limiting.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use crate::config::RateLimiterConfig;
use crate::observability::metrics;

const WINDOW: Duration = Duration::from_secs(1);
const SHARED_KEY: &str = "*";

/// Sliding one-second window of granted slots for a single host.
#[derive(Debug, Default)]
struct Window {
    /// The most recent `per_second` grants, oldest first.
    grants: VecDeque<Instant>,
    /// No grant before this instant (set when the host pushes back).
    blocked_until: Option<Instant>,
}

impl Window {
    fn reserve(&mut self, now: Instant, per_second: usize) -> Instant {
        let mut slot = now;
        if let Some(blocked) = self.blocked_until {
            slot = slot.max(blocked);
        }
        if self.grants.len() >= per_second {
            let oldest = self.grants[self.grants.len() - per_second];
            slot = slot.max(oldest + WINDOW);
        }

        self.grants.push_back(slot);
        while self.grants.len() > per_second {
            self.grants.pop_front();
        }
        slot
    }
}

/// Rate limiter shared by every worker.
///
/// Each caller reserves the next free slot for its host under a short lock
/// and then sleeps outside it, so waiters are served in arrival order and
/// hosts never contend with each other.
pub struct HostRateLimiter {
    windows: DashMap<String, Arc<Mutex<Window>>>,
    per_second: usize,
    per_host: bool,
    limit_statuses: HashSet<u16>,
}

impl HostRateLimiter {
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            windows: DashMap::new(),
            per_second: config.per_second.max(1) as usize,
            per_host: config.per_host,
            limit_statuses: config.limit_statuses.iter().copied().collect(),
        }
    }

    /// Wait until one request to `host` is permitted. Returns the time spent waiting.
    pub async fn acquire(&self, host: &str) -> Duration {
        let now = Instant::now();
        let slot = self.reserve(host, now);
        let waited = slot.saturating_duration_since(now);
        if !waited.is_zero() {
            tracing::trace!(host = %host, wait = ?waited, "Waiting for rate limit slot");
            tokio::time::sleep_until(slot).await;
        }
        metrics::record_rate_limit_wait(host, waited);
        waited
    }

    /// Feed a response status back into the limiter.
    ///
    /// Returns true when the status is a throttling signal, in which case the
    /// host is blocked for `retry_after` (or one full window without a hint).
    pub fn observe(&self, host: &str, status: u16, retry_after: Option<Duration>) -> bool {
        if !self.limit_statuses.contains(&status) {
            return false;
        }
        self.penalize(host, retry_after.unwrap_or(WINDOW));
        tracing::debug!(host = %host, status, "Host signalled rate limiting, throttling");
        metrics::record_rate_limited(host, status);
        true
    }

    /// Block new grants for `host` for at least `delay` from now.
    pub fn penalize(&self, host: &str, delay: Duration) {
        let Some(until) = Instant::now().checked_add(delay) else {
            tracing::warn!(host = %host, delay = ?delay, "Throttle delay out of range, ignoring");
            return;
        };
        let window = self.window(host);
        let mut window = window.lock().unwrap_or_else(PoisonError::into_inner);
        window.blocked_until = Some(window.blocked_until.map_or(until, |b| b.max(until)));
    }

    /// Number of distinct windows created so far.
    pub fn tracked_hosts(&self) -> usize {
        self.windows.len()
    }

    fn reserve(&self, host: &str, now: Instant) -> Instant {
        let window = self.window(host);
        let mut window = window.lock().unwrap_or_else(PoisonError::into_inner);
        window.reserve(now, self.per_second)
    }

    fn window(&self, host: &str) -> Arc<Mutex<Window>> {
        let key = if self.per_host { host } else { SHARED_KEY };
        if let Some(window) = self.windows.get(key) {
            return window.clone();
        }
        self.windows.entry(key.to_string()).or_default().clone()
    }
}
