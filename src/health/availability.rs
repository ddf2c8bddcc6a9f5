//! Per-domain availability tracking.
//!
//! # Responsibilities
//! - Count UP and total outcomes per domain
//! - Produce percentage snapshots for the cycle report
//!
//! # Design Decisions
//! - Counters only grow; nothing is ever reset or evicted
//! - Percentages round half up, computed in integer arithmetic
//! - Domains without outcomes are left out of snapshots

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use crate::health::state::Outcome;

/// Running counters for one domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomainStats {
    up: u64,
    total: u64,
}

impl DomainStats {
    pub fn up(&self) -> u64 {
        self.up
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    fn record(&mut self, outcome: Outcome) {
        self.total += 1;
        if outcome.is_up() {
            self.up += 1;
        }
    }

    /// `round(100 * up / total)`, halves rounded up. `None` before the first outcome.
    pub fn percentage(&self) -> Option<u64> {
        if self.total == 0 {
            return None;
        }
        Some((200 * self.up + self.total) / (2 * self.total))
    }
}

/// Thread-safe aggregator shared by every worker.
#[derive(Debug, Default)]
pub struct AvailabilityTracker {
    domains: Mutex<HashMap<String, DomainStats>>,
}

impl AvailabilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one check outcome for `domain`.
    pub fn record(&self, domain: &str, outcome: Outcome) {
        let mut domains = self.domains.lock().unwrap_or_else(PoisonError::into_inner);
        match domains.get_mut(domain) {
            Some(stats) => stats.record(outcome),
            None => {
                let mut stats = DomainStats::default();
                stats.record(outcome);
                domains.insert(domain.to_string(), stats);
            }
        }
    }

    /// Counters for a single domain.
    pub fn stats(&self, domain: &str) -> Option<DomainStats> {
        let domains = self.domains.lock().unwrap_or_else(PoisonError::into_inner);
        domains.get(domain).copied()
    }

    /// Availability percentage per domain, ordered by domain name.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        let domains = self.domains.lock().unwrap_or_else(PoisonError::into_inner);
        domains
            .iter()
            .filter_map(|(domain, stats)| stats.percentage().map(|p| (domain.clone(), p)))
            .collect()
    }
}

/// Render one availability line.
pub fn availability_line(domain: &str, percentage: u64) -> String {
    format!("{} has {}% availability percentage", domain, percentage)
}
