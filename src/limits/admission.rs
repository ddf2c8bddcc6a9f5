//! Global admission gate for in-flight checks.

use std::sync::Arc;

use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

use crate::observability::metrics;

/// Counting gate bounding how many checks run at once across all endpoints.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// Held for the lifetime of one check; frees the slot on drop.
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
    gate: AdmissionGate,
}

impl AdmissionGate {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a free slot.
    pub async fn admit(&self) -> Result<AdmissionPermit, AcquireError> {
        let permit = self.semaphore.clone().acquire_owned().await?;
        metrics::record_in_flight(self.in_flight());
        Ok(AdmissionPermit {
            _permit: permit,
            gate: self.clone(),
        })
    }

    /// Stop admitting; pending and future `admit` calls fail.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        // The semaphore permit is released after this body runs.
        metrics::record_in_flight(self.gate.in_flight().saturating_sub(1));
    }
}
