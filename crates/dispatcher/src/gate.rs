//! AdmissionGate - bounds the number of in-flight writes

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::DispatcherError;

/// Fixed-capacity counter of concurrent-write slots
///
/// Backed by a tokio `Semaphore`, which hands out permits in FIFO order so a
/// waiting controller cannot be starved by steady release traffic.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl AdmissionGate {
    /// Create a gate with `capacity` slots
    ///
    /// 0 is treated as 1; anything above `Semaphore::MAX_PERMITS` is capped there.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Total number of slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Slots currently held
    pub fn in_use(&self) -> usize {
        self.capacity - self.available()
    }

    /// Wait for a free slot and reserve it
    ///
    /// # Errors
    /// Returns `DispatcherError::GateClosed` if the gate was closed
    pub async fn acquire(&self) -> Result<GatePermit, DispatcherError> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| DispatcherError::GateClosed)?;
        Ok(GatePermit { _permit: permit })
    }

    /// Reserve a slot only if one is free right now
    pub fn try_acquire(&self) -> Option<GatePermit> {
        Arc::clone(&self.semaphore)
            .try_acquire_owned()
            .ok()
            .map(|permit| GatePermit { _permit: permit })
    }

    /// Close the gate, failing current and future `acquire` calls
    ///
    /// Slots already held stay counted in `in_use` until released.
    pub fn close(&self) {
        self.semaphore.close();
    }
}

/// One reserved slot
///
/// The slot returns to the gate exactly once, on `release` or on drop,
/// whichever comes first.
#[derive(Debug)]
#[must_use = "dropping a permit releases its slot immediately"]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

impl GatePermit {
    /// Return the slot to the gate
    pub fn release(self) {
        drop(self);
    }
}
