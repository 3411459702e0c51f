// photo-gate-core/src/runtime/admission.rs
// ============================================================================
// Module: Admission Pool
// Description: Fixed-size slot pool bounding concurrent image validations.
// Purpose: Enforce the system-level max_concurrent limit at the caller boundary.
// Dependencies: tokio, tracing
// ============================================================================

//! ## Overview
//! Callers acquire an admission slot before invoking the runner and release
//! it (by dropping the permit) on completion. Acquisition suspends the
//! caller; the runner itself never queues requests internally. This bounds
//! concurrent *images*; the per-image check fan-out is bounded separately by
//! the runner's worker budget.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use tokio::sync::OwnedSemaphorePermit;
use tokio::sync::Semaphore;
use tracing::debug;

// ============================================================================
// SECTION: Admission Pool
// ============================================================================

/// Fixed-size pool of validation slots.
#[derive(Clone)]
pub struct AdmissionPool {
    /// Slot semaphore shared by all callers.
    slots: Arc<Semaphore>,
    /// Configured slot count.
    capacity: usize,
}

impl AdmissionPool {
    /// Creates a pool with `max_concurrent` slots.
    ///
    /// A zero capacity is clamped to one slot; a pool that can never admit
    /// would deadlock every caller.
    #[must_use]
    pub fn new(max_concurrent: usize) -> Self {
        let capacity = max_concurrent.max(1);
        Self {
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Acquires one validation slot, suspending until one frees.
    ///
    /// The slot is released when the returned permit drops.
    pub async fn acquire(&self) -> AdmissionPermit {
        // Semaphore::acquire_owned only errors after close(), which this
        // pool never calls.
        let permit = Arc::clone(&self.slots).acquire_owned().await;
        debug!(available = self.slots.available_permits(), "admission slot acquired");
        AdmissionPermit {
            _permit: permit.ok(),
        }
    }

    /// Currently free slots.
    #[must_use]
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    /// Configured slot count.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Held validation slot; dropping it releases the slot.
pub struct AdmissionPermit {
    /// Underlying semaphore permit.
    _permit: Option<OwnedSemaphorePermit>,
}
