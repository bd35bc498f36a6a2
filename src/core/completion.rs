//! # Completion registry: hand-off from workers to the reconciler.
//!
//! Workers call [`CompletionRegistry::mark_complete`] once, when their run loop exits.
//! The reconciler calls [`CompletionRegistry::drain_all`] at the start of each pass
//! and drops every drained id from its live set.
//!
//! ## Architecture
//! ```text
//! Worker 1 ──┐
//! Worker 2 ──┼── mark_complete(id, Completion) ──► Mutex<HashMap<Uuid, Completion>>
//! Worker N ──┘                                              │
//!                                                           ▼
//!                                 Reconciler ◄── drain_all() (swap out, FIFO by finish time)
//! ```
//!
//! ## Rules
//! - The registry is owned by one reconciler and shared only with the workers it spawns.
//! - `drain_all` swaps the map out under the lock; entries marked afterwards stay
//!   for the next drain.
//! - A second `mark_complete` for the same id is rejected and the first entry is kept.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;
use uuid::Uuid;

/// Final report of a worker, written once when its run loop exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Worker id.
    pub id: Uuid,
    /// When the run loop exited.
    pub finished_at: Instant,
    /// Number of work units executed (successful or not).
    pub executed: u64,
    /// Number of work units that failed or panicked.
    pub failed: u64,
    /// Whether a stop had been requested when the loop exited.
    pub stop_requested: bool,
}

/// Concurrency-safe map from worker id to its completion.
#[derive(Debug, Default)]
pub struct CompletionRegistry {
    inner: Mutex<HashMap<Uuid, Completion>>,
}

impl CompletionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the completion of worker `id`.
    ///
    /// Returns `false` (and keeps the first entry) if `id` was already recorded
    /// and not yet drained.
    pub fn mark_complete(&self, id: Uuid, completion: Completion) -> bool {
        match self.lock().entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(completion);
                true
            }
        }
    }

    /// Atomically empties the registry and returns its prior contents,
    /// ordered by finish time (oldest first).
    pub fn drain_all(&self) -> Vec<(Uuid, Completion)> {
        let drained = std::mem::take(&mut *self.lock());
        let mut out: Vec<(Uuid, Completion)> = drained.into_iter().collect();
        out.sort_by_key(|(_, c)| c.finished_at);
        out
    }

    /// Returns the number of completions waiting to be drained.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing is waiting to be drained.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The map holds plain values, so a poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Completion>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
