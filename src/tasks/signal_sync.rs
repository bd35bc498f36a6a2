//! # SignalSync: mirror an external stop flag onto a task.
//!
//! [`SignalSync`] is a unit of [`Work`] that polls a [`FlagSource`] and copies its
//! answer onto a [`StopSignal`]. Run it inside a [`ManagedTask`](crate::ManagedTask)
//! and the watched task is suspended while the flag is up and resumes when it drops.
//!
//! ```text
//! FlagSource::read() ── true  ──► signal.set()   ──► SignalChanged{reason="suspended"}
//!                   ├── false ──► signal.clear() ──► SignalChanged{reason="resumed"}
//!                   └── Err   ──► WorkError::Fail  (signal untouched)
//! ```
//!
//! An event is only published when the flag flips.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::WorkError;
use crate::events::{Bus, Event, EventKind};
use crate::source::FlagSource;
use crate::tasks::{signal::StopSignal, work::Work};

/// Work that keeps a [`StopSignal`] in sync with an external flag.
pub struct SignalSync {
    source: Arc<dyn FlagSource>,
    signal: StopSignal,
    owner: Uuid,
    bus: Bus,
}

impl SignalSync {
    /// Mirrors `source` onto `signal`, which belongs to task `owner`.
    pub fn new(source: Arc<dyn FlagSource>, signal: StopSignal, owner: Uuid, bus: Bus) -> Self {
        Self {
            source,
            signal,
            owner,
            bus,
        }
    }
}

#[async_trait]
impl Work for SignalSync {
    fn name(&self) -> &str {
        "signal-sync"
    }

    async fn execute(&self, _task: Uuid) -> Result<(), WorkError> {
        let stop = self
            .source
            .read()
            .await
            .map_err(|e| WorkError::fail(e.as_message()))?;

        if stop == self.signal.is_set() {
            return Ok(());
        }
        let reason = if stop {
            self.signal.set();
            "suspended"
        } else {
            self.signal.clear();
            "resumed"
        };
        self.bus.publish(
            Event::new(EventKind::SignalChanged)
                .with_task(self.owner)
                .with_reason(reason),
        );
        Ok(())
    }
}
