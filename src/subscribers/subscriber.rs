//! # Subscribe: hook into pool events.
//!
//! A subscriber sees every [`Event`] published by the reconciler, the workers and the
//! pool, in publication order, from its own worker task. It can narrow what it receives
//! with [`Subscribe::accepts`]; rejected events never take a slot in its queue.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use async_trait::async_trait;
//! use poolvisor::{Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct FailureCounter(AtomicU64);
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, _ev: &Event) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//!
//!     fn accepts(&self, kind: EventKind) -> bool {
//!         kind == EventKind::WorkFailed
//!     }
//!
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

/// Consumer of runtime events.
///
/// `on_event` runs on a worker owned by the [`SubscriberSet`](crate::SubscriberSet):
/// a slow subscriber only fills its own queue, and a panic is reported as
/// `SubscriberPanicked` instead of tearing anything down.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Returns false for event kinds this subscriber ignores. Default: everything.
    fn accepts(&self, _kind: EventKind) -> bool {
        true
    }

    /// Name reported in `SubscriberOverflow` / `SubscriberPanicked`.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue capacity (at least 1). Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
