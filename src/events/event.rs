//! # Runtime events emitted by the pool, the reconciler and the workers.
//!
//! The [`EventKind`] enum classifies event types into four groups:
//! - **Target events**: desired pool size changes and source failures
//! - **Task events**: worker lifecycle (spawn, removal request, exit, reap, work failures)
//! - **Pool events**: runtime start/stop and graceful shutdown
//! - **Subscriber events**: overflow and panics inside subscriber workers
//!
//! The [`Event`] struct carries the metadata: timestamp, task id, target values,
//! reason and iteration counters.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use poolvisor::{Event, EventKind};
//! use uuid::Uuid;
//!
//! let id = Uuid::new_v4();
//! let ev = Event::new(EventKind::WorkFailed)
//!     .with_task(id)
//!     .with_reason("boom")
//!     .with_iteration(3);
//!
//! assert_eq!(ev.kind, EventKind::WorkFailed);
//! assert_eq!(ev.task, Some(id));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use uuid::Uuid;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Target events ===
    /// The reconciler accepted a new target count.
    ///
    /// Sets:
    /// - `target`: new value
    /// - `previous`: old value
    TargetChanged,

    /// Reading or validating the target failed; the previous target is kept.
    ///
    /// Sets:
    /// - `target`: the target that stays in effect
    /// - `reason`: error label and message
    TargetReadFailed,

    // === Task events ===
    /// A new worker was spawned.
    ///
    /// Sets:
    /// - `task`: worker id
    TaskSpawned,

    /// The reconciler asked a worker to stop and force-expired its window.
    ///
    /// Sets:
    /// - `task`: worker id
    TaskRemoveRequested,

    /// A worker left its run loop and recorded its completion.
    ///
    /// Sets:
    /// - `task`: worker id
    /// - `iteration`: number of executed work units
    TaskExited,

    /// The reconciler drained a completion and dropped the worker from the pool.
    ///
    /// Sets:
    /// - `task`: worker id
    TaskReaped,

    /// One unit of work failed (error or panic); the worker keeps running.
    ///
    /// Sets:
    /// - `task`: worker id
    /// - `iteration`: 1-based work unit number
    /// - `reason`: failure message
    WorkFailed,

    /// An externally driven stop flag flipped a task's signal.
    ///
    /// Sets:
    /// - `task`: id of the task whose signal was updated
    /// - `reason`: `"suspended"` or `"resumed"`
    SignalChanged,

    // === Pool events ===
    /// The pool runtime started its reconcile loop.
    ///
    /// Sets:
    /// - `target`: initial target
    PoolStarted,

    /// The pool runtime finished.
    PoolStopped,

    /// Shutdown requested (OS signal or shutdown token).
    ///
    /// Sets:
    /// - `reason`: signal name (`"SIGTERM"`, ...) or `"token"`
    ShutdownRequested,

    /// All workers exited within the configured grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some workers did not exit in time.
    ///
    /// Sets:
    /// - `timeout_ms`: configured grace (ms)
    GraceExceeded,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: panic message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: `"full"` or `"closed"`
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Worker id, if applicable.
    pub task: Option<Uuid>,
    /// Target count in effect (or newly accepted).
    pub target: Option<usize>,
    /// Previous target count (only for `TargetChanged`).
    pub previous: Option<usize>,
    /// Work unit counter.
    pub iteration: Option<u64>,
    /// Duration in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Subscriber name (only for subscriber events).
    pub subscriber: Option<&'static str>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            target: None,
            previous: None,
            iteration: None,
            timeout_ms: None,
            reason: None,
            subscriber: None,
        }
    }

    /// Attaches a worker id.
    #[inline]
    pub fn with_task(mut self, id: Uuid) -> Self {
        self.task = Some(id);
        self
    }

    /// Attaches the target count.
    #[inline]
    pub fn with_target(mut self, target: usize) -> Self {
        self.target = Some(target);
        self
    }

    /// Attaches the previous target count.
    #[inline]
    pub fn with_previous(mut self, previous: usize) -> Self {
        self.previous = Some(previous);
        self
    }

    /// Attaches a work unit counter.
    #[inline]
    pub fn with_iteration(mut self, n: u64) -> Self {
        self.iteration = Some(n);
        self
    }

    /// Attaches a duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow).with_reason(reason);
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.subscriber = Some(subscriber);
        ev
    }
}
