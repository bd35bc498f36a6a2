//! # PoolReconciler: keeps the number of live workers at the target.
//!
//! Each pass reads the target, reaps finished workers and spawns or stops workers
//! until `active == target`.
//!
//! ## Architecture
//! ```text
//! TargetSource ──read()──► TargetCount
//!                               │
//! reconcile():                  ▼
//!   1. refresh  ─► TargetChanged / TargetReadFailed (target kept on failure)
//!   2. drain    ─► CompletionRegistry::drain_all() → live.shift_remove(id) → TaskReaped
//!   3. delta = target - (live - pending_removals)
//!        ├─ delta > 0 → spawn ManagedTask × delta      → TaskSpawned
//!        ├─ delta < 0 → oldest non-pending × |delta|:
//!        │                request_stop + force_expire  → TaskRemoveRequested
//!        └─ delta = 0 → nothing
//! ```
//!
//! ## Rules
//! - `live` keeps insertion order; eviction always picks the oldest workers first.
//! - A stopped worker stays in `live` (marked pending removal) until its completion is
//!   drained, so `live_len()` may exceed the target while removals are in flight.
//! - A worker is marked pending removal at most once.
//! - Only the reconciler touches `live` and the target (`&mut self`); workers talk back
//!   through the [`CompletionRegistry`] alone.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::{Completion, CompletionRegistry, PoolConfig};
use crate::events::{Bus, Event, EventKind};
use crate::source::{TargetCount, TargetSource};
use crate::tasks::{ManagedTask, TaskControl, TaskParams, TaskState, WorkRef};

/// Handle to a spawned worker.
struct TaskHandle {
    control: Arc<TaskControl>,
    join: JoinHandle<Completion>,
    removal_requested: bool,
}

/// What the reconciler is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerPhase {
    /// Between passes.
    Idle,
    /// Inside [`PoolReconciler::reconcile`].
    Reconciling,
}

/// Why [`PoolReconciler::run_until`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerExit {
    /// The reconciler's own window closed.
    LifetimeExpired,
    /// The cancellation token fired.
    Cancelled,
}

/// Outcome of one reconcile pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Target after the refresh step.
    pub target: usize,
    /// Workers whose completion was drained (removed from `live`).
    pub drained: Vec<Uuid>,
    /// Workers spawned in this pass.
    pub spawned: Vec<Uuid>,
    /// Workers asked to stop in this pass.
    pub stop_requested: Vec<Uuid>,
}

/// Converges the live worker set to the target count.
pub struct PoolReconciler {
    cfg: PoolConfig,
    target: TargetCount,
    source: Box<dyn TargetSource>,
    work: WorkRef,
    live: IndexMap<Uuid, TaskHandle>,
    completions: Arc<CompletionRegistry>,
    bus: Bus,
    phase: ReconcilerPhase,
    lifecycle: Arc<TaskControl>,
}

impl PoolReconciler {
    /// Creates a reconciler whose own window starts now and lasts `cfg.lifetime`.
    ///
    /// The target starts at `cfg.initial_target` and never exceeds `cfg.max_target`;
    /// no worker is spawned before the first pass.
    pub fn new(cfg: PoolConfig, source: Box<dyn TargetSource>, work: WorkRef, bus: Bus) -> Self {
        let lifecycle = Arc::new(TaskControl::new(TaskParams {
            window: cfg.lifetime_window(Instant::now()),
            interval: cfg.tick_clamped(),
        }));
        Self {
            target: TargetCount::with_max(cfg.initial_target, cfg.max_target),
            cfg,
            source,
            work,
            live: IndexMap::new(),
            completions: Arc::new(CompletionRegistry::new()),
            bus,
            phase: ReconcilerPhase::Idle,
            lifecycle,
        }
    }

    /// Returns the current target.
    pub fn target(&self) -> usize {
        self.target.get()
    }

    /// Returns live worker ids, oldest first.
    pub fn live_ids(&self) -> Vec<Uuid> {
        self.live.keys().copied().collect()
    }

    /// Returns the number of live workers (including those pending removal).
    pub fn live_len(&self) -> usize {
        self.live.len()
    }

    /// Returns the number of workers asked to stop whose completion is not drained yet.
    pub fn pending_removals(&self) -> usize {
        self.live.values().filter(|h| h.removal_requested).count()
    }

    /// Returns `live_len() - pending_removals()`.
    pub fn active_len(&self) -> usize {
        self.live_len() - self.pending_removals()
    }

    /// Returns true if worker `id` is live and was asked to stop.
    pub fn is_pending_removal(&self, id: &Uuid) -> bool {
        self.live.get(id).is_some_and(|h| h.removal_requested)
    }

    /// Returns the current phase.
    pub fn phase(&self) -> ReconcilerPhase {
        self.phase
    }

    /// Returns the registry shared with the workers.
    pub fn completions(&self) -> &Arc<CompletionRegistry> {
        &self.completions
    }

    /// Returns the control surface of a live worker.
    pub fn control(&self, id: &Uuid) -> Option<Arc<TaskControl>> {
        self.live.get(id).map(|h| Arc::clone(&h.control))
    }

    /// Returns the control surface of the reconciler's own window.
    ///
    /// Setting its signal suspends reconciling; force-expiring it ends [`run_until`](Self::run_until).
    pub fn lifecycle(&self) -> Arc<TaskControl> {
        Arc::clone(&self.lifecycle)
    }

    /// Runs one pass: refresh, drain, converge.
    pub async fn reconcile(&mut self) -> ReconcileReport {
        self.phase = ReconcilerPhase::Reconciling;

        self.refresh_target().await;
        let drained = self.drain();

        let target = self.target.get();
        let active = self.active_len();
        let mut report = ReconcileReport {
            target,
            drained,
            ..ReconcileReport::default()
        };
        match target.cmp(&active) {
            Ordering::Greater => report.spawned = self.spawn(target - active),
            Ordering::Less => report.stop_requested = self.remove_oldest(active - target),
            Ordering::Equal => {}
        }

        self.phase = ReconcilerPhase::Idle;
        report
    }

    /// Reconciles every `tick` while the reconciler's window is open.
    ///
    /// Returns when the window closes or `token` is cancelled. Workers are left running;
    /// see [`shutdown`](Self::shutdown).
    pub async fn run_until(&mut self, token: &CancellationToken) -> ReconcilerExit {
        let tick = self.lifecycle.interval();
        loop {
            if token.is_cancelled() {
                return ReconcilerExit::Cancelled;
            }
            let now = Instant::now();
            match self.lifecycle.state_at(now) {
                TaskState::Expired => return ReconcilerExit::LifetimeExpired,
                TaskState::Pending => {
                    let wake = self.lifecycle.window().start().min(now + tick);
                    tokio::select! {
                        _ = token.cancelled() => return ReconcilerExit::Cancelled,
                        _ = time::sleep_until(wake) => {}
                    }
                    continue;
                }
                TaskState::Active => {
                    self.reconcile().await;
                }
                TaskState::Suspended => {}
            }
            tokio::select! {
                _ = token.cancelled() => return ReconcilerExit::Cancelled,
                _ = time::sleep(tick) => {}
            }
        }
    }

    /// Stops every live worker and waits up to `grace` for all of them to exit.
    ///
    /// Finished workers are reaped either way. Returns the ids still running when
    /// `grace` ran out.
    pub async fn shutdown(&mut self, grace: Duration) -> Result<(), Vec<Uuid>> {
        let ids: Vec<Uuid> = self.live.keys().copied().collect();
        for id in ids {
            self.request_removal(id);
        }

        let joins = self.live.values_mut().map(|h| &mut h.join);
        let waited = time::timeout(grace, futures::future::join_all(joins)).await;
        let result = match waited {
            Ok(_) => Ok(()),
            Err(_) => Err(self
                .live
                .iter()
                .filter(|(_, h)| !h.join.is_finished())
                .map(|(id, _)| *id)
                .collect()),
        };

        self.drain();
        result
    }

    async fn refresh_target(&mut self) {
        let raw = match self.source.read().await {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                self.publish_read_failed(e.as_message());
                return;
            }
        };
        match self.target.update(raw) {
            Ok(Some(previous)) => self.bus.publish(
                Event::new(EventKind::TargetChanged)
                    .with_target(self.target.get())
                    .with_previous(previous),
            ),
            Ok(None) => {}
            Err(e) => self.publish_read_failed(e.as_message()),
        }
    }

    fn publish_read_failed(&self, reason: String) {
        self.bus.publish(
            Event::new(EventKind::TargetReadFailed)
                .with_target(self.target.get())
                .with_reason(reason),
        );
    }

    /// Drops every drained worker from `live` (and with it its pending-removal mark).
    fn drain(&mut self) -> Vec<Uuid> {
        let mut drained = Vec::new();
        for (id, completion) in self.completions.drain_all() {
            if self.live.shift_remove(&id).is_none() {
                continue;
            }
            self.bus.publish(
                Event::new(EventKind::TaskReaped)
                    .with_task(id)
                    .with_iteration(completion.executed),
            );
            drained.push(id);
        }
        drained
    }

    fn spawn(&mut self, n: usize) -> Vec<Uuid> {
        let mut spawned = Vec::new();
        for _ in 0..n {
            let task = ManagedTask::new(
                self.bus.clone(),
                Arc::clone(&self.work),
                self.cfg.worker_params(Instant::now()),
            )
            .with_registry(Arc::clone(&self.completions));
            let id = task.id();
            let control = task.control();
            let join = tokio::spawn(task.run());

            self.live.insert(
                id,
                TaskHandle {
                    control,
                    join,
                    removal_requested: false,
                },
            );
            self.bus.publish(Event::new(EventKind::TaskSpawned).with_task(id));
            spawned.push(id);
        }
        spawned
    }

    fn remove_oldest(&mut self, n: usize) -> Vec<Uuid> {
        let victims: Vec<Uuid> = self
            .live
            .iter()
            .filter(|(_, h)| !h.removal_requested)
            .take(n)
            .map(|(id, _)| *id)
            .collect();
        for id in &victims {
            self.request_removal(*id);
        }
        victims
    }

    /// Stops worker `id` and marks it pending removal. No-op if already marked.
    fn request_removal(&mut self, id: Uuid) {
        let Some(handle) = self.live.get_mut(&id) else {
            return;
        };
        if handle.removal_requested {
            return;
        }
        handle.control.request_stop();
        handle.control.force_expire();
        handle.removal_requested = true;
        self.bus
            .publish(Event::new(EventKind::TaskRemoveRequested).with_task(id));
    }
}
