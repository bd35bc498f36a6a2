//! # ManagedTask: time-windowed, cooperatively stoppable worker.
//!
//! A managed task repeats one unit of [`Work`](crate::Work) every `interval` while
//! "now" is inside its [`TimeWindow`] and its [`StopSignal`] is clear.
//!
//! ## States
//! ```text
//!            now >= start                     now > stop
//! Pending ───────────────► Active ◄──────► Suspended ───────────► Expired (terminal)
//!                            │   set()/clear()          ▲
//!                            └──────────────────────────┘
//!                                    now > stop
//! ```
//! - `Pending`: `now < start`
//! - `Active`: inside the window, signal clear → work runs
//! - `Suspended`: inside the window, signal set → the loop idles
//! - `Expired`: `now > stop`; the signal no longer matters
//!
//! ## Run loop
//! ```text
//! loop {
//!   ├─► Expired   → break
//!   ├─► Pending   → sleep until start (at most one interval), continue
//!   ├─► Active    → execute one unit (errors/panics → WorkFailed, loop continues)
//!   ├─► Suspended → skip
//!   └─► sleep(interval)
//! }
//! on exit: mark_complete(id) exactly once → publish TaskExited
//! ```
//!
//! ## Stopping
//! Stopping is advisory. [`TaskControl::request_stop`] sets the signal, which only
//! suspends the task. To make it exit, the controller also calls
//! [`TaskControl::force_expire`], which closes the window at "now". The loop sees
//! the closed window after its current sleep, so a stopped task exits within one
//! `interval` (plus the time its current unit of work takes).
//!
//! Long-running work delays this: a unit of work is never interrupted.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use futures::FutureExt;
use tokio::time::{self, Instant};
use uuid::Uuid;

use crate::core::{Completion, CompletionRegistry};
use crate::error::{WorkError, panic_info};
use crate::events::{Bus, Event, EventKind};
use crate::tasks::{
    signal::StopSignal,
    window::{TimeWindow, WindowPhase},
    work::WorkRef,
};

/// Smallest interval a loop will sleep for; a zero interval would spin.
pub(crate) const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Lifecycle state of a managed task at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Window not open yet.
    Pending,
    /// Inside the window with the signal clear.
    Active,
    /// Inside the window with the signal set.
    Suspended,
    /// Window is over.
    Expired,
}

/// Scheduling parameters of a managed task.
#[derive(Debug, Clone, Copy)]
pub struct TaskParams {
    /// Run window.
    pub window: TimeWindow,
    /// Pause between two units of work (clamped to at least 1ms).
    pub interval: Duration,
}

/// Control surface of a managed task, shared between its run loop and its controller.
///
/// Cloned as `Arc<TaskControl>` into the pool's bookkeeping; the run loop keeps another.
#[derive(Debug)]
pub struct TaskControl {
    id: Uuid,
    window: RwLock<TimeWindow>,
    signal: StopSignal,
    interval: Duration,
}

impl TaskControl {
    /// Creates a control block with a fresh random id.
    pub fn new(params: TaskParams) -> Self {
        Self {
            id: Uuid::new_v4(),
            window: RwLock::new(params.window),
            signal: StopSignal::new(),
            interval: params.interval.max(MIN_INTERVAL),
        }
    }

    /// Returns the task id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the pause between two units of work.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the current run window.
    pub fn window(&self) -> TimeWindow {
        *self.window.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the stop signal (clones share state).
    pub fn signal(&self) -> &StopSignal {
        &self.signal
    }

    /// Returns the lifecycle state at `now`.
    pub fn state_at(&self, now: Instant) -> TaskState {
        match self.window().phase(now) {
            WindowPhase::Before => TaskState::Pending,
            WindowPhase::After => TaskState::Expired,
            WindowPhase::Inside if self.signal.is_set() => TaskState::Suspended,
            WindowPhase::Inside => TaskState::Active,
        }
    }

    /// Returns the lifecycle state right now.
    pub fn state(&self) -> TaskState {
        self.state_at(Instant::now())
    }

    /// `window.contains(now) && !signal.is_set()`.
    pub fn running_expected_at(&self, now: Instant) -> bool {
        self.window().contains(now) && !self.signal.is_set()
    }

    /// Same as [`running_expected_at`](Self::running_expected_at) for the current instant.
    pub fn running_expected(&self) -> bool {
        self.running_expected_at(Instant::now())
    }

    /// Sets the stop signal. Idempotent; no effect once the run loop has exited.
    pub fn request_stop(&self) {
        self.signal.set();
    }

    /// Clears the stop signal so an in-window task resumes work.
    pub fn resume(&self) {
        self.signal.clear();
    }

    /// Closes the run window at "now" so the run loop exits at its next check.
    pub fn force_expire(&self) {
        self.force_expire_at(Instant::now());
    }

    /// Closes the run window at `now`. Never reopens an expired window.
    pub fn force_expire_at(&self, now: Instant) {
        let mut window = self.window.write().unwrap_or_else(PoisonError::into_inner);
        *window = window.expired_at(now);
    }
}

/// Time-windowed worker: repeats a unit of work until its window closes.
pub struct ManagedTask {
    control: Arc<TaskControl>,
    work: WorkRef,
    bus: Bus,
    registry: Option<Arc<CompletionRegistry>>,
}

impl ManagedTask {
    /// Creates a task; call [`run`](Self::run) (usually inside `tokio::spawn`) to start it.
    pub fn new(bus: Bus, work: WorkRef, params: TaskParams) -> Self {
        Self {
            control: Arc::new(TaskControl::new(params)),
            work,
            bus,
            registry: None,
        }
    }

    /// Reports the completion into `registry` when the run loop exits.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<CompletionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Returns the task id.
    pub fn id(&self) -> Uuid {
        self.control.id()
    }

    /// Returns a shared handle to the control surface.
    pub fn control(&self) -> Arc<TaskControl> {
        Arc::clone(&self.control)
    }

    /// Runs the loop until the window expires, then reports completion once.
    ///
    /// A task run before its window opens does not return early: it sleeps until the
    /// start (waking at least once per interval to notice `force_expire`) and then works
    /// through the whole window.
    ///
    /// Consumes the task: a task can only run (and complete) once.
    pub async fn run(self) -> Completion {
        let interval = self.control.interval();
        let mut executed: u64 = 0;
        let mut failed: u64 = 0;

        loop {
            let now = Instant::now();
            match self.control.state_at(now) {
                TaskState::Expired => break,
                TaskState::Pending => {
                    let start = self.control.window().start();
                    time::sleep_until(start.min(now + interval)).await;
                    continue;
                }
                TaskState::Active => {
                    executed += 1;
                    if let Err(e) = self.execute_once().await {
                        failed += 1;
                        self.bus.publish(
                            Event::new(EventKind::WorkFailed)
                                .with_task(self.id())
                                .with_iteration(executed)
                                .with_reason(e.as_message()),
                        );
                    }
                }
                TaskState::Suspended => {}
            }
            time::sleep(interval).await;
        }

        self.complete(executed, failed)
    }

    /// Executes one unit of work, converting a panic into [`WorkError::Panicked`].
    async fn execute_once(&self) -> Result<(), WorkError> {
        let fut = self.work.execute(self.id());
        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(res) => res,
            Err(panic_err) => Err(WorkError::Panicked {
                info: panic_info(&*panic_err),
            }),
        }
    }

    fn complete(self, executed: u64, failed: u64) -> Completion {
        let id = self.id();
        let completion = Completion {
            id,
            finished_at: Instant::now(),
            executed,
            failed,
            stop_requested: self.control.signal().is_set(),
        };
        if let Some(registry) = &self.registry {
            registry.mark_complete(id, completion.clone());
        }
        self.bus.publish(
            Event::new(EventKind::TaskExited)
                .with_task(id)
                .with_iteration(executed),
        );
        completion
    }
}
