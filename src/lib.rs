//! # poolvisor
//!
//! **Poolvisor** keeps an elastic pool of async workers at a size read from an
//! external source.
//!
//! Every worker repeats one unit of work inside a time window and can be stopped
//! cooperatively. A reconciler compares the desired worker count with the live one on
//! a fixed tick and spawns or stops workers until they match.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌──────────────────┐
//!   │   TargetSource   │  file / watch channel / custom
//!   └────────┬─────────┘
//!            ▼ read() every tick
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  PoolReconciler                                                   │
//! │  - TargetCount (desired size)                                     │
//! │  - live: IndexMap<Uuid, handle> (insertion order = eviction order)│
//! │  - CompletionRegistry (shared with workers)                       │
//! └──────┬──────────────────┬──────────────────┬───────────────▲──────┘
//!        ▼ spawn            ▼ spawn            ▼ request_stop  │ drain_all()
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │ ManagedTask  │   │ ManagedTask  │   │ ManagedTask  │   │
//!     │ (window loop)│   │ (window loop)│   │ force_expire │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │                  │                  └─ mark_complete ─┘
//!      │ WorkFailed       │ TaskExited
//!      ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                 (capacity: PoolConfig::bus_capacity)              │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       │       (in Pool)        │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                              SubscriberSet
//!                         ┌─────────┼─────────┐
//!                         ▼         ▼         ▼
//!                     LogWriter  sub2.on   subN.on
//!                                _event()  _event()
//! ```
//!
//! ### Worker lifecycle
//! ```text
//! loop {
//!   ├─► now > stop          ─► exit, mark_complete, TaskExited
//!   ├─► now < start         ─► sleep until start (≤ interval)
//!   ├─► signal set          ─► idle
//!   ├─► otherwise           ─► work.execute(id)  (Err/panic ─► WorkFailed)
//!   └─► sleep(interval)
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                                  |
//! |-------------------|---------------------------------------------------------------|-----------------------------------------------------|
//! | **Pool**          | Run the reconciler with signals and graceful shutdown.        | [`Pool`], [`PoolBuilder`], [`PoolConfig`]           |
//! | **Reconciler**    | Drive convergence pass by pass (tests, custom loops).         | [`PoolReconciler`], [`ReconcileReport`]             |
//! | **Workers**       | Time-windowed, cooperatively stoppable loops.                 | [`ManagedTask`], [`TaskControl`], [`TimeWindow`]    |
//! | **Work**          | The repeated unit, as a trait or a closure.                   | [`Work`], [`WorkFn`], [`WorkRef`]                   |
//! | **Sources**       | Where the target and stop flags come from.                    | [`TargetSource`], [`FileSource`], [`WatchSource`]   |
//! | **Subscriber API**| Hook into runtime events.                                     | [`Subscribe`], [`Event`], [`EventKind`]             |
//! | **Errors**        | Typed errors, turned into events by the loops.                | [`SourceError`], [`WorkError`], [`RuntimeError`]    |
//!
//! ## Optional features
//! - `logging` (default): exports the built-in [`LogWriter`] subscriber.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use poolvisor::{Pool, PoolConfig, WatchSource, WorkError, WorkFn, WorkRef};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = PoolConfig {
//!         tick: Duration::from_millis(10),
//!         lifetime: Duration::from_millis(100),
//!         worker_interval: Duration::from_millis(5),
//!         ..PoolConfig::default()
//!     };
//!
//!     let work: WorkRef = WorkFn::arc("hello", |task: uuid::Uuid| async move {
//!         println!("hello from {task}");
//!         Ok::<_, WorkError>(())
//!     });
//!
//!     let (target, source) = WatchSource::channel(Some(2));
//!     let pool = Pool::builder(cfg, work).with_source(source).build();
//!
//!     target.set(3);
//!     pool.run().await?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod source;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::{
    Completion, CompletionRegistry, Pool, PoolBuilder, PoolConfig, PoolReconciler,
    ReconcileReport, ReconcilerExit, ReconcilerPhase,
};
pub use error::{RuntimeError, SourceError, WorkError};
pub use events::{Bus, Event, EventKind};
pub use source::{
    FileFlagSource, FileSource, FlagSource, StaticSource, TargetCount, TargetSender,
    TargetSource, WatchSource,
};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{
    ManagedTask, SignalSync, StopSignal, TaskControl, TaskParams, TaskState, TimeWindow,
    WindowPhase, Work, WorkFn, WorkRef,
};

// Optional: expose the built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
