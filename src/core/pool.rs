//! # Pool: reconciler loop, event fan-out and graceful shutdown.
//!
//! [`Pool`] owns the event bus and wires the runtime around a [`PoolReconciler`].
//!
//! ## High-level architecture
//! ```text
//! run():
//!   subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!   publish PoolStarted
//!   signal_watch():        wait_for_shutdown_signal() ─► token.cancel()
//!   flag_sync():           SignalSync(stop flag) ─► reconciler lifecycle signal (optional)
//!
//!   PoolReconciler::run_until(token)         (every `tick` while its window is open)
//!       ├─ window closed   ─────────────────┐
//!       └─ token cancelled ─► ShutdownRequested{reason = signal name | "token"}
//!                                           ▼
//!   PoolReconciler::shutdown(cfg.grace):
//!       request_stop + force_expire every live worker, wait for all joins
//!       ├─ Ok  (all joined)  → AllStoppedWithin
//!       └─ grace exceeded    → GraceExceeded, Err(RuntimeError::GraceExceeded{stuck})
//!   publish PoolStopped → listener flushes subscribers and exits
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use poolvisor::{FileSource, Pool, PoolConfig, WorkError, WorkFn};
//! #[cfg(feature = "logging")]
//! use poolvisor::LogWriter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let work = WorkFn::arc("hello", |task: uuid::Uuid| async move {
//!         println!("hello from {task}");
//!         Ok::<_, WorkError>(())
//!     });
//!
//!     let mut builder = Pool::builder(PoolConfig::default(), work)
//!         .with_source(FileSource::new("/tmp/target_count"));
//!     #[cfg(feature = "logging")]
//!     { builder = builder.with_subscribers(vec![Arc::new(LogWriter::new())]); }
//!
//!     builder.build().run().await?;
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::io;
use std::sync::{Arc, OnceLock};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::{
    Completion, PoolBuilder, PoolConfig,
    reconciler::{PoolReconciler, ReconcilerExit},
    shutdown,
};
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::source::{FlagSource, TargetSource};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::{ManagedTask, SignalSync, TaskControl, TaskParams, WorkRef};

/// Elastic worker pool driven by a target source.
pub struct Pool {
    cfg: PoolConfig,
    bus: Bus,
    token: CancellationToken,
    source: Box<dyn TargetSource>,
    stop_flag: Option<Arc<dyn FlagSource>>,
    work: WorkRef,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl Pool {
    /// Starts building a pool that repeats `work` in every worker.
    pub fn builder(cfg: PoolConfig, work: WorkRef) -> PoolBuilder {
        PoolBuilder::new(cfg, work)
    }

    pub(crate) fn new_internal(
        cfg: PoolConfig,
        source: Box<dyn TargetSource>,
        stop_flag: Option<Arc<dyn FlagSource>>,
        work: WorkRef,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        Self {
            bus: Bus::new(cfg.bus_capacity_clamped()),
            token: CancellationToken::new(),
            cfg,
            source,
            stop_flag,
            work,
            subscribers,
        }
    }

    /// Returns a token that stops the pool when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Returns a raw receiver of every event published from now on.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Runs the pool until its lifetime ends, the shutdown token is cancelled or an
    /// OS termination signal arrives; then stops every worker within `cfg.grace`.
    pub async fn run(self) -> Result<(), RuntimeError> {
        let Pool {
            cfg,
            bus,
            token,
            source,
            stop_flag,
            work,
            subscribers,
        } = self;

        let listener = subscriber_listener(&bus, subscribers);
        bus.publish(Event::new(EventKind::PoolStarted).with_target(cfg.initial_target));
        let caught = Arc::new(OnceLock::new());
        let signals = signal_watch(
            shutdown::wait_for_shutdown_signal(),
            token.clone(),
            Arc::clone(&caught),
        );

        let mut reconciler = PoolReconciler::new(cfg.clone(), source, work, bus.clone());
        let sync = stop_flag.map(|flag| flag_sync(flag, &reconciler.lifecycle(), &bus));

        let exit = reconciler.run_until(&token).await;
        signals.abort();
        if exit == ReconcilerExit::Cancelled {
            let reason = caught.get().copied().unwrap_or("token");
            bus.publish(Event::new(EventKind::ShutdownRequested).with_reason(reason));
        }
        if let Some((control, join)) = sync {
            control.force_expire();
            report_sync_exit(&bus, control.id(), join.await);
        }

        let grace = cfg.grace;
        let result = match reconciler.shutdown(grace).await {
            Ok(()) => {
                bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(stuck) => {
                bus.publish(Event::new(EventKind::GraceExceeded).with_timeout(grace));
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        };

        bus.publish(Event::new(EventKind::PoolStopped));
        let _ = listener.await;
        result
    }
}

/// Forwards bus events to the subscribers until `PoolStopped`, then flushes them.
///
/// Subscribes before returning, so nothing published afterwards is missed.
fn subscriber_listener(bus: &Bus, subscribers: Vec<Arc<dyn Subscribe>>) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    let set = SubscriberSet::new(subscribers, bus.clone());
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => {
                    let last = ev.kind == EventKind::PoolStopped;
                    set.emit(&ev);
                    if last {
                        break;
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        set.shutdown().await;
    })
}

/// Cancels `token` once `signal` resolves, after storing the signal name in `caught`.
///
/// If no listener could be installed, `caught` stays empty and the pool only stops
/// through its token or its lifetime.
fn signal_watch<F>(
    signal: F,
    token: CancellationToken,
    caught: Arc<OnceLock<&'static str>>,
) -> JoinHandle<()>
where
    F: Future<Output = io::Result<&'static str>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Ok(name) = signal.await {
            let _ = caught.set(name);
            token.cancel();
        }
    })
}

/// Publishes `WorkFailed` for the stop-flag worker if its task did not finish cleanly.
fn report_sync_exit(bus: &Bus, id: Uuid, joined: Result<Completion, JoinError>) {
    if let Err(e) = joined {
        bus.publish(
            Event::new(EventKind::WorkFailed)
                .with_task(id)
                .with_reason(format!("stop-flag sync: {e}")),
        );
    }
}

/// Spawns a worker mirroring `flag` onto the reconciler's own stop signal.
///
/// It shares the reconciler's window and tick.
fn flag_sync(
    flag: Arc<dyn FlagSource>,
    lifecycle: &TaskControl,
    bus: &Bus,
) -> (Arc<TaskControl>, JoinHandle<Completion>) {
    let work = Arc::new(SignalSync::new(
        flag,
        lifecycle.signal().clone(),
        lifecycle.id(),
        bus.clone(),
    ));
    let task = ManagedTask::new(
        bus.clone(),
        work,
        TaskParams {
            window: lifecycle.window(),
            interval: lifecycle.interval(),
        },
    );
    let control = task.control();
    (control, tokio::spawn(task.run()))
}
