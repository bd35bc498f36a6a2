//! # LogWriter: events to `tracing`
//!
//! A subscriber that turns every incoming [`Event`] into one structured `tracing` record.
//! Install any `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see the output.
//!
//! ## Example output (fmt layer)
//! ```text
//! INFO target changed desired=3 previous=0
//! INFO task spawned task=2f1c...
//! WARN work failed task=2f1c... iteration=4 reason="error: disk full"
//! INFO task remove requested task=2f1c...
//! INFO task reaped task=2f1c...
//! ```

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.map(|id| id.to_string());
        let task = task.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::TargetChanged => {
                info!(desired = ?e.target, previous = ?e.previous, "target changed");
            }
            EventKind::TargetReadFailed => {
                error!(desired = ?e.target, reason, "target read failed");
            }
            EventKind::TaskSpawned => {
                info!(task, "task spawned");
            }
            EventKind::TaskRemoveRequested => {
                info!(task, "task remove requested");
            }
            EventKind::TaskExited => {
                info!(task, iterations = ?e.iteration, "task exited");
            }
            EventKind::TaskReaped => {
                info!(task, "task reaped");
            }
            EventKind::WorkFailed => {
                warn!(task, iteration = ?e.iteration, reason, "work failed");
            }
            EventKind::SignalChanged => {
                info!(task, reason, "stop signal changed");
            }
            EventKind::PoolStarted => {
                info!(desired = ?e.target, "pool started");
            }
            EventKind::PoolStopped => {
                info!("pool stopped");
            }
            EventKind::ShutdownRequested => {
                info!(reason, "shutdown requested");
            }
            EventKind::AllStoppedWithin => {
                info!("all workers stopped within grace");
            }
            EventKind::GraceExceeded => {
                error!(grace_ms = ?e.timeout_ms, "grace exceeded");
            }
            EventKind::SubscriberOverflow => {
                warn!(subscriber = ?e.subscriber, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                error!(subscriber = ?e.subscriber, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
