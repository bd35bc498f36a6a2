//! # Unit of work executed by a managed task.
//!
//! This module defines the [`Work`] trait (async, fallible) and the shared handle type
//! [`WorkRef`], an `Arc<dyn Work>` that the pool clones into every worker it spawns.
//!
//! One call to [`Work::execute`] is one unit of work. It should finish well within the
//! task's interval: the run loop only observes stop requests between units.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::WorkError;

/// Shared handle to a unit of work.
pub type WorkRef = Arc<dyn Work>;

/// # Repeatable, fallible unit of work.
///
/// Errors and panics are caught by the run loop and published as
/// [`EventKind::WorkFailed`](crate::EventKind::WorkFailed); they never stop the worker.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use poolvisor::{Work, WorkError};
/// use uuid::Uuid;
///
/// struct Ping;
///
/// #[async_trait]
/// impl Work for Ping {
///     fn name(&self) -> &str { "ping" }
///
///     async fn execute(&self, task: Uuid) -> Result<(), WorkError> {
///         let _ = task;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Work: Send + Sync + 'static {
    /// Returns a stable, human-readable name.
    fn name(&self) -> &str;

    /// Executes one unit of work on behalf of the task with id `task`.
    async fn execute(&self, task: Uuid) -> Result<(), WorkError>;
}
