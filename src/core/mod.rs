//! Runtime core: reconciliation and pool lifecycle.
//!
//! - [`completion`]: registry through which workers report that they exited;
//! - [`reconciler`]: converges the live worker set to the target;
//! - [`pool`]: drives the reconciler, fans out events, handles shutdown;
//! - [`builder`]: assembles a [`Pool`];
//! - [`config`]: [`PoolConfig`] and its defaults;
//! - [`shutdown`]: cross-platform termination signal handling.

mod builder;
mod completion;
mod config;
mod pool;
mod reconciler;
mod shutdown;

pub use builder::PoolBuilder;
pub use completion::{Completion, CompletionRegistry};
pub use config::PoolConfig;
pub use pool::Pool;
pub use reconciler::{PoolReconciler, ReconcileReport, ReconcilerExit, ReconcilerPhase};
