//! # Workers and their building blocks.
//!
//! - [`TimeWindow`] / [`WindowPhase`] the `[start, stop]` interval a worker may run in
//! - [`StopSignal`] shared atomic stop flag
//! - [`Work`] / [`WorkFn`] / [`WorkRef`] the unit of work a worker repeats
//! - [`ManagedTask`] / [`TaskControl`] / [`TaskState`] the worker run loop and its controls
//! - [`SignalSync`] work that mirrors an external stop flag onto a signal

mod managed;
mod signal;
mod signal_sync;
mod window;
mod work;
mod work_fn;

pub(crate) use managed::MIN_INTERVAL;
pub use managed::{ManagedTask, TaskControl, TaskParams, TaskState};
pub use signal::StopSignal;
pub use signal_sync::SignalSync;
pub use window::{TimeWindow, WindowPhase};
pub use work::{Work, WorkRef};
pub use work_fn::WorkFn;
