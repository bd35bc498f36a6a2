//! Error types used by the poolvisor runtime, target sources and work units.
//!
//! This module defines three enums:
//!
//! - [`SourceError`]: failures while reading or validating an external source (target count, stop flag).
//! - [`WorkError`]: failures of a single unit of work inside a worker's run loop.
//! - [`RuntimeError`]: failures of the pool runtime itself (shutdown only).
//!
//! None of them is fatal to a loop: reconcile and worker loops convert them into
//! [`Event`](crate::Event)s and carry on with their next scheduled iteration.
//! All types provide `as_label` / `as_message` helpers for logs and metrics.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

/// # Errors produced by external sources.
///
/// Both kinds are recoverable: the reconciler keeps its previous target and
/// proceeds with the rest of the pass.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The source produced a negative target.
    #[error("target count can not be less than zero; supplied: {value}")]
    InvalidValue {
        /// The rejected value.
        value: i64,
    },

    /// The source produced a target above the configured ceiling.
    #[error("target count {value} exceeds the maximum of {max}")]
    TooLarge {
        /// The rejected value.
        value: i64,
        /// The ceiling in effect (`PoolConfig::max_target`).
        max: usize,
    },

    /// The source produced something that is not an integer.
    #[error("value is not an integer: {input:?}")]
    Malformed {
        /// The raw input (trimmed).
        input: String,
    },

    /// The source could not be read at all (missing file, closed channel, ...).
    #[error("source unavailable: {error}")]
    SourceUnavailable {
        /// The underlying error message.
        error: String,
    },
}

impl SourceError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// Negative, oversized and malformed values share the `source_invalid_value` label.
    ///
    /// # Example
    /// ```
    /// use poolvisor::SourceError;
    ///
    /// let err = SourceError::InvalidValue { value: -1 };
    /// assert_eq!(err.as_label(), "source_invalid_value");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SourceError::InvalidValue { .. }
            | SourceError::TooLarge { .. }
            | SourceError::Malformed { .. } => "source_invalid_value",
            SourceError::SourceUnavailable { .. } => "source_unavailable",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SourceError::InvalidValue { value } => format!("negative value: {value}"),
            SourceError::TooLarge { value, max } => format!("value {value} above maximum {max}"),
            SourceError::Malformed { input } => format!("malformed value: {input:?}"),
            SourceError::SourceUnavailable { error } => format!("unavailable: {error}"),
        }
    }

    /// Indicates whether the error describes a bad value (as opposed to a bad transport).
    pub fn is_invalid_value(&self) -> bool {
        matches!(
            self,
            SourceError::InvalidValue { .. }
                | SourceError::TooLarge { .. }
                | SourceError::Malformed { .. }
        )
    }
}

/// # Errors produced by a single unit of work.
///
/// A work error never terminates the run loop; it is published as
/// [`EventKind::WorkFailed`](crate::EventKind::WorkFailed) and the worker
/// sleeps until its next interval.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkError {
    /// The work unit reported a failure.
    #[error("work failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The work unit panicked; the panic was caught by the run loop.
    #[error("work panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl WorkError {
    /// Convenience constructor for [`WorkError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        WorkError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use poolvisor::WorkError;
    ///
    /// assert_eq!(WorkError::fail("boom").as_label(), "work_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkError::Fail { .. } => "work_failed",
            WorkError::Panicked { .. } => "work_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WorkError::Fail { error } => format!("error: {error}"),
            WorkError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

/// # Errors produced by the pool runtime.
///
/// Only raised by [`Pool::run`](crate::Pool::run) when shutdown does not finish in time.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some workers were still running.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Ids of workers that did not exit in time.
        stuck: Vec<Uuid>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use poolvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck workers={stuck:?}")
            }
        }
    }
}

/// Renders a caught panic payload the same way for workers and subscribers.
pub(crate) fn panic_info(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_labels() {
        assert_eq!(
            SourceError::Malformed { input: "x".into() }.as_label(),
            "source_invalid_value"
        );
        assert_eq!(
            SourceError::SourceUnavailable { error: "gone".into() }.as_label(),
            "source_unavailable"
        );
        assert!(SourceError::InvalidValue { value: -3 }.is_invalid_value());
        assert!(SourceError::TooLarge { value: 9, max: 4 }.is_invalid_value());
        assert!(!SourceError::SourceUnavailable { error: "gone".into() }.is_invalid_value());
    }

    #[test]
    fn test_panic_info_downcasts() {
        let s: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_info(&*s), "static");
        let s: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_info(&*s), "owned");
        let s: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_info(&*s), "unknown panic");
    }
}
