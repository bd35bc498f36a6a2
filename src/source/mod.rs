//! # External sources feeding the pool.
//!
//! The reconciler never knows where its target comes from: it calls
//! [`TargetSource::read`] once per pass. Any transport (file, channel, RPC, ...)
//! satisfies the trait.
//!
//! ## Contents
//! - [`TargetSource`] trait and [`TargetCount`] value type
//! - [`FileSource`] first line of a text file (e.g. `/tmp/target_count`)
//! - [`WatchSource`] / [`TargetSender`] programmatic source over `tokio::sync::watch`
//! - [`StaticSource`] fixed answer (default when no source is configured)
//! - [`FlagSource`] / [`FileFlagSource`] boolean stop flags for [`SignalSync`](crate::SignalSync)
//!
//! ## Read contract
//! ```text
//! Ok(Some(n))  → candidate target (negative → InvalidValue, target kept)
//! Ok(None)     → no update available this pass
//! Err(e)       → SourceUnavailable / InvalidValue, logged as TargetReadFailed, target kept
//! ```

mod file;
mod flag;
mod target;
mod watch;

use async_trait::async_trait;

use crate::error::SourceError;

pub use file::FileSource;
pub use flag::{FileFlagSource, FlagSource};
pub use target::TargetCount;
pub use watch::{TargetSender, WatchSource};

/// Source of the desired worker count.
#[async_trait]
pub trait TargetSource: Send + Sync + 'static {
    /// Reads the current target, if any.
    async fn read(&self) -> Result<Option<i64>, SourceError>;
}

/// Source that always answers the same way.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSource {
    value: Option<i64>,
}

impl StaticSource {
    /// Always reports `value`.
    pub fn new(value: i64) -> Self {
        Self { value: Some(value) }
    }

    /// Never reports an update; the pool keeps its configured initial target.
    pub fn none() -> Self {
        Self { value: None }
    }
}

#[async_trait]
impl TargetSource for StaticSource {
    async fn read(&self) -> Result<Option<i64>, SourceError> {
        Ok(self.value)
    }
}

/// Parses the first line of `contents` as a target.
///
/// Empty input means "no update"; anything else must be an integer.
pub(crate) fn parse_target(contents: &str) -> Result<Option<i64>, SourceError> {
    let line = contents.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(None);
    }
    line.parse::<i64>()
        .map(Some)
        .map_err(|_| SourceError::Malformed {
            input: line.to_string(),
        })
}
