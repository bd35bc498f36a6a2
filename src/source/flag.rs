//! # Boolean stop-flag sources.
//!
//! A [`FlagSource`] answers "should this task be stopped right now?". It feeds
//! [`SignalSync`](crate::SignalSync), which mirrors the answer onto a task's
//! [`StopSignal`](crate::StopSignal) to suspend or resume it from outside.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::SourceError;

/// Path polled when no other path is given.
pub const DEFAULT_FLAG_PATH: &str = "/tmp/stop_flag";

/// Source of an external stop flag.
#[async_trait]
pub trait FlagSource: Send + Sync + 'static {
    /// Returns `true` when a stop is requested.
    async fn read(&self) -> Result<bool, SourceError>;
}

/// Reads a stop flag from the first line of a file.
///
/// The flag is set iff the first line is `true` (case-insensitive, surrounding
/// whitespace ignored); any other content clears it. A missing file is
/// `SourceUnavailable` and leaves the signal untouched.
#[derive(Debug, Clone)]
pub struct FileFlagSource {
    path: PathBuf,
}

impl FileFlagSource {
    /// Creates a source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the polled path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileFlagSource {
    fn default() -> Self {
        Self::new(DEFAULT_FLAG_PATH)
    }
}

#[async_trait]
impl FlagSource for FileFlagSource {
    async fn read(&self) -> Result<bool, SourceError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SourceError::SourceUnavailable {
                error: format!("{}: {e}", self.path.display()),
            }
        })?;
        let line = contents.lines().next().unwrap_or("").trim();
        Ok(line.eq_ignore_ascii_case("true"))
    }
}
