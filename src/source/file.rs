//! # File-backed target source.
//!
//! [`FileSource`] reads the first line of a text file on every pass. The file is
//! expected to hold a single integer; operators change the pool size by rewriting it:
//!
//! ```text
//! $ echo 5 > /tmp/target_count
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::SourceError;
use crate::source::{TargetSource, parse_target};

/// Path polled when no other path is given.
pub const DEFAULT_TARGET_PATH: &str = "/tmp/target_count";

/// Reads the target from the first line of a file.
///
/// - missing/unreadable file → `SourceUnavailable`
/// - empty first line → no update
/// - non-integer → `Malformed`
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the polled path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileSource {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_PATH)
    }
}

#[async_trait]
impl TargetSource for FileSource {
    async fn read(&self) -> Result<Option<i64>, SourceError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SourceError::SourceUnavailable {
                error: format!("{}: {e}", self.path.display()),
            }
        })?;
        parse_target(&contents)
    }
}
