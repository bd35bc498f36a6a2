//! # Channel-backed target source.
//!
//! [`WatchSource::channel`] returns a [`TargetSender`] / [`WatchSource`] pair over
//! `tokio::sync::watch`. The sender publishes the latest answer (a value, "no update",
//! or a failure) and the source hands it to the reconciler on each pass.
//!
//! ## Example
//! ```rust
//! use poolvisor::{TargetSource, WatchSource};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (tx, source) = WatchSource::channel(Some(2));
//! assert_eq!(source.read().await, Ok(Some(2)));
//!
//! tx.set(5);
//! assert_eq!(source.read().await, Ok(Some(5)));
//! # }
//! ```

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::SourceError;
use crate::source::TargetSource;

type Reading = Result<Option<i64>, SourceError>;

/// Writing half: publishes the answer the next `read()` will see.
#[derive(Debug, Clone)]
pub struct TargetSender {
    tx: watch::Sender<Reading>,
}

impl TargetSender {
    /// Publishes a target value (negative values are rejected by the reconciler).
    pub fn set(&self, value: i64) {
        self.tx.send_replace(Ok(Some(value)));
    }

    /// Publishes "no update available".
    pub fn clear(&self) {
        self.tx.send_replace(Ok(None));
    }

    /// Makes subsequent reads fail with `err`.
    pub fn fail(&self, err: SourceError) {
        self.tx.send_replace(Err(err));
    }
}

/// Reading half, handed to the pool.
#[derive(Debug)]
pub struct WatchSource {
    rx: watch::Receiver<Reading>,
}

impl WatchSource {
    /// Creates a connected sender/source pair.
    pub fn channel(initial: Option<i64>) -> (TargetSender, WatchSource) {
        let (tx, rx) = watch::channel(Ok(initial));
        (TargetSender { tx }, WatchSource { rx })
    }
}

#[async_trait]
impl TargetSource for WatchSource {
    async fn read(&self) -> Result<Option<i64>, SourceError> {
        if self.rx.has_changed().is_err() {
            return Err(SourceError::SourceUnavailable {
                error: "target sender dropped".to_string(),
            });
        }
        self.rx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_latest_value_wins() {
        let (tx, source) = WatchSource::channel(None);
        assert_eq!(source.read().await, Ok(None));

        tx.set(1);
        tx.set(4);
        assert_eq!(source.read().await, Ok(Some(4)));
        assert_eq!(source.read().await, Ok(Some(4)));

        tx.clear();
        assert_eq!(source.read().await, Ok(None));
    }

    #[tokio::test]
    async fn test_failure_is_forwarded() {
        let (tx, source) = WatchSource::channel(Some(1));
        tx.fail(SourceError::SourceUnavailable {
            error: "down".into(),
        });
        let err = source.read().await.expect_err("must fail");
        assert_eq!(err.as_label(), "source_unavailable");
    }

    #[tokio::test]
    async fn test_dropped_sender_is_unavailable() {
        let (tx, source) = WatchSource::channel(Some(1));
        drop(tx);
        assert!(source.read().await.is_err());
    }
}
