//! # Function-backed work (`WorkFn`)
//!
//! [`WorkFn`] wraps a closure `F: Fn(Uuid) -> Fut`, producing a fresh future per
//! unit of work. Nothing is shared between calls unless the closure captures it
//! explicitly (use `Arc<...>` for that).
//!
//! ## Example
//! ```rust
//! use poolvisor::{WorkError, WorkFn, WorkRef};
//! use uuid::Uuid;
//!
//! let w: WorkRef = WorkFn::arc("print", |task: Uuid| async move {
//!     println!("working on {task}");
//!     Ok::<_, WorkError>(())
//! });
//!
//! assert_eq!(w.name(), "print");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::WorkError;
use crate::tasks::work::Work;

/// Function-backed work implementation.
#[derive(Debug)]
pub struct WorkFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> WorkFn<F> {
    /// Creates a new function-backed unit of work.
    ///
    /// Prefer [`WorkFn::arc`] when you immediately need a [`WorkRef`](crate::WorkRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the work and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Work for WorkFn<F>
where
    F: Fn(Uuid) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), WorkError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, task: Uuid) -> Result<(), WorkError> {
        (self.f)(task).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_fresh_future_per_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let work = WorkFn::new("count", move |_task: Uuid| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, WorkError>(())
            }
        });

        let id = Uuid::new_v4();
        work.execute(id).await.expect("first");
        work.execute(id).await.expect("second");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_error_passes_through() {
        let work = WorkFn::new("fail", |_task: Uuid| async { Err::<(), _>(WorkError::fail("nope")) });
        let err = work.execute(Uuid::new_v4()).await.expect_err("must fail");
        assert_eq!(err, WorkError::fail("nope"));
    }
}
