//! # Stop signal shared between a task and its controller.
//!
//! [`StopSignal`] is an atomic boolean. Clones share the same flag, so the
//! controller keeps one clone and the task's run loop reads another.
//!
//! Setting the signal is advisory: the run loop only looks at it at the top of
//! each interval, and it has no effect once the window is over.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Concurrency-safe stop flag.
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    /// Creates a cleared signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop. Idempotent.
    #[inline]
    pub fn set(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// Withdraws a stop request.
    #[inline]
    pub fn clear(&self) {
        self.stopped.store(false, Ordering::Release);
    }

    /// Returns true if a stop is currently requested.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let a = StopSignal::new();
        let b = a.clone();
        assert!(!b.is_set());

        a.set();
        assert!(b.is_set());

        b.clear();
        assert!(!a.is_set());
    }

    #[test]
    fn test_set_is_idempotent() {
        let s = StopSignal::new();
        s.set();
        s.set();
        assert!(s.is_set());
    }

    #[test]
    fn test_visible_across_threads() {
        let s = StopSignal::new();
        let writer = s.clone();
        std::thread::spawn(move || writer.set())
            .join()
            .expect("writer thread");
        assert!(s.is_set());
    }
}
