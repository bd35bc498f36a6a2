//! # Run window of a managed task.
//!
//! [`TimeWindow`] is a closed interval `[start, stop]` of [`tokio::time::Instant`]s.
//! A task is eligible to execute only while "now" lies inside its window.
//!
//! Windows are plain values: they never change after construction. Forcing a task
//! to expire early replaces its window with [`TimeWindow::expired_at`].
//!
//! Using tokio's clock means tests can drive windows with `tokio::time::pause()`
//! and `tokio::time::advance()`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio::time::Instant;
//! use poolvisor::{TimeWindow, WindowPhase};
//!
//! let start = Instant::now();
//! let window = TimeWindow::new(start, Duration::from_secs(60));
//!
//! assert!(window.contains(start));
//! assert!(window.contains(start + Duration::from_secs(60)));
//! assert_eq!(window.phase(start + Duration::from_secs(61)), WindowPhase::After);
//! ```

use std::time::Duration;

use tokio::time::Instant;

/// Upper bound for a window span; keeps `start + duration` from overflowing.
const MAX_SPAN: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Position of an instant relative to a [`TimeWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPhase {
    /// `now < start`.
    Before,
    /// `start <= now <= stop`.
    Inside,
    /// `now > stop`.
    After,
}

/// Validity interval of a task. Invariant: `start <= stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: Instant,
    stop: Instant,
}

impl TimeWindow {
    /// Creates a window that opens at `start` and stays open for `duration`.
    ///
    /// Durations longer than roughly a century are clamped.
    pub fn new(start: Instant, duration: Duration) -> Self {
        let stop = start
            .checked_add(duration.min(MAX_SPAN))
            .unwrap_or(start);
        Self { start, stop }
    }

    /// Creates a window that opens now.
    pub fn starting_now(duration: Duration) -> Self {
        Self::new(Instant::now(), duration)
    }

    /// Returns the opening instant.
    pub fn start(&self) -> Instant {
        self.start
    }

    /// Returns the closing instant.
    pub fn stop(&self) -> Instant {
        self.stop
    }

    /// Returns true iff `start <= now <= stop`.
    #[inline]
    pub fn contains(&self, now: Instant) -> bool {
        self.start <= now && now <= self.stop
    }

    /// Classifies `now` relative to the window.
    pub fn phase(&self, now: Instant) -> WindowPhase {
        if now < self.start {
            WindowPhase::Before
        } else if now <= self.stop {
            WindowPhase::Inside
        } else {
            WindowPhase::After
        }
    }

    /// Returns a copy of this window closed at `now`.
    ///
    /// The stop instant never moves later, so an already expired window stays expired.
    /// `start` is pulled back when needed to keep `start <= stop`.
    #[must_use]
    pub fn expired_at(&self, now: Instant) -> Self {
        let stop = self.stop.min(now);
        Self {
            start: self.start.min(stop),
            stop,
        }
    }
}
