//! # Pool configuration.
//!
//! Provides [`PoolConfig`], the settings shared by the reconciler, its workers and the
//! pool runtime.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`PoolConfig::bus_capacity_clamped`]
//! - `tick = 0s` / `worker_interval = 0s` → clamped to 1ms (a zero pause would spin)
//! - `grace = 0s` → do not wait for workers on shutdown

use std::time::Duration;

use tokio::time::Instant;

use crate::tasks::{MIN_INTERVAL, TaskParams, TimeWindow};

/// Configuration of an elastic worker pool.
///
/// ## Field semantics
/// - `tick`: pause between two reconcile passes
/// - `lifetime`: length of the reconciler's own run window
/// - `worker_duration` / `worker_interval`: window length and pause of every spawned worker
/// - `initial_target`: target used until the source reports a value
/// - `max_target`: largest target accepted from the source
/// - `bus_capacity`: event bus ring buffer size
/// - `grace`: how long shutdown waits for workers to exit
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Pause between two reconcile passes.
    pub tick: Duration,

    /// How long the reconciler keeps running before its own window closes.
    pub lifetime: Duration,

    /// Run window length of each spawned worker.
    ///
    /// A worker whose window closes exits on its own; the next pass replaces it.
    pub worker_duration: Duration,

    /// Pause between two units of work inside a worker.
    ///
    /// Also bounds how long a worker takes to notice it was stopped.
    pub worker_interval: Duration,

    /// Target before the source has reported anything.
    pub initial_target: usize,

    /// Largest target accepted from the source.
    ///
    /// A larger value is rejected like a negative one and the current target is kept.
    /// `initial_target` is lowered to this value.
    pub max_target: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages skip older items.
    pub bus_capacity: usize,

    /// Maximum time to wait for workers on shutdown.
    ///
    /// If it runs out, `Pool::run` returns `RuntimeError::GraceExceeded`.
    pub grace: Duration,
}

impl PoolConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the reconcile period clamped to a minimum of 1ms.
    #[inline]
    pub fn tick_clamped(&self) -> Duration {
        self.tick.max(MIN_INTERVAL)
    }

    /// Run window of a worker spawned at `now`.
    pub fn worker_window(&self, now: Instant) -> TimeWindow {
        TimeWindow::new(now, self.worker_duration)
    }

    /// Scheduling parameters of a worker spawned at `now`.
    pub fn worker_params(&self, now: Instant) -> TaskParams {
        TaskParams {
            window: self.worker_window(now),
            interval: self.worker_interval,
        }
    }

    /// Run window of a reconciler started at `now`.
    pub fn lifetime_window(&self, now: Instant) -> TimeWindow {
        TimeWindow::new(now, self.lifetime)
    }
}

impl Default for PoolConfig {
    /// Default configuration:
    ///
    /// - `tick = 1s`
    /// - `lifetime = 7 days`
    /// - `worker_duration = 60s`
    /// - `worker_interval = 3s`
    /// - `initial_target = 0`
    /// - `max_target = 10_000`
    /// - `bus_capacity = 1024`
    /// - `grace = 10s`
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            lifetime: Duration::from_secs(7 * 24 * 60 * 60),
            worker_duration: Duration::from_secs(60),
            worker_interval: Duration::from_secs(3),
            initial_target: 0,
            max_target: 10_000,
            bus_capacity: 1024,
            grace: Duration::from_secs(10),
        }
    }
}
