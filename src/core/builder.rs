use std::sync::Arc;

use crate::core::{PoolConfig, pool::Pool};
use crate::source::{FlagSource, StaticSource, TargetSource};
use crate::subscribers::Subscribe;
use crate::tasks::WorkRef;

/// Builder for a [`Pool`].
pub struct PoolBuilder {
    cfg: PoolConfig,
    work: WorkRef,
    source: Box<dyn TargetSource>,
    stop_flag: Option<Arc<dyn FlagSource>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl PoolBuilder {
    /// Creates a builder; without a source the pool stays at `cfg.initial_target`.
    pub fn new(cfg: PoolConfig, work: WorkRef) -> Self {
        Self {
            cfg,
            work,
            source: Box::new(StaticSource::none()),
            stop_flag: None,
            subscribers: Vec::new(),
        }
    }

    /// Sets where the target count is read from on every pass.
    pub fn with_source(mut self, source: impl TargetSource) -> Self {
        self.source = Box::new(source);
        self
    }

    /// Suspends reconciling while `flag` reads `true` (polled every `tick`).
    ///
    /// Live workers keep running while reconciling is suspended.
    pub fn with_stop_flag(mut self, flag: impl FlagSource) -> Self {
        self.stop_flag = Some(Arc::new(flag));
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (target changes, worker lifecycle, failures)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the pool. Nothing runs until [`Pool::run`].
    pub fn build(self) -> Pool {
        Pool::new_internal(
            self.cfg,
            self.source,
            self.stop_flag,
            self.work,
            self.subscribers,
        )
    }
}
