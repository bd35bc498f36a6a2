use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use poolvisor::{
    Event, EventKind, FlagSource, Pool, PoolConfig, RuntimeError, SourceError, StaticSource,
    Subscribe, WatchSource, WorkError, WorkFn, WorkRef,
};
use tokio::time;
use uuid::Uuid;

#[derive(Default)]
struct Collect {
    seen: Mutex<Vec<EventKind>>,
}

#[async_trait]
impl Subscribe for Collect {
    async fn on_event(&self, e: &Event) {
        self.seen.lock().expect("collector lock").push(e.kind);
    }

    fn name(&self) -> &'static str {
        "collect"
    }
}

impl Collect {
    fn kinds(&self) -> Vec<EventKind> {
        self.seen.lock().expect("collector lock").clone()
    }
}

fn cfg() -> PoolConfig {
    PoolConfig {
        tick: Duration::from_secs(1),
        worker_duration: Duration::from_secs(60),
        worker_interval: Duration::from_secs(1),
        grace: Duration::from_secs(5),
        ..PoolConfig::default()
    }
}

fn idle_work() -> WorkRef {
    WorkFn::arc("idle", |_task: Uuid| async { Ok::<_, WorkError>(()) })
}

fn count(kinds: &[EventKind], kind: EventKind) -> usize {
    kinds.iter().filter(|k| **k == kind).count()
}

#[tokio::test(start_paused = true)]
async fn token_shutdown_stops_all_workers() {
    let collect = Arc::new(Collect::default());
    let pool = Pool::builder(cfg(), idle_work())
        .with_source(StaticSource::new(3))
        .with_subscribers(vec![collect.clone()])
        .build();
    let mut rx = pool.subscribe();

    let token = pool.shutdown_token();
    tokio::spawn(async move {
        time::sleep(Duration::from_secs(5)).await;
        token.cancel();
    });

    pool.run().await.expect("clean shutdown");

    let mut reasons = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        if ev.kind == EventKind::ShutdownRequested {
            reasons.push(ev.reason.as_deref().map(str::to_owned));
        }
    }
    assert_eq!(reasons, vec![Some("token".to_owned())]);

    let kinds = collect.kinds();
    assert_eq!(kinds.first(), Some(&EventKind::PoolStarted));
    assert_eq!(kinds.last(), Some(&EventKind::PoolStopped));
    assert_eq!(count(&kinds, EventKind::TaskSpawned), 3);
    assert_eq!(count(&kinds, EventKind::TaskReaped), 3);
    assert_eq!(count(&kinds, EventKind::ShutdownRequested), 1);
    assert_eq!(count(&kinds, EventKind::AllStoppedWithin), 1);
}

#[tokio::test(start_paused = true)]
async fn lifetime_end_stops_pool_without_shutdown_request() {
    let cfg = PoolConfig {
        lifetime: Duration::from_secs(10),
        ..cfg()
    };
    let pool = Pool::builder(cfg, idle_work())
        .with_source(StaticSource::new(1))
        .build();
    let mut rx = pool.subscribe();

    pool.run().await.expect("clean shutdown");

    let mut kinds = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        kinds.push(ev.kind);
    }
    assert_eq!(count(&kinds, EventKind::ShutdownRequested), 0);
    assert_eq!(count(&kinds, EventKind::AllStoppedWithin), 1);
    assert_eq!(kinds.last(), Some(&EventKind::PoolStopped));
}

#[tokio::test(start_paused = true)]
async fn stuck_workers_exceed_grace() {
    let slow: WorkRef = WorkFn::arc("slow", |_task: Uuid| async {
        time::sleep(Duration::from_secs(600)).await;
        Ok::<_, WorkError>(())
    });
    let cfg = PoolConfig {
        grace: Duration::from_secs(1),
        ..cfg()
    };
    let pool = Pool::builder(cfg, slow)
        .with_source(StaticSource::new(2))
        .build();
    let mut rx = pool.subscribe();

    let token = pool.shutdown_token();
    tokio::spawn(async move {
        time::sleep(Duration::from_secs(3)).await;
        token.cancel();
    });

    let err = pool.run().await.expect_err("grace must run out");
    let RuntimeError::GraceExceeded { grace, stuck } = err else {
        panic!("unexpected runtime error");
    };
    assert_eq!(grace, Duration::from_secs(1));
    assert_eq!(stuck.len(), 2);

    let mut grace_events = 0;
    while let Ok(ev) = rx.try_recv() {
        if ev.kind == EventKind::GraceExceeded {
            assert_eq!(ev.timeout_ms, Some(1000));
            grace_events += 1;
        }
    }
    assert_eq!(grace_events, 1);
}

#[tokio::test(start_paused = true)]
async fn pool_without_source_keeps_initial_target() {
    let cfg = PoolConfig {
        initial_target: 2,
        lifetime: Duration::from_secs(3),
        ..cfg()
    };
    let pool = Pool::builder(cfg, idle_work()).build();
    let mut rx = pool.subscribe();

    pool.run().await.expect("clean shutdown");

    let mut spawned = 0;
    while let Ok(ev) = rx.try_recv() {
        assert_ne!(ev.kind, EventKind::TargetChanged);
        if ev.kind == EventKind::TaskSpawned {
            spawned += 1;
        }
    }
    assert_eq!(spawned, 2);
}

struct MemoryFlag(Arc<AtomicBool>);

#[async_trait]
impl FlagSource for MemoryFlag {
    async fn read(&self) -> Result<bool, SourceError> {
        Ok(self.0.load(Ordering::SeqCst))
    }
}

#[tokio::test(start_paused = true)]
async fn stop_flag_suspends_reconciling() {
    let flag = Arc::new(AtomicBool::new(false));
    let (target, source) = WatchSource::channel(Some(1));
    let pool = Pool::builder(cfg(), idle_work())
        .with_source(source)
        .with_stop_flag(MemoryFlag(flag.clone()))
        .build();
    let mut rx = pool.subscribe();
    let token = pool.shutdown_token();
    let run = tokio::spawn(pool.run());

    time::sleep(Duration::from_millis(2500)).await;
    flag.store(true, Ordering::SeqCst);
    time::sleep(Duration::from_secs(1)).await;
    target.set(4);
    time::sleep(Duration::from_secs(3)).await;

    let mut before = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        before.push(ev.kind);
    }
    assert_eq!(count(&before, EventKind::TaskSpawned), 1);
    assert_eq!(count(&before, EventKind::SignalChanged), 1);

    flag.store(false, Ordering::SeqCst);
    time::sleep(Duration::from_secs(3)).await;
    token.cancel();
    run.await.expect("pool join").expect("clean shutdown");

    let mut after = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        after.push(ev.kind);
    }
    assert_eq!(count(&after, EventKind::TaskSpawned), 3);
    assert_eq!(count(&after, EventKind::SignalChanged), 1);
}
