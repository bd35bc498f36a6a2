use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use poolvisor::{
    Bus, EventKind, PoolConfig, PoolReconciler, SourceError, StaticSource, WatchSource,
    WorkError, WorkFn, WorkRef,
};
use tokio::sync::broadcast;
use tokio::time;
use uuid::Uuid;

const INTERVAL: Duration = Duration::from_secs(1);

fn cfg() -> PoolConfig {
    PoolConfig {
        tick: Duration::from_secs(1),
        worker_duration: Duration::from_secs(3600),
        worker_interval: INTERVAL,
        ..PoolConfig::default()
    }
}

fn counting_work(counter: Arc<AtomicU64>) -> WorkRef {
    WorkFn::arc("count", move |_task: Uuid| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, WorkError>(())
        }
    })
}

fn idle_work() -> WorkRef {
    counting_work(Arc::new(AtomicU64::new(0)))
}

/// Lets every stopped worker observe its closed window.
async fn let_workers_exit() {
    time::sleep(INTERVAL + Duration::from_millis(10)).await;
}

fn kinds(rx: &mut broadcast::Receiver<poolvisor::Event>) -> Vec<EventKind> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev.kind);
    }
    out
}

#[tokio::test(start_paused = true)]
async fn grow_then_shrink_keeps_youngest() {
    let (tx, source) = WatchSource::channel(Some(0));
    let mut rec = PoolReconciler::new(cfg(), Box::new(source), idle_work(), Bus::new(256));

    let report = rec.reconcile().await;
    assert!(report.spawned.is_empty());
    assert_eq!(rec.live_len(), 0);

    tx.set(3);
    let ids = rec.reconcile().await.spawned;
    assert_eq!(ids.len(), 3);
    assert_eq!(rec.live_ids(), ids);

    tx.set(1);
    let report = rec.reconcile().await;
    assert_eq!(report.stop_requested, vec![ids[0], ids[1]]);
    assert_eq!(rec.live_len(), 3);
    assert_eq!(rec.active_len(), 1);

    let_workers_exit().await;
    let mut report = rec.reconcile().await;
    report.drained.sort();
    let mut expected = vec![ids[0], ids[1]];
    expected.sort();
    assert_eq!(report.drained, expected);
    assert_eq!(rec.live_ids(), vec![ids[2]]);
    assert_eq!(rec.pending_removals(), 0);
}

#[tokio::test(start_paused = true)]
async fn converges_for_any_target_sequence() {
    let (tx, source) = WatchSource::channel(None);
    let mut rec = PoolReconciler::new(cfg(), Box::new(source), idle_work(), Bus::new(1024));

    for target in [4usize, 1, 1, 6, 0, 3, 7, 2] {
        tx.set(target as i64);
        rec.reconcile().await;
        assert_eq!(rec.active_len(), target);

        let_workers_exit().await;
        let report = rec.reconcile().await;
        assert!(report.spawned.is_empty());
        assert!(report.stop_requested.is_empty());
        assert_eq!(rec.live_len(), target);
        assert_eq!(rec.pending_removals(), 0);
    }
}

#[tokio::test(start_paused = true)]
async fn eviction_follows_insertion_order() {
    let (tx, source) = WatchSource::channel(Some(2));
    let mut rec = PoolReconciler::new(cfg(), Box::new(source), idle_work(), Bus::new(256));

    let first = rec.reconcile().await.spawned;
    tx.set(4);
    let second = rec.reconcile().await.spawned;

    tx.set(1);
    let report = rec.reconcile().await;
    assert_eq!(report.stop_requested, vec![first[0], first[1], second[0]]);

    // Lowering further while removals are in flight only touches unmarked workers.
    tx.set(0);
    let report = rec.reconcile().await;
    assert_eq!(report.stop_requested, vec![second[1]]);
}

#[tokio::test(start_paused = true)]
async fn source_failure_changes_nothing() {
    let (tx, source) = WatchSource::channel(Some(2));
    let bus = Bus::new(256);
    let mut rx = bus.subscribe();
    let mut rec = PoolReconciler::new(cfg(), Box::new(source), idle_work(), bus);
    let ids = rec.reconcile().await.spawned;
    kinds(&mut rx);

    tx.fail(SourceError::SourceUnavailable {
        error: "connection refused".into(),
    });
    let report = rec.reconcile().await;

    assert_eq!(report.target, 2);
    assert!(report.spawned.is_empty());
    assert!(report.stop_requested.is_empty());
    assert_eq!(rec.live_ids(), ids);
    assert_eq!(kinds(&mut rx), vec![EventKind::TargetReadFailed]);
}

#[tokio::test(start_paused = true)]
async fn negative_target_is_rejected() {
    let (tx, source) = WatchSource::channel(Some(1));
    let bus = Bus::new(256);
    let mut rx = bus.subscribe();
    let mut rec = PoolReconciler::new(cfg(), Box::new(source), idle_work(), bus);
    rec.reconcile().await;
    kinds(&mut rx);

    tx.set(-3);
    let report = rec.reconcile().await;
    assert_eq!(report.target, 1);
    assert_eq!(rec.target(), 1);
    assert_eq!(rec.live_len(), 1);

    let ev = rx.try_recv().expect("read failure event");
    assert_eq!(ev.kind, EventKind::TargetReadFailed);
    assert_eq!(ev.reason.as_deref(), Some("negative value: -3"));
}

#[tokio::test(start_paused = true)]
async fn expired_workers_are_replaced() {
    let cfg = PoolConfig {
        worker_duration: Duration::from_secs(5),
        ..cfg()
    };
    let counter = Arc::new(AtomicU64::new(0));
    let mut rec = PoolReconciler::new(
        cfg,
        Box::new(StaticSource::new(2)),
        counting_work(counter.clone()),
        Bus::new(256),
    );

    let first = rec.reconcile().await.spawned;
    time::sleep(Duration::from_secs(7)).await;

    let report = rec.reconcile().await;
    assert_eq!(report.drained.len(), 2);
    assert_eq!(report.spawned.len(), 2);
    assert!(report.spawned.iter().all(|id| !first.contains(id)));
    assert_eq!(rec.live_len(), 2);
    assert!(counter.load(Ordering::SeqCst) >= 2 * 5);
}

#[tokio::test(start_paused = true)]
async fn each_worker_completes_once() {
    let (tx, source) = WatchSource::channel(Some(5));
    let bus = Bus::new(1024);
    let mut rx = bus.subscribe();
    let mut rec = PoolReconciler::new(cfg(), Box::new(source), idle_work(), bus);
    let ids = rec.reconcile().await.spawned;

    tx.set(0);
    rec.reconcile().await;
    let_workers_exit().await;
    let report = rec.reconcile().await;
    assert_eq!(report.drained.len(), ids.len());
    assert!(rec.completions().is_empty());

    let mut reaped = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        if ev.kind == EventKind::TaskReaped {
            reaped.push(ev.task.expect("reaped task id"));
        }
    }
    reaped.sort();
    reaped.dedup();
    assert_eq!(reaped.len(), ids.len());
}

#[tokio::test(start_paused = true)]
async fn oversized_target_is_rejected() {
    let cfg = PoolConfig {
        max_target: 8,
        ..cfg()
    };
    let (tx, source) = WatchSource::channel(Some(2));
    let bus = Bus::new(256);
    let mut rx = bus.subscribe();
    let mut rec = PoolReconciler::new(cfg, Box::new(source), idle_work(), bus);
    rec.reconcile().await;
    kinds(&mut rx);

    tx.set(i64::MAX);
    let report = rec.reconcile().await;
    assert_eq!(report.target, 2);
    assert!(report.spawned.is_empty());
    assert_eq!(rec.live_len(), 2);

    let ev = rx.try_recv().expect("read failure event");
    assert_eq!(ev.kind, EventKind::TargetReadFailed);
    assert_eq!(
        ev.reason.as_deref(),
        Some("value 9223372036854775807 above maximum 8")
    );

    tx.set(8);
    assert_eq!(rec.reconcile().await.spawned.len(), 6);
    assert_eq!(rec.active_len(), 8);
}

#[tokio::test(start_paused = true)]
async fn oversized_initial_target_is_capped() {
    let cfg = PoolConfig {
        initial_target: 50,
        max_target: 4,
        ..cfg()
    };
    let (_tx, source) = WatchSource::channel(None);
    let mut rec = PoolReconciler::new(cfg, Box::new(source), idle_work(), Bus::new(256));
    assert_eq!(rec.target(), 4);
    assert_eq!(rec.reconcile().await.spawned.len(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn converges_with_short_lived_workers_on_real_time() {
    let cfg = PoolConfig {
        tick: Duration::from_millis(10),
        worker_duration: Duration::from_millis(30),
        worker_interval: Duration::from_millis(5),
        ..PoolConfig::default()
    };
    let (tx, source) = WatchSource::channel(None);
    let mut rec = PoolReconciler::new(cfg, Box::new(source), idle_work(), Bus::new(4096));

    tx.set(20);
    rec.reconcile().await;
    assert_eq!(rec.active_len(), 20);

    tx.set(3);
    rec.reconcile().await;
    assert_eq!(rec.active_len(), 3);

    let mut settled = false;
    for _ in 0..100 {
        time::sleep(Duration::from_millis(10)).await;
        rec.reconcile().await;
        // Expired workers are drained and replaced within the same pass.
        assert_eq!(rec.active_len(), 3);
        if rec.pending_removals() == 0 {
            settled = true;
            break;
        }
    }

    assert!(settled, "stopped workers were never drained");
    assert_eq!(rec.live_len(), 3);
    assert_eq!(rec.active_len(), 3);
    assert_eq!(rec.pending_removals(), 0);
}
