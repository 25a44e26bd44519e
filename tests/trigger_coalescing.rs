// tests/trigger_coalescing.rs

//! Property: any burst of N≥1 notifications before a consumption collapses
//! into exactly one trigger, and exactly one additional run.

use std::time::Duration;

use proptest::prelude::*;
use watchrun::engine::TriggerQueue;
use watchrun_test_utils::{init_tracing, with_timeout};

#[tokio::test]
async fn one_notify_one_trigger() {
    init_tracing();
    let mut queue = TriggerQueue::new();
    queue.notify();
    with_timeout(queue.next()).await;
}

#[tokio::test]
async fn burst_collapses_to_single_trigger() {
    init_tracing();
    let mut queue = TriggerQueue::new();
    for _ in 0..50 {
        queue.notify();
    }
    with_timeout(queue.next()).await;

    let second = tokio::time::timeout(Duration::from_millis(50), queue.next()).await;
    assert!(second.is_err(), "burst must coalesce into one trigger");
}

#[tokio::test]
async fn triggers_after_consumption_are_seen_again() {
    init_tracing();
    let mut queue = TriggerQueue::new();
    let handle = queue.handle();

    queue.notify();
    with_timeout(queue.next()).await;

    handle.notify();
    handle.notify();
    with_timeout(queue.next()).await;

    let third = tokio::time::timeout(Duration::from_millis(50), queue.next()).await;
    assert!(third.is_err());
}

#[tokio::test]
async fn exactly_one_run_per_burst() {
    init_tracing();
    let fixture = watchrun_test_utils::fixture::supervisor_with_command("true");
    let supervisor = fixture.supervisor;

    let mut queue = TriggerQueue::new();
    for _ in 0..10 {
        queue.notify();
    }
    with_timeout(queue.next()).await;
    supervisor.on_trigger().expect("trigger");

    assert_eq!(supervisor.current_generation(), 1);
    let pending = tokio::time::timeout(Duration::from_millis(50), queue.next()).await;
    assert!(pending.is_err(), "the burst must produce exactly one run");
}

proptest! {
    #[test]
    fn any_burst_size_yields_one_trigger(n in 1usize..64) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let extra_pending = rt.block_on(async {
            let mut queue = TriggerQueue::new();
            for _ in 0..n {
                queue.notify();
            }
            queue.next().await;
            tokio::time::timeout(Duration::from_millis(10), queue.next())
                .await
                .is_ok()
        });
        prop_assert!(!extra_pending, "{} notifies left extra triggers", n);
    }
}
