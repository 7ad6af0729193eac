//! Tests for the async countdown driver under a paused clock.

use std::{
    num::NonZeroU32,
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    lifecycle::{Lifecycle, LifecycleStage, SharedLifecycle, spawn_countdown},
    payload::{Expiration, LogicalPayload},
    store::DiscardStore,
};

const GRACE: Duration = Duration::from_millis(600);

fn shared_countdown(seconds: u32) -> SharedLifecycle {
    let payload = LogicalPayload::new(
        "ticking",
        Expiration::Countdown(NonZeroU32::new(seconds).expect("non-zero")),
    )
    .with_created_at_ms(0);
    SharedLifecycle::new(Lifecycle::on_assembled_at(
        payload,
        Arc::new(DiscardStore),
        GRACE,
        0,
    ))
}

#[tokio::test(start_paused = true)]
async fn countdown_task_drives_vanish_and_destruction() {
    let shared = shared_countdown(5);
    let opened = Instant::now();
    shared.open_at(opened).expect("openable");

    let handle = spawn_countdown(shared.clone());
    // The paused clock fast-forwards through the countdown and the grace
    // period; the task exits once nothing is pending.
    handle.join().await;

    assert_eq!(
        shared.poll_at(opened + Duration::from_secs(6)),
        LifecycleStage::Destroyed
    );
}

#[tokio::test(start_paused = true)]
async fn cancelling_the_task_is_not_a_destruction_event() {
    let shared = shared_countdown(5);
    let opened = Instant::now();
    shared.open_at(opened).expect("openable");

    let handle = spawn_countdown(shared.clone());
    handle.cancel();
    handle.join().await;

    // The view is gone but the message is untouched mid-countdown.
    assert!(matches!(
        shared.poll_at(opened + Duration::from_secs(2)),
        LifecycleStage::CountingDown { .. }
    ));

    // The countdown itself still runs on the wall clock: a later poll from
    // a fresh session observes destruction.
    assert_eq!(
        shared.poll_at(opened + Duration::from_secs(6)),
        LifecycleStage::Destroyed
    );
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_cancels_pending_polls() {
    let shared = shared_countdown(30);
    let opened = Instant::now();
    shared.open_at(opened).expect("openable");

    drop(spawn_countdown(shared.clone()));
    tokio::task::yield_now().await;

    assert!(matches!(
        shared.poll_at(opened + Duration::from_secs(1)),
        LifecycleStage::CountingDown { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn task_exits_immediately_when_nothing_is_pending() {
    let payload = LogicalPayload::new("stay", Expiration::ReadOnce).with_created_at_ms(0);
    let shared = SharedLifecycle::new(Lifecycle::on_assembled_at(
        payload,
        Arc::new(DiscardStore),
        GRACE,
        0,
    ));
    shared.open_at(Instant::now()).expect("openable");

    let handle = spawn_countdown(shared.clone());
    handle.join().await;
    assert_eq!(shared.poll(), LifecycleStage::OpenReadOnce);
}
