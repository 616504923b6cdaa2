use super::*;

use std::time::Duration;

use futures::StreamExt;

async fn wait_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

fn counter_with_interval(ms: i64) -> CounterController {
    CounterController::with_interval(IntervalMs::new(ms).expect("interval")).expect("runtime")
}

#[tokio::test]
async fn starts_from_defaults() {
    let counter = CounterController::new().expect("runtime");
    let snapshot = counter.snapshot();

    assert_eq!(snapshot.count, 0);
    assert!(!snapshot.auto_running);
    assert_eq!(snapshot.interval_ms.get(), 3_000);
}

#[tokio::test]
async fn manual_steps_sum_in_order() {
    let counter = counter_with_interval(100);
    for step in [1, 1, -1, 1, -1, -1, -1] {
        if step > 0 {
            counter.increment();
        } else {
            counter.decrement();
        }
    }
    assert_eq!(counter.snapshot().count, -1);

    counter.increment();
    counter.increment();
    assert_eq!(counter.reset().count, 0);
}

#[tokio::test(start_paused = true)]
async fn auto_run_increments_once_per_interval() {
    let mut counter = counter_with_interval(100);
    assert!(counter.toggle_auto().auto_running);

    wait_ms(550).await;
    assert_eq!(counter.snapshot().count, 5);
}

#[tokio::test(start_paused = true)]
async fn stopping_auto_run_freezes_the_count() {
    let mut counter = counter_with_interval(100);
    counter.toggle_auto();
    wait_ms(250).await;

    let stopped = counter.toggle_auto();
    assert!(!stopped.auto_running);
    assert!(!counter.is_auto_running());

    wait_ms(300).await;
    assert_eq!(counter.snapshot().count, stopped.count);
}

#[tokio::test(start_paused = true)]
async fn invalid_intervals_change_nothing() {
    let mut counter = counter_with_interval(100);
    counter.toggle_auto();
    let version_before = counter.state.version();

    assert!(counter.set_interval(0).is_err());
    assert!(counter.set_interval(-5).is_err());
    assert!(counter.set_interval_text("soon").is_err());
    assert!(counter.set_interval_text("").is_err());

    assert_eq!(counter.state.version(), version_before);
    assert_eq!(counter.snapshot().interval_ms.get(), 100);

    // Loop was not restarted: ticks keep their first phase.
    wait_ms(150).await;
    assert_eq!(counter.snapshot().count, 1);
}

#[tokio::test(start_paused = true)]
async fn new_interval_while_running_restarts_the_loop() {
    let mut counter = counter_with_interval(1_000);
    counter.toggle_auto();
    wait_ms(600).await;

    let snapshot = counter.set_interval(100).expect("valid interval");
    assert_eq!(snapshot.interval_ms.get(), 100);
    assert!(snapshot.auto_running);

    wait_ms(450).await;
    assert_eq!(counter.snapshot().count, 4);
}

#[tokio::test(start_paused = true)]
async fn same_interval_while_running_restarts_the_phase() {
    let mut counter = counter_with_interval(1_000);
    counter.toggle_auto();
    wait_ms(600).await;

    counter.set_interval(1_000).expect("valid interval");
    wait_ms(500).await;
    assert_eq!(counter.snapshot().count, 0);

    wait_ms(550).await;
    assert_eq!(counter.snapshot().count, 1);
}

#[tokio::test(start_paused = true)]
async fn interval_change_while_running_publishes_once() {
    let mut counter = counter_with_interval(1_000);
    counter.toggle_auto();
    let version_before = counter.state.version();

    counter.set_interval(200).expect("valid interval");
    assert_eq!(counter.state.version(), version_before + 1);
    assert!(counter.is_auto_running());
}

#[tokio::test(start_paused = true)]
async fn new_interval_while_stopped_does_not_start_the_loop() {
    let mut counter = counter_with_interval(1_000);
    counter.set_interval_text(" 50 ").expect("valid interval");

    wait_ms(500).await;
    let snapshot = counter.snapshot();
    assert_eq!(snapshot.interval_ms.get(), 50);
    assert_eq!(snapshot.count, 0);
    assert!(!counter.is_auto_running());
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_ticks_and_commands_in_order() {
    let mut counter = counter_with_interval(100);
    let stream = counter.subscribe();

    counter.toggle_auto();
    wait_ms(150).await;
    counter.decrement();
    counter.toggle_auto();

    let seen: Vec<(i64, bool)> = stream
        .take(5)
        .map(|s| (s.count, s.auto_running))
        .collect()
        .await;
    assert_eq!(seen, [(0, false), (0, true), (1, true), (0, true), (0, false)]);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_controller_stops_the_loop() {
    let mut counter = counter_with_interval(100);
    let state = counter.state.clone();
    counter.toggle_auto();
    wait_ms(150).await;
    drop(counter);

    let count = state.read().count;
    wait_ms(500).await;
    assert_eq!(state.read().count, count);
}
