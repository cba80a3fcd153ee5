use pushbind_identity::IdentityCell;
use pushbind_types::{CancelToken, Cancelled, Deadline};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

// ── Non-blocking reads ───────────────────────────────────────────

#[test]
fn new_cell_is_empty() {
    let cell: IdentityCell<String> = IdentityCell::new();
    assert_eq!(cell.get(), None);
    assert_eq!(cell.ready_at(), None);
    assert_eq!(cell.writes(), 0);
}

#[test]
fn last_write_wins() {
    let cell = IdentityCell::new();
    cell.set("first".to_string());
    cell.set("second".to_string());
    assert_eq!(cell.get().as_deref(), Some("second"));
    assert_eq!(cell.writes(), 2);
}

#[test]
fn ready_at_records_first_write() {
    let cell = IdentityCell::new();
    cell.set(1u32);
    let first = cell.ready_at().unwrap();
    std::thread::sleep(Duration::from_millis(5));
    cell.set(2u32);
    assert_eq!(cell.ready_at(), Some(first));
}

// ── Bounded waits ────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn await_returns_immediately_when_set() {
    let cell = IdentityCell::new();
    cell.set("ps-1".to_string());

    let start = Instant::now();
    let value = cell.await_until(Duration::from_secs(10)).await;
    assert_eq!(value.as_deref(), Some("ps-1"));
    assert!(start.elapsed() < Duration::from_millis(1));
}

#[tokio::test(start_paused = true)]
async fn await_times_out_with_none() {
    let cell: IdentityCell<String> = IdentityCell::new();

    let start = Instant::now();
    let value = cell.await_until(Duration::from_secs(10)).await;
    let elapsed = start.elapsed();

    assert_eq!(value, None);
    assert!(elapsed >= Duration::from_secs(10));
    assert!(elapsed < Duration::from_millis(10_100));
}

#[tokio::test(start_paused = true)]
async fn write_wakes_waiter_early() {
    let cell = Arc::new(IdentityCell::new());
    let writer = cell.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        writer.set("ps-123".to_string());
    });

    let start = Instant::now();
    let value = cell.await_until(Duration::from_secs(10)).await;
    let elapsed = start.elapsed();

    assert_eq!(value.as_deref(), Some("ps-123"));
    assert!(elapsed >= Duration::from_millis(2500));
    assert!(elapsed < Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn expired_deadline_returns_current_value() {
    let cell: IdentityCell<String> = IdentityCell::new();
    let deadline = Deadline::after(Duration::ZERO);
    assert_eq!(cell.await_until_deadline(deadline).await, None);

    cell.set("late".to_string());
    assert_eq!(
        cell.await_until_deadline(deadline).await.as_deref(),
        Some("late")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn write_from_foreign_thread_is_visible() {
    let cell = Arc::new(IdentityCell::new());
    let writer = cell.clone();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        writer.set("from-host".to_string());
    });

    let value = cell.await_until(Duration::from_secs(5)).await;
    handle.join().unwrap();
    assert_eq!(value.as_deref(), Some("from-host"));
}

// ── Cancellation ─────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn cancelled_wait_reports_cancelled() {
    let cell: IdentityCell<String> = IdentityCell::new();
    let token = CancelToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let start = Instant::now();
    let result = cell
        .await_cancellable(Deadline::after(Duration::from_secs(10)), &token)
        .await;
    assert_eq!(result, Err(Cancelled));
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn uncancelled_wait_returns_value() {
    let cell = IdentityCell::new();
    cell.set(7u8);
    let token = CancelToken::new();
    let result = cell
        .await_cancellable(Deadline::after(Duration::from_secs(1)), &token)
        .await;
    assert_eq!(result, Ok(Some(7)));
}

// ── Watchers ─────────────────────────────────────────────────────

#[tokio::test]
async fn watcher_sees_writes_after_subscribe() {
    let cell = IdentityCell::new();
    cell.set("before".to_string());
    let mut watcher = cell.subscribe();
    assert_eq!(watcher.current().as_deref(), Some("before"));

    cell.set("after".to_string());
    let seen = watcher.changed().await;
    assert_eq!(seen, Some(Some("after".to_string())));
}

#[tokio::test]
async fn watcher_ends_when_cell_dropped() {
    let cell: IdentityCell<String> = IdentityCell::new();
    let mut watcher = cell.subscribe();
    drop(cell);
    assert_eq!(watcher.changed().await, None);
}
