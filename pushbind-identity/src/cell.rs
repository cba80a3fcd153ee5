//! Eventual values.
//!
//! An [`IdentityCell`] starts empty and is written whenever the external
//! system reports a value. Readers either peek without blocking or wait,
//! bounded by a ceiling or a [`Deadline`], and are woken by the write
//! itself rather than by polling.

use chrono::{DateTime, Utc};
use pushbind_types::{CancelToken, Cancelled, Deadline};
use std::fmt;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone)]
struct Slot<V> {
    value: Option<V>,
    ready_at: Option<DateTime<Utc>>,
    writes: u64,
}

/// A process-wide slot for one externally assigned identifier.
///
/// Writes are totally ordered by the underlying watch channel. The last
/// write wins; a cell that holds a value never goes back to empty.
pub struct IdentityCell<V> {
    tx: watch::Sender<Slot<V>>,
}

impl<V> IdentityCell<V>
where
    V: Clone + Send + Sync,
{
    /// Creates an empty cell.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Slot {
            value: None,
            ready_at: None,
            writes: 0,
        });
        Self { tx }
    }

    /// Stores `value`, replacing any previous one, and wakes all waiters.
    pub fn set(&self, value: V) {
        self.tx.send_modify(|slot| {
            if slot.ready_at.is_none() {
                slot.ready_at = Some(Utc::now());
            }
            slot.value = Some(value);
            slot.writes += 1;
        });
    }

    /// The current value, without waiting.
    pub fn get(&self) -> Option<V> {
        self.tx.borrow().value.clone()
    }

    /// When the cell first received a value.
    pub fn ready_at(&self) -> Option<DateTime<Utc>> {
        self.tx.borrow().ready_at
    }

    /// Number of writes so far.
    pub fn writes(&self) -> u64 {
        self.tx.borrow().writes
    }

    /// Waits up to `max_wait` for a value.
    ///
    /// Returns whatever the cell holds when the wait ends; `None` after the
    /// ceiling is a normal outcome, not an error.
    pub async fn await_until(&self, max_wait: Duration) -> Option<V> {
        self.await_until_deadline(Deadline::after(max_wait)).await
    }

    /// Waits until `deadline` for a value.
    pub async fn await_until_deadline(&self, deadline: Deadline) -> Option<V> {
        let mut rx = self.tx.subscribe();
        let waited =
            tokio::time::timeout_at(deadline.instant(), rx.wait_for(|slot| slot.value.is_some()))
                .await;
        match waited {
            Ok(Ok(slot)) => slot.value.clone(),
            // Timed out, or the sender is gone (impossible while `self` lives).
            _ => self.get(),
        }
    }

    /// Like [`await_until_deadline`](Self::await_until_deadline), but gives
    /// up with `Err(Cancelled)` when `token` fires.
    pub async fn await_cancellable(
        &self,
        deadline: Deadline,
        token: &CancelToken,
    ) -> Result<Option<V>, Cancelled> {
        token.run(self.await_until_deadline(deadline)).await
    }

    /// Watches future writes. Writes made before this call are not reported.
    pub fn subscribe(&self) -> CellWatcher<V> {
        CellWatcher {
            rx: self.tx.subscribe(),
        }
    }
}

impl<V> Default for IdentityCell<V>
where
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for IdentityCell<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.tx.borrow();
        f.debug_struct("IdentityCell")
            .field("value", &slot.value)
            .field("ready_at", &slot.ready_at)
            .field("writes", &slot.writes)
            .finish()
    }
}

/// Receives notifications of writes to one [`IdentityCell`].
pub struct CellWatcher<V> {
    rx: watch::Receiver<Slot<V>>,
}

impl<V: Clone> CellWatcher<V> {
    /// Waits for the next write and returns the cell's value after it.
    ///
    /// Returns `None` once the cell has been dropped.
    pub async fn changed(&mut self) -> Option<Option<V>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().value.clone())
    }

    /// The value as of the last observed write.
    pub fn current(&self) -> Option<V> {
        self.rx.borrow().value.clone()
    }
}
