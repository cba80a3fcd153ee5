//! Absolute deadlines.
//!
//! A bounded wait can be expressed either as a relative ceiling or as a
//! [`Deadline`]. Threading one `Deadline` through nested waits keeps the
//! total wait bounded even when several waits run back to back.

use std::time::Duration;
use tokio::time::Instant;

/// A point in time after which a bounded wait gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Deadline(Instant);

impl Deadline {
    /// A deadline `wait` from now.
    pub fn after(wait: Duration) -> Self {
        Self(Instant::now() + wait)
    }

    /// A deadline at a fixed instant.
    pub fn at(instant: Instant) -> Self {
        Self(instant)
    }

    /// The underlying instant.
    pub fn instant(&self) -> Instant {
        self.0
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.0.saturating_duration_since(Instant::now())
    }

    /// Whether the deadline has passed.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.0
    }

    /// The earlier of `self` and a fresh ceiling of `max_wait` from now.
    pub fn capped(self, max_wait: Duration) -> Self {
        self.min(Self::after(max_wait))
    }
}
