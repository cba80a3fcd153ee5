use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress of the current run's identity correlation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SyncState {
    NotStarted,
    AwaitingIdentity,
    Correlated,
    /// Correlation could not complete this run. Not fatal.
    Degraded(String),
}

impl SyncState {
    pub fn is_correlated(&self) -> bool {
        matches!(self, SyncState::Correlated)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, SyncState::Degraded(_))
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::NotStarted => f.write_str("not started"),
            SyncState::AwaitingIdentity => f.write_str("awaiting identity"),
            SyncState::Correlated => f.write_str("correlated"),
            SyncState::Degraded(reason) => write!(f, "degraded: {reason}"),
        }
    }
}
