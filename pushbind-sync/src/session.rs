//! The application's session store, as seen by the sync layer.

use crate::error::SessionResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pushbind_types::normalize_id;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub user_id: Option<String>,
    pub is_first_time: bool,
    pub launch_count: i64,
    pub first_launch_at: Option<DateTime<Utc>>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            user_id: None,
            is_first_time: true,
            launch_count: 0,
            first_launch_at: None,
        }
    }
}

/// External collaborator that owns the app's user session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn user_id(&self) -> SessionResult<Option<String>>;

    async fn is_first_time(&self) -> SessionResult<bool>;

    /// Runs the store's own start-of-app bookkeeping. May assign a user id.
    async fn handle_app_start(&self) -> SessionResult<()>;

    async fn launch_count(&self) -> SessionResult<i64>;

    async fn snapshot(&self) -> SessionResult<SessionSnapshot> {
        Ok(SessionSnapshot {
            user_id: normalize_id(self.user_id().await?),
            is_first_time: self.is_first_time().await?,
            launch_count: self.launch_count().await?,
            first_launch_at: None,
        })
    }
}

/// [`SessionStore`] held in memory.
///
/// On the first `handle_app_start` of a fresh session it adopts the
/// pending user id (if one was provided) and counts the first launch;
/// later starts only bump the launch count.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    snapshot: RwLock<SessionSnapshot>,
    pending_user_id: Option<String>,
}

impl InMemorySessionStore {
    /// A fresh session with no user id.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh session that receives `user_id` on its first app start.
    pub fn with_pending_user_id(user_id: impl Into<String>) -> Self {
        Self {
            snapshot: RwLock::new(SessionSnapshot::default()),
            pending_user_id: Some(user_id.into()),
        }
    }

    /// A session restored from `snapshot`.
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            pending_user_id: None,
        }
    }

    /// Replaces the session with one supplied by the host.
    pub async fn restore(&self, snapshot: SessionSnapshot) {
        *self.snapshot.write().await = snapshot;
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn user_id(&self) -> SessionResult<Option<String>> {
        Ok(self.snapshot.read().await.user_id.clone())
    }

    async fn is_first_time(&self) -> SessionResult<bool> {
        Ok(self.snapshot.read().await.is_first_time)
    }

    async fn handle_app_start(&self) -> SessionResult<()> {
        let mut snapshot = self.snapshot.write().await;
        if snapshot.is_first_time {
            match &self.pending_user_id {
                Some(user_id) => {
                    debug!(%user_id, "initializing first-time session");
                    snapshot.user_id = Some(user_id.clone());
                    snapshot.is_first_time = false;
                    snapshot.launch_count = 1;
                    snapshot.first_launch_at = Some(Utc::now());
                }
                None => debug!("no user id available for first-time session"),
            }
        } else {
            snapshot.launch_count += 1;
        }
        Ok(())
    }

    async fn launch_count(&self) -> SessionResult<i64> {
        Ok(self.snapshot.read().await.launch_count)
    }

    async fn snapshot(&self) -> SessionResult<SessionSnapshot> {
        Ok(self.snapshot.read().await.clone())
    }
}
