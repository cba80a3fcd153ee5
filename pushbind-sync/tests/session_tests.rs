use async_trait::async_trait;
use pretty_assertions::assert_eq;
use pushbind_sync::{
    InMemorySessionStore, SessionError, SessionResult, SessionSnapshot, SessionStore, SyncConfig,
    SyncState,
};
use pushbind_types::Platform;
use std::time::Duration;

// ── InMemorySessionStore ─────────────────────────────────────────

#[tokio::test]
async fn fresh_store_has_no_user() {
    let store = InMemorySessionStore::new();
    assert_eq!(store.user_id().await.unwrap(), None);
    assert!(store.is_first_time().await.unwrap());
    assert_eq!(store.launch_count().await.unwrap(), 0);
}

#[tokio::test]
async fn first_app_start_adopts_pending_user() {
    let store = InMemorySessionStore::with_pending_user_id("user-1");
    store.handle_app_start().await.unwrap();

    let snapshot = store.snapshot().await.unwrap();
    assert_eq!(snapshot.user_id.as_deref(), Some("user-1"));
    assert!(!snapshot.is_first_time);
    assert_eq!(snapshot.launch_count, 1);
    assert!(snapshot.first_launch_at.is_some());
}

#[tokio::test]
async fn first_app_start_without_user_stays_fresh() {
    let store = InMemorySessionStore::new();
    store.handle_app_start().await.unwrap();
    assert_eq!(store.user_id().await.unwrap(), None);
    assert!(store.is_first_time().await.unwrap());
    assert_eq!(store.launch_count().await.unwrap(), 0);
}

#[tokio::test]
async fn later_app_starts_count_launches() {
    let store = InMemorySessionStore::with_pending_user_id("user-1");
    store.handle_app_start().await.unwrap();
    store.handle_app_start().await.unwrap();
    store.handle_app_start().await.unwrap();
    assert_eq!(store.launch_count().await.unwrap(), 3);
    assert_eq!(store.user_id().await.unwrap().as_deref(), Some("user-1"));
}

#[test]
fn snapshot_reads_host_json() {
    let snapshot: SessionSnapshot =
        serde_json::from_str(r#"{"userId":"u-9","isFirstTime":false,"launchCount":7}"#).unwrap();
    assert_eq!(snapshot.user_id.as_deref(), Some("u-9"));
    assert!(!snapshot.is_first_time);
    assert_eq!(snapshot.launch_count, 7);

    let empty: SessionSnapshot = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, SessionSnapshot::default());
}

// ── Default snapshot ─────────────────────────────────────────────

struct FieldStore {
    user_id: Option<String>,
}

#[async_trait]
impl SessionStore for FieldStore {
    async fn user_id(&self) -> SessionResult<Option<String>> {
        Ok(self.user_id.clone())
    }

    async fn is_first_time(&self) -> SessionResult<bool> {
        Ok(false)
    }

    async fn handle_app_start(&self) -> SessionResult<()> {
        Err(SessionError::Unavailable("read only".into()))
    }

    async fn launch_count(&self) -> SessionResult<i64> {
        Ok(2)
    }
}

#[tokio::test]
async fn default_snapshot_normalizes_user_id() {
    let store = FieldStore {
        user_id: Some("null".into()),
    };
    let snapshot = store.snapshot().await.unwrap();
    assert_eq!(snapshot.user_id, None);
    assert_eq!(snapshot.launch_count, 2);
    assert!(!snapshot.is_first_time);
}

// ── SyncConfig ───────────────────────────────────────────────────

#[test]
fn config_defaults() {
    let config = SyncConfig::default();
    assert_eq!(config.platform, Platform::Android);
    assert_eq!(config.identity_wait(), Duration::from_secs(10));
    assert_eq!(config.permission_wait(), Duration::from_secs(3));
    assert!(config.listen_for_late_identity);
    assert_eq!(config.locale, "en_US");
    assert_eq!(config.timezone, "UTC");
}

#[test]
fn warm_up_follows_platform_unless_set() {
    assert_eq!(
        SyncConfig::for_platform(Platform::Android).warm_up(),
        Duration::from_secs(3)
    );
    assert_eq!(
        SyncConfig::for_platform(Platform::Ios).warm_up(),
        Duration::from_secs(5)
    );

    let config = SyncConfig {
        warm_up_ms: Some(250),
        ..SyncConfig::for_platform(Platform::Ios)
    };
    assert_eq!(config.warm_up(), Duration::from_millis(250));
}

#[test]
fn config_accepts_partial_json() {
    let config: SyncConfig =
        serde_json::from_str(r#"{"app_key":"k-1","platform":"ios","identity_wait_ms":500}"#)
            .unwrap();
    assert_eq!(config.app_key, "k-1");
    assert_eq!(config.platform, Platform::Ios);
    assert_eq!(config.identity_wait_ms, 500);
    assert_eq!(config.permission_wait_ms, 3_000);
    assert_eq!(config.warm_up(), Duration::from_secs(5));
}

// ── SyncState ────────────────────────────────────────────────────

#[test]
fn state_serializes_with_reason() {
    let degraded = serde_json::to_value(SyncState::Degraded("no user id".into())).unwrap();
    assert_eq!(
        degraded,
        serde_json::json!({"state": "degraded", "reason": "no user id"})
    );
    let correlated = serde_json::to_value(SyncState::Correlated).unwrap();
    assert_eq!(correlated, serde_json::json!({"state": "correlated"}));
}

#[test]
fn state_display() {
    assert_eq!(SyncState::AwaitingIdentity.to_string(), "awaiting identity");
    assert_eq!(
        SyncState::Degraded("x".into()).to_string(),
        "degraded: x"
    );
}
