//! Backend registration of the push identity.

use crate::config::SyncConfig;
use crate::error::RegistrationResult;
use async_trait::async_trait;
use pushbind_identity::NotificationIdentity;
use pushbind_net::{ApiClient, FailureKind, PushRegistration, ResultEnvelope};
use pushbind_types::{CancelToken, Cancelled, Platform, normalize_id};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Auth token and last-registered id, persisted by the app.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn access_token(&self) -> RegistrationResult<Option<String>>;

    async fn registered_push_id(&self) -> RegistrationResult<Option<String>>;

    async fn set_registered_push_id(&self, push_id: &str) -> RegistrationResult<()>;
}

#[derive(Debug, Default)]
struct Registration {
    access_token: Option<String>,
    push_id: Option<String>,
}

/// [`RegistrationStore`] held in memory.
#[derive(Debug, Default)]
pub struct InMemoryRegistrationStore {
    inner: RwLock<Registration>,
}

impl InMemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_access_token(token: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(Registration {
                access_token: Some(token.into()),
                push_id: None,
            }),
        }
    }

    /// Replaces the access token. Never blocks on a runtime, so hosts may
    /// call it from any thread.
    pub fn set_access_token(&self, token: Option<String>) {
        self.write().access_token = token;
    }

    fn read(&self) -> RwLockReadGuard<'_, Registration> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registration> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn access_token(&self) -> RegistrationResult<Option<String>> {
        Ok(self.read().access_token.clone())
    }

    async fn registered_push_id(&self) -> RegistrationResult<Option<String>> {
        Ok(self.read().push_id.clone())
    }

    async fn set_registered_push_id(&self, push_id: &str) -> RegistrationResult<()> {
        self.write().push_id = Some(push_id.to_string());
        Ok(())
    }
}

/// What a registration attempt did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RegistrationOutcome {
    /// The backend accepted the id and it was recorded.
    Registered,
    /// The id matches the last registered one; nothing was sent.
    Unchanged,
    /// No access token yet; nothing was sent.
    NoAccessToken,
    /// The identity carries no usable id.
    NoIdentity,
    /// The backend answered with a non-2xx status.
    Rejected { code: u16 },
    /// The call failed before the backend answered.
    Failed { kind: FailureKind },
}

/// Registers push identities with the backend, skipping redundant calls.
pub struct PushRegistrar {
    api: ApiClient,
    store: Arc<dyn RegistrationStore>,
    platform: Platform,
    locale: String,
    timezone: String,
}

impl PushRegistrar {
    pub fn new(api: ApiClient, store: Arc<dyn RegistrationStore>, config: &SyncConfig) -> Self {
        Self {
            api,
            store,
            platform: config.platform,
            locale: config.locale.clone(),
            timezone: config.timezone.clone(),
        }
    }

    /// The id recorded by the last successful registration.
    pub async fn registered_push_id(&self) -> Option<String> {
        match self.store.registered_push_id().await {
            Ok(push_id) => push_id,
            Err(e) => {
                warn!("Failed to read registered push id: {}", e);
                None
            }
        }
    }

    /// Registers `identity` unless it is already registered or the user is
    /// not authenticated yet. Only cancellation is returned as an error.
    pub async fn register(
        &self,
        identity: &NotificationIdentity,
        token: &CancelToken,
    ) -> Result<RegistrationOutcome, Cancelled> {
        let Some(push_id) = identity.registration_id() else {
            return Ok(RegistrationOutcome::NoIdentity);
        };

        if self.registered_push_id().await.as_deref() == Some(push_id) {
            debug!(%push_id, "push id already registered");
            return Ok(RegistrationOutcome::Unchanged);
        }

        let access_token = match self.store.access_token().await {
            Ok(access_token) => normalize_id(access_token),
            Err(e) => {
                warn!("Failed to read access token: {}", e);
                None
            }
        };
        let Some(access_token) = access_token else {
            info!("no access token, deferring push registration");
            return Ok(RegistrationOutcome::NoAccessToken);
        };

        let request = PushRegistration {
            player_id: push_id.to_string(),
            platform: self.platform.slug().to_string(),
            locale: Some(self.locale.clone()),
            timezone: Some(self.timezone.clone()),
        };
        let envelope = token
            .run(self.api.register_push(&request, &access_token))
            .await??;

        let outcome = match envelope {
            ResultEnvelope::Success(_) => {
                if let Err(e) = self.store.set_registered_push_id(push_id).await {
                    warn!("Failed to record registered push id: {}", e);
                }
                info!(platform = %self.platform, "push id registered with backend");
                RegistrationOutcome::Registered
            }
            ResultEnvelope::ApplicationError { code: 401, .. } => {
                warn!("Push registration unauthorized, access token may be expired");
                RegistrationOutcome::Rejected { code: 401 }
            }
            ResultEnvelope::ApplicationError { code, message } => {
                warn!(status = code, "Push registration rejected: {:?}", message);
                RegistrationOutcome::Rejected { code }
            }
            ResultEnvelope::TransportFailure { kind, detail } => {
                warn!(?kind, "Push registration failed: {:?}", detail);
                RegistrationOutcome::Failed { kind }
            }
        };
        Ok(outcome)
    }
}
