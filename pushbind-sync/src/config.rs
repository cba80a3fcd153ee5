use pushbind_identity::ProviderConfig;
use pushbind_types::Platform;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default ceiling on the identity wait.
pub const DEFAULT_IDENTITY_WAIT_MS: u64 = 10_000;
/// Default ceiling on the readiness wait before a permission prompt.
pub const DEFAULT_PERMISSION_WAIT_MS: u64 = 3_000;

/// Configuration for the sync orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Push service application key.
    pub app_key: String,
    /// Host platform. Picks the warm-up default and the platform tag.
    pub platform: Platform,
    /// Delay before the first session read. Platform default when unset.
    pub warm_up_ms: Option<u64>,
    pub identity_wait_ms: u64,
    pub permission_wait_ms: u64,
    /// Keep listening for an identity that arrives after the wait.
    pub listen_for_late_identity: bool,
    /// Locale sent with the backend registration.
    pub locale: String,
    /// Timezone sent with the backend registration.
    pub timezone: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::for_platform(Platform::Android)
    }
}

impl SyncConfig {
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            app_key: String::new(),
            platform,
            warm_up_ms: None,
            identity_wait_ms: DEFAULT_IDENTITY_WAIT_MS,
            permission_wait_ms: DEFAULT_PERMISSION_WAIT_MS,
            listen_for_late_identity: true,
            locale: "en_US".to_string(),
            timezone: "UTC".to_string(),
        }
    }

    pub fn with_app_key(mut self, app_key: impl Into<String>) -> Self {
        self.app_key = app_key.into();
        self
    }

    pub fn warm_up(&self) -> Duration {
        self.warm_up_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.platform.default_warm_up())
    }

    pub fn identity_wait(&self) -> Duration {
        Duration::from_millis(self.identity_wait_ms)
    }

    pub fn permission_wait(&self) -> Duration {
        Duration::from_millis(self.permission_wait_ms)
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            permission_wait: self.permission_wait(),
        }
    }
}
