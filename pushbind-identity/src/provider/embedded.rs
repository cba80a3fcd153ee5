use super::base::ProviderCore;
use super::{IdentityListener, NotificationIdentityProvider, ProviderConfig, ProviderState};
use crate::identity::{IdentityCells, NotificationIdentity};
use crate::sdk::PushSdk;
use async_trait::async_trait;
use pushbind_types::{Deadline, Platform};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Provider for builds where the push SDK is linked into this process.
///
/// SDK observer callbacks and direct reads both land in cells owned by the
/// provider.
pub struct EmbeddedProvider {
    core: ProviderCore,
}

impl EmbeddedProvider {
    pub fn new(sdk: Arc<dyn PushSdk>) -> Self {
        Self::with_config(sdk, ProviderConfig::default())
    }

    pub fn with_config(sdk: Arc<dyn PushSdk>, config: ProviderConfig) -> Self {
        Self {
            core: ProviderCore::new(
                Platform::Android,
                config,
                sdk,
                Arc::new(IdentityCells::new()),
            ),
        }
    }
}

#[async_trait]
impl NotificationIdentityProvider for EmbeddedProvider {
    fn platform(&self) -> Platform {
        self.core.platform()
    }

    fn state(&self) -> ProviderState {
        self.core.state()
    }

    fn initialize(&self, app_key: &str) {
        if self.core.initialize_sdk(app_key) {
            self.core.observe_sdk();
            self.core.pull();
        }
    }

    fn current_identity(&self) -> Option<NotificationIdentity> {
        self.core.pull();
        self.core.current_identity()
    }

    async fn fetch_identity_by(&self, deadline: Deadline) -> Option<NotificationIdentity> {
        self.core.pull();
        self.core.fetch_identity_by(deadline).await
    }

    async fn request_permission_by(&self, deadline: Deadline) -> bool {
        self.core.request_permission_by(deadline).await
    }

    async fn request_permission(&self) -> bool {
        self.core.request_permission().await
    }

    fn set_consent(&self, granted: bool) {
        self.core.set_consent(granted);
    }

    fn set_external_user_id(&self, external_id: &str) {
        self.core.set_external_user_id(external_id);
    }

    fn add_tags(&self, tags: &BTreeMap<String, String>) {
        self.core.add_tags(tags);
    }

    fn remove_tags(&self, keys: &[String]) {
        self.core.remove_tags(keys);
    }

    fn listen(&self, on_change: IdentityListener) {
        self.core.listen(on_change);
    }

    fn clear_listener(&self) {
        self.core.clear_listener();
    }
}
