use super::base::ProviderCore;
use super::{IdentityListener, NotificationIdentityProvider, ProviderConfig, ProviderState};
use crate::bridge::CrossRuntimeBridge;
use crate::identity::NotificationIdentity;
use crate::sdk::PushSdk;
use async_trait::async_trait;
use pushbind_types::{Deadline, Platform};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Provider for builds where the push SDK lives in the native host.
///
/// Identities arrive only through [`CrossRuntimeBridge::report_identity`];
/// reads never call into the host. Commands (login, tags, permission) go
/// to `host`, a [`PushSdk`] backed by the host's command channel.
pub struct HostedProvider {
    core: ProviderCore,
}

impl HostedProvider {
    pub fn new(bridge: &CrossRuntimeBridge, host: Arc<dyn PushSdk>) -> Self {
        Self::with_config(bridge, host, ProviderConfig::default())
    }

    pub fn with_config(
        bridge: &CrossRuntimeBridge,
        host: Arc<dyn PushSdk>,
        config: ProviderConfig,
    ) -> Self {
        Self {
            core: ProviderCore::new(Platform::Ios, config, host, bridge.cells()),
        }
    }
}

#[async_trait]
impl NotificationIdentityProvider for HostedProvider {
    fn platform(&self) -> Platform {
        self.core.platform()
    }

    fn state(&self) -> ProviderState {
        self.core.state()
    }

    fn initialize(&self, app_key: &str) {
        if self.core.initialize_sdk(app_key) {
            debug!("waiting for host to report push identities");
            self.core.pull();
        }
    }

    fn current_identity(&self) -> Option<NotificationIdentity> {
        self.core.current_identity()
    }

    async fn fetch_identity_by(&self, deadline: Deadline) -> Option<NotificationIdentity> {
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
