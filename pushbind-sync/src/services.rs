//! Composition root.
//!
//! Process-wide objects are built once here at startup and live for the
//! rest of the process. Nothing in the workspace reaches them through
//! statics; the C boundary keeps its own single handle to a `Services`.

use crate::config::SyncConfig;
use crate::orchestrator::SyncOrchestrator;
use crate::registration::{PushRegistrar, RegistrationStore};
use crate::session::SessionStore;
use pushbind_identity::{
    CrossRuntimeBridge, EmbeddedProvider, HostedProvider, NotificationIdentityProvider, PushSdk,
};
use pushbind_net::ApiClient;
use pushbind_types::Platform;
use std::sync::Arc;

/// The app-side collaborators every variant needs.
pub struct Collaborators {
    pub api: ApiClient,
    pub session: Arc<dyn SessionStore>,
    pub registrations: Arc<dyn RegistrationStore>,
}

/// The wired object graph.
pub struct Services {
    /// Present for hosted builds, where the native host reports identities.
    pub bridge: Option<CrossRuntimeBridge>,
    pub provider: Arc<dyn NotificationIdentityProvider>,
    pub session: Arc<dyn SessionStore>,
    pub registrar: Arc<PushRegistrar>,
    pub orchestrator: Arc<SyncOrchestrator>,
}

impl Services {
    /// Push SDK linked into this process.
    pub fn android(config: SyncConfig, sdk: Arc<dyn PushSdk>, deps: Collaborators) -> Self {
        let config = SyncConfig {
            platform: Platform::Android,
            ..config
        };
        let provider = Arc::new(EmbeddedProvider::with_config(sdk, config.provider_config()));
        Self::assemble(config, None, provider, deps)
    }

    /// Push SDK owned by the native host. `host` carries commands back to it.
    pub fn hosted(config: SyncConfig, host: Arc<dyn PushSdk>, deps: Collaborators) -> Self {
        let config = SyncConfig {
            platform: Platform::Ios,
            ..config
        };
        let bridge = CrossRuntimeBridge::new();
        let provider = Arc::new(HostedProvider::with_config(
            &bridge,
            host,
            config.provider_config(),
        ));
        Self::assemble(config, Some(bridge), provider, deps)
    }

    fn assemble(
        config: SyncConfig,
        bridge: Option<CrossRuntimeBridge>,
        provider: Arc<dyn NotificationIdentityProvider>,
        deps: Collaborators,
    ) -> Self {
        let registrar = Arc::new(PushRegistrar::new(deps.api, deps.registrations, &config));
        let orchestrator = Arc::new(SyncOrchestrator::new(
            config,
            provider.clone(),
            deps.session.clone(),
            registrar.clone(),
        ));
        Self {
            bridge,
            provider,
            session: deps.session,
            registrar,
            orchestrator,
        }
    }
}
