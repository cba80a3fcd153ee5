//! Per-platform notification identity providers.
//!
//! Both variants expose the same capability surface. They differ only in
//! where the push SDK lives:
//!
//! - [`EmbeddedProvider`] drives an SDK linked into this process and feeds
//!   its observer callbacks into local cells.
//! - [`HostedProvider`] reads cells the native host fills through the
//!   [`CrossRuntimeBridge`](crate::CrossRuntimeBridge), and forwards
//!   commands to a host-backed [`PushSdk`](crate::PushSdk).
//!
//! No provider operation surfaces an error to its caller. SDK failures are
//! logged and degrade to "no value".

mod base;
mod embedded;
mod hosted;

pub use embedded::EmbeddedProvider;
pub use hosted::HostedProvider;

use crate::identity::NotificationIdentity;
use async_trait::async_trait;
use pushbind_types::{Deadline, Platform};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Called with the latest identity whenever either identifier changes.
pub type IdentityListener = Arc<dyn Fn(Option<NotificationIdentity>) + Send + Sync>;

/// Lifecycle of a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderState {
    Uninitialized,
    Initializing,
    Ready(NotificationIdentity),
    /// Initialization failed or no identity arrived before a deadline.
    Unavailable,
}

/// Tunables shared by both provider variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Ceiling on the readiness wait before prompting for permission.
    pub permission_wait: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            permission_wait: Duration::from_secs(3),
        }
    }
}

/// Capability surface over a push SDK whose identifiers arrive late.
#[async_trait]
pub trait NotificationIdentityProvider: Send + Sync {
    /// The platform this provider serves.
    fn platform(&self) -> Platform;

    fn state(&self) -> ProviderState;

    /// Starts SDK initialization. Returns immediately; failures are logged
    /// and move the provider to [`ProviderState::Unavailable`].
    fn initialize(&self, app_key: &str);

    /// The identity known right now, without waiting.
    fn current_identity(&self) -> Option<NotificationIdentity>;

    /// Waits until `deadline` for either identifier.
    async fn fetch_identity_by(&self, deadline: Deadline) -> Option<NotificationIdentity>;

    /// Waits up to `max_wait` for either identifier. `None` after the
    /// ceiling means "not yet assigned", not a failure.
    async fn fetch_identity(&self, max_wait: Duration) -> Option<NotificationIdentity> {
        self.fetch_identity_by(Deadline::after(max_wait)).await
    }

    /// Prompts for notification permission once the SDK is ready or the
    /// readiness wait (capped by `deadline`) runs out.
    async fn request_permission_by(&self, deadline: Deadline) -> bool;

    /// [`request_permission_by`](Self::request_permission_by) bounded only
    /// by the configured readiness wait.
    async fn request_permission(&self) -> bool;

    fn set_consent(&self, granted: bool);

    /// Associates this install with the application's user id.
    fn set_external_user_id(&self, external_id: &str);

    /// Upserts segmentation tags.
    fn add_tags(&self, tags: &BTreeMap<String, String>);

    fn remove_tags(&self, keys: &[String]);

    /// Installs `on_change` as the single identity listener, replacing any
    /// previous one.
    fn listen(&self, on_change: IdentityListener);

    fn clear_listener(&self);
}
