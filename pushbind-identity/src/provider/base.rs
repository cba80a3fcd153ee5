use super::{IdentityListener, ProviderConfig, ProviderState};
use crate::cell::CellWatcher;
use crate::identity::{IdentityCells, IdentityKind, NotificationIdentity};
use crate::sdk::{PushSdk, SdkObserver};
use pushbind_types::{Deadline, Platform, normalize_id, normalize_id_ref};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State reachable from the listener watcher task.
struct Shared {
    cells: Arc<IdentityCells>,
    state: Mutex<ProviderState>,
    listener: Mutex<Option<IdentityListener>>,
    external_user_id: Mutex<Option<String>>,
    opted_in: AtomicBool,
}

impl Shared {
    fn identity(&self) -> NotificationIdentity {
        NotificationIdentity {
            push_subscription_id: self.cells.cell(IdentityKind::PushSubscriptionId).get(),
            native_user_id: self.cells.cell(IdentityKind::NativeUserId).get(),
            opted_in: self.opted_in.load(Ordering::Acquire),
            external_user_id: lock(&self.external_user_id).clone(),
        }
    }

    fn current(&self) -> Option<NotificationIdentity> {
        Some(self.identity()).filter(|identity| !identity.is_empty())
    }

    /// Moves to `Ready` when an identity is known. An `Unavailable` provider
    /// recovers this way when a late identity arrives.
    fn refresh_state(&self) -> Option<NotificationIdentity> {
        let identity = self.current();
        let mut state = lock(&self.state);
        match &identity {
            Some(identity) => *state = ProviderState::Ready(identity.clone()),
            None if matches!(*state, ProviderState::Initializing) => {
                *state = ProviderState::Unavailable;
            }
            None => {}
        }
        identity
    }
}

/// Behavior common to [`EmbeddedProvider`](super::EmbeddedProvider) and
/// [`HostedProvider`](super::HostedProvider).
pub(crate) struct ProviderCore {
    platform: Platform,
    config: ProviderConfig,
    sdk: Arc<dyn PushSdk>,
    shared: Arc<Shared>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl ProviderCore {
    pub(crate) fn new(
        platform: Platform,
        config: ProviderConfig,
        sdk: Arc<dyn PushSdk>,
        cells: Arc<IdentityCells>,
    ) -> Self {
        Self {
            platform,
            config,
            sdk,
            shared: Arc::new(Shared {
                cells,
                state: Mutex::new(ProviderState::Uninitialized),
                listener: Mutex::new(None),
                external_user_id: Mutex::new(None),
                opted_in: AtomicBool::new(false),
            }),
            watcher: Mutex::new(None),
        }
    }

    pub(crate) fn platform(&self) -> Platform {
        self.platform
    }

    pub(crate) fn state(&self) -> ProviderState {
        lock(&self.shared.state).clone()
    }

    fn set_state(&self, next: ProviderState) {
        *lock(&self.shared.state) = next;
    }

    /// Moves `Uninitialized` to `Initializing`. Returns false when
    /// initialization already started.
    fn begin_initialize(&self) -> bool {
        let mut state = lock(&self.shared.state);
        if matches!(*state, ProviderState::Uninitialized) {
            *state = ProviderState::Initializing;
            true
        } else {
            false
        }
    }

    /// Boots the SDK. Returns false when initialization already started or
    /// failed; failure leaves the provider `Unavailable`.
    pub(crate) fn initialize_sdk(&self, app_key: &str) -> bool {
        if !self.begin_initialize() {
            debug!(platform = %self.platform, "provider already initialized");
            return false;
        }
        let Some(app_key) = normalize_id_ref(Some(app_key)) else {
            warn!(platform = %self.platform, "Missing push app key, provider unavailable");
            self.set_state(ProviderState::Unavailable);
            return false;
        };
        if let Err(e) = self.sdk.initialize(&app_key) {
            warn!(platform = %self.platform, "Push SDK initialization failed: {}", e);
            self.set_state(ProviderState::Unavailable);
            return false;
        }
        info!(platform = %self.platform, "push SDK initialized");
        true
    }

    /// Routes SDK observer callbacks into the cells.
    pub(crate) fn observe_sdk(&self) {
        let cells = self.shared.cells.clone();
        let observer: SdkObserver = Arc::new(move |kind, value| {
            store_if_changed(&cells, kind, normalize_id(value));
        });
        if let Err(e) = self.sdk.observe(observer) {
            warn!(platform = %self.platform, "Failed to observe push SDK: {}", e);
        }
    }

    /// Copies whatever the SDK currently holds into the cells.
    pub(crate) fn pull(&self) {
        for kind in IdentityKind::ALL {
            match self.sdk.current_id(kind) {
                Ok(value) => store_if_changed(&self.shared.cells, kind, normalize_id(value)),
                Err(e) => debug!(platform = %self.platform, %kind, "SDK id lookup failed: {}", e),
            }
        }
    }

    pub(crate) fn current_identity(&self) -> Option<NotificationIdentity> {
        self.shared.current()
    }

    /// Waits for whichever identifier arrives first, bounded by `deadline`.
    async fn await_any(&self, deadline: Deadline) {
        let cells = &self.shared.cells;
        tokio::select! {
            _ = cells.cell(IdentityKind::PushSubscriptionId).await_until_deadline(deadline) => {}
            _ = cells.cell(IdentityKind::NativeUserId).await_until_deadline(deadline) => {}
        }
    }

    pub(crate) async fn fetch_identity_by(&self, deadline: Deadline) -> Option<NotificationIdentity> {
        self.await_any(deadline).await;
        let identity = self.shared.refresh_state();
        match &identity {
            Some(identity) => debug!(
                platform = %self.platform,
                push_subscription_id = ?identity.push_subscription_id,
                native_user_id = ?identity.native_user_id,
                "identity available"
            ),
            None => info!(platform = %self.platform, "no push identity before deadline"),
        }
        identity
    }

    pub(crate) async fn request_permission_by(&self, deadline: Deadline) -> bool {
        let deadline = deadline.capped(self.config.permission_wait);
        self.await_any(deadline).await;
        if !self.shared.cells.any_ready() {
            debug!(platform = %self.platform, "SDK not ready, requesting permission anyway");
        }

        let granted = match self.sdk.request_permission().await {
            Ok(granted) => granted,
            Err(e) => {
                warn!(platform = %self.platform, "Permission request failed: {}", e);
                false
            }
        };
        self.shared.opted_in.store(granted, Ordering::Release);
        info!(platform = %self.platform, granted, "notification permission resolved");
        granted
    }

    pub(crate) async fn request_permission(&self) -> bool {
        self.request_permission_by(Deadline::after(self.config.permission_wait))
            .await
    }

    pub(crate) fn set_consent(&self, granted: bool) {
        if let Err(e) = self.sdk.set_consent(granted) {
            warn!(platform = %self.platform, "Failed to record consent: {}", e);
        }
    }

    pub(crate) fn set_external_user_id(&self, external_id: &str) {
        let Some(external_id) = normalize_id_ref(Some(external_id)) else {
            warn!(platform = %self.platform, "Ignoring blank external user id");
            return;
        };
        match self.sdk.login(&external_id) {
            Ok(()) => {
                debug!(platform = %self.platform, %external_id, "external user id set");
                *lock(&self.shared.external_user_id) = Some(external_id);
            }
            Err(e) => warn!(platform = %self.platform, "Failed to set external user id: {}", e),
        }
    }

    pub(crate) fn add_tags(&self, tags: &BTreeMap<String, String>) {
        if tags.is_empty() {
            return;
        }
        if let Err(e) = self.sdk.add_tags(tags) {
            warn!(platform = %self.platform, "Failed to add tags: {}", e);
        }
    }

    pub(crate) fn remove_tags(&self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        if let Err(e) = self.sdk.remove_tags(keys) {
            warn!(platform = %self.platform, "Failed to remove tags: {}", e);
        }
    }

    pub(crate) fn listen(&self, on_change: IdentityListener) {
        *lock(&self.shared.listener) = Some(on_change);

        let mut watcher = lock(&self.watcher);
        if watcher.is_some() {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                // Subscribe before spawning so writes racing the first poll
                // are still observed.
                let cells = &self.shared.cells;
                let push = cells.cell(IdentityKind::PushSubscriptionId).subscribe();
                let native = cells.cell(IdentityKind::NativeUserId).subscribe();
                *watcher = Some(handle.spawn(watch_identity(self.shared.clone(), push, native)));
            }
            Err(_) => warn!(
                platform = %self.platform,
                "No async runtime; identity listener will not be notified"
            ),
        }
    }

    pub(crate) fn clear_listener(&self) {
        *lock(&self.shared.listener) = None;
        if let Some(task) = lock(&self.watcher).take() {
            task.abort();
        }
    }
}

impl Drop for ProviderCore {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.watcher).take() {
            task.abort();
        }
    }
}

fn store_if_changed(cells: &IdentityCells, kind: IdentityKind, value: Option<String>) {
    let Some(value) = value else {
        return;
    };
    let cell = cells.cell(kind);
    if cell.get().as_deref() != Some(value.as_str()) {
        cell.set(value);
    }
}

/// Fires the current listener after every identity write.
async fn watch_identity(
    shared: Arc<Shared>,
    mut push: CellWatcher<String>,
    mut native: CellWatcher<String>,
) {
    loop {
        let changed = tokio::select! {
            changed = push.changed() => changed,
            changed = native.changed() => changed,
        };
        if changed.is_none() {
            break;
        }
        let identity = shared.refresh_state();
        let listener = lock(&shared.listener).clone();
        if let Some(listener) = listener {
            listener(identity);
        }
    }
}
