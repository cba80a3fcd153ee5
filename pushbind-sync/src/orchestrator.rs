//! One correlation run per app start.

use crate::config::SyncConfig;
use crate::registration::{PushRegistrar, RegistrationOutcome};
use crate::session::SessionStore;
use crate::state::SyncState;
use crate::tags::session_tags;
use pushbind_identity::{IdentityListener, NotificationIdentity, NotificationIdentityProvider};
use pushbind_types::{CancelToken, Cancelled, Deadline, normalize_id};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Drives the provider, session store and registrar through one
/// best-effort correlation.
///
/// Every step swallows and logs its own failures. The only error a run
/// returns is [`Cancelled`], and cancellation leaves the published
/// [`SyncState`] where it was.
pub struct SyncOrchestrator {
    run_id: Uuid,
    config: SyncConfig,
    provider: Arc<dyn NotificationIdentityProvider>,
    session: Arc<dyn SessionStore>,
    registrar: Arc<PushRegistrar>,
    state: watch::Sender<SyncState>,
    cancel: CancelToken,
    started: AtomicBool,
    user_id: Mutex<Option<String>>,
}

impl SyncOrchestrator {
    pub fn new(
        config: SyncConfig,
        provider: Arc<dyn NotificationIdentityProvider>,
        session: Arc<dyn SessionStore>,
        registrar: Arc<PushRegistrar>,
    ) -> Self {
        let (state, _rx) = watch::channel(SyncState::NotStarted);
        Self {
            run_id: Uuid::now_v7(),
            config,
            provider,
            session,
            registrar,
            state,
            cancel: CancelToken::new(),
            started: AtomicBool::new(false),
            user_id: Mutex::new(None),
        }
    }

    /// Time-ordered id of this app run, attached to sync log lines.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn state(&self) -> SyncState {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    /// Token that cancels this orchestrator's run and late correlation.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn provider(&self) -> &Arc<dyn NotificationIdentityProvider> {
        &self.provider
    }

    /// Runs the correlation on the current runtime.
    pub fn spawn(self: &Arc<Self>) -> OrchestratorHandle {
        let orchestrator = self.clone();
        OrchestratorHandle {
            state: self.subscribe_state(),
            cancel: self.cancel.clone(),
            task: tokio::spawn(async move { orchestrator.run().await }),
        }
    }

    /// Performs the correlation run. A second call returns the current
    /// state without doing anything.
    pub async fn run(self: &Arc<Self>) -> Result<SyncState, Cancelled> {
        if self.started.swap(true, Ordering::AcqRel) {
            debug!("sync already started for this run");
            return Ok(self.state());
        }
        let token = &self.cancel;

        info!(run_id = %self.run_id, platform = %self.config.platform, "starting push identity sync");
        self.provider.initialize(&self.config.app_key);
        self.set_state(SyncState::AwaitingIdentity);

        token.run(tokio::time::sleep(self.config.warm_up())).await?;

        let Some(user_id) = self.resolve_user_id().await else {
            self.set_state(SyncState::Degraded("no user id".to_string()));
            return Ok(self.state());
        };
        *self.user_id.lock().unwrap_or_else(PoisonError::into_inner) = Some(user_id.clone());

        let deadline = Deadline::after(self.config.identity_wait());
        let identity = token.run(self.provider.fetch_identity_by(deadline)).await?;

        match identity {
            Some(identity) => self.correlate(&user_id, &identity).await?,
            None => {
                info!("no push identity yet, correlation degraded");
                self.set_state(SyncState::Degraded("no push identity".to_string()));
                if self.config.listen_for_late_identity {
                    self.listen_for_late_identity(user_id);
                }
            }
        }
        Ok(self.state())
    }

    /// Re-registers the current identity when it differs from the last
    /// registered one.
    pub async fn refresh_registration(&self) -> Result<RegistrationOutcome, Cancelled> {
        let Some(identity) = self.provider.current_identity() else {
            debug!("no current push identity to refresh");
            return Ok(RegistrationOutcome::NoIdentity);
        };
        self.registrar.register(&identity, &self.cancel).await
    }

    /// Prompts for notification permission and, when granted, runs a
    /// correlation pass with the identity the provider then holds.
    ///
    /// The readiness wait and the identity wait share one deadline.
    pub async fn request_permission_and_register(&self) -> Result<bool, Cancelled> {
        let token = &self.cancel;
        let deadline = Deadline::after(self.config.identity_wait());
        let granted = token
            .run(self.provider.request_permission_by(deadline))
            .await?;
        if !granted {
            info!("notification permission denied");
            return Ok(false);
        }

        let Some(user_id) = self.known_user_id().await else {
            self.set_state(SyncState::Degraded("no user id".to_string()));
            return Ok(true);
        };
        match token.run(self.provider.fetch_identity_by(deadline)).await? {
            Some(identity) => self.correlate(&user_id, &identity).await?,
            None => debug!("permission granted but no push identity yet"),
        }
        Ok(true)
    }

    async fn known_user_id(&self) -> Option<String> {
        let cached = self
            .user_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match cached {
            Some(user_id) => Some(user_id),
            None => self.resolve_user_id().await,
        }
    }

    /// Reads the user id, running the store's app-start bookkeeping and
    /// reading once more when it is missing.
    async fn resolve_user_id(&self) -> Option<String> {
        if let Some(user_id) = self.read_user_id().await {
            return Some(user_id);
        }
        if let Err(e) = self.session.handle_app_start().await {
            warn!("Session app-start handling failed: {}", e);
        }
        let user_id = self.read_user_id().await;
        if user_id.is_none() {
            info!("no user id after session init, skipping correlation");
        }
        user_id
    }

    async fn read_user_id(&self) -> Option<String> {
        match self.session.user_id().await {
            Ok(user_id) => normalize_id(user_id),
            Err(e) => {
                warn!("Failed to read user id: {}", e);
                None
            }
        }
    }

    async fn correlate(
        &self,
        user_id: &str,
        identity: &NotificationIdentity,
    ) -> Result<(), Cancelled> {
        if self.cancel.is_cancelled() {
            return Err(Cancelled);
        }
        debug!(%user_id, push_id = ?identity.registration_id(), "correlating identity");
        self.provider.set_external_user_id(user_id);

        match self.session.snapshot().await {
            Ok(snapshot) => self
                .provider
                .add_tags(&session_tags(&snapshot, self.provider.platform())),
            Err(e) => warn!("Failed to read session for tags: {}", e),
        }
        self.set_state(SyncState::Correlated);

        let outcome = self.registrar.register(identity, &self.cancel).await?;
        debug!(?outcome, "push registration finished");
        Ok(())
    }

    /// Installs a fire-once listener that completes correlation when an
    /// identity shows up after the bounded wait. Cancelling the token
    /// removes the listener and drops any identity not yet correlated.
    fn listen_for_late_identity(self: &Arc<Self>, user_id: String) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime, cannot listen for late identity");
            return;
        };
        let (tx, rx) = oneshot::channel::<NotificationIdentity>();
        let slot = Mutex::new(Some(tx));
        let cancel = self.cancel.clone();

        let on_change: IdentityListener = Arc::new(move |identity| {
            let Some(identity) = identity.filter(|identity| !identity.is_empty()) else {
                return;
            };
            if cancel.is_cancelled() {
                return;
            }
            if let Some(tx) = slot.lock().unwrap_or_else(PoisonError::into_inner).take() {
                let _ = tx.send(identity);
            }
        });

        let orchestrator = Arc::downgrade(self);
        let cancel = self.cancel.clone();
        runtime.spawn(async move {
            let identity = match cancel.run(rx).await {
                Ok(Ok(identity)) => identity,
                // Listener replaced or cleared elsewhere.
                Ok(Err(_)) => return,
                Err(Cancelled) => {
                    if let Some(orchestrator) = orchestrator.upgrade() {
                        orchestrator.provider.clear_listener();
                    }
                    debug!("late correlation cancelled");
                    return;
                }
            };
            let Some(orchestrator) = orchestrator.upgrade() else {
                return;
            };
            info!("late push identity arrived");
            orchestrator.provider.clear_listener();
            if orchestrator.correlate(&user_id, &identity).await.is_err() {
                debug!("late correlation cancelled");
            }
        });

        self.provider.listen(on_change.clone());
        // An identity may have landed between the deadline and `listen`.
        if let Some(identity) = self.provider.current_identity() {
            on_change(Some(identity));
        }
    }

    fn set_state(&self, next: SyncState) {
        let previous = self.state.send_replace(next.clone());
        if previous != next {
            info!(run_id = %self.run_id, from = %previous, to = %next, "sync state changed");
        }
    }
}

/// Handle to a spawned correlation run.
pub struct OrchestratorHandle {
    task: JoinHandle<Result<SyncState, Cancelled>>,
    cancel: CancelToken,
    state: watch::Receiver<SyncState>,
}

impl OrchestratorHandle {
    pub fn state(&self) -> SyncState {
        self.state.borrow().clone()
    }

    /// Cancels the run and any pending late correlation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the run to finish.
    pub async fn wait(self) -> Result<SyncState, Cancelled> {
        match self.task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(Cancelled),
            Err(e) => {
                warn!("Sync task failed: {}", e);
                Ok(self.state.borrow().clone())
            }
        }
    }
}
