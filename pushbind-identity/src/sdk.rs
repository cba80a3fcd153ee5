//! Pass-through to the third-party push SDK.
//!
//! Implementations do no caching or policy of their own; providers layer
//! readiness, bounded waits and error absorption on top.

use crate::error::SdkResult;
use crate::identity::IdentityKind;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Callback the SDK fires from its own thread when an identifier changes.
pub type SdkObserver = Arc<dyn Fn(IdentityKind, Option<String>) + Send + Sync>;

/// The push SDK surface pushbind drives.
#[async_trait]
pub trait PushSdk: Send + Sync {
    /// Boots the SDK with the application key.
    fn initialize(&self, app_key: &str) -> SdkResult<()>;

    /// Registers an observer for identifier changes. SDKs without change
    /// notification may leave this as a no-op and rely on
    /// [`current_id`](Self::current_id).
    fn observe(&self, observer: SdkObserver) -> SdkResult<()> {
        let _ = observer;
        Ok(())
    }

    /// The identifier the SDK currently holds, if any.
    fn current_id(&self, kind: IdentityKind) -> SdkResult<Option<String>> {
        let _ = kind;
        Ok(None)
    }

    /// Shows the OS permission prompt. Resolves to whether the user opted in.
    async fn request_permission(&self) -> SdkResult<bool>;

    /// Records the user's privacy consent.
    fn set_consent(&self, granted: bool) -> SdkResult<()>;

    /// Associates this install with the application's user id.
    fn login(&self, external_id: &str) -> SdkResult<()>;

    /// Upserts segmentation tags.
    fn add_tags(&self, tags: &BTreeMap<String, String>) -> SdkResult<()>;

    /// Removes segmentation tags by key.
    fn remove_tags(&self, keys: &[String]) -> SdkResult<()>;
}

/// In-memory SDK for tests.
pub mod mock {
    use super::*;
    use crate::error::SdkError;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    /// A call observed by [`MockPushSdk`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SdkCall {
        Initialize(String),
        Observe,
        RequestPermission,
        SetConsent(bool),
        Login(String),
        AddTags(BTreeMap<String, String>),
        RemoveTags(Vec<String>),
    }

    #[derive(Default)]
    struct MockState {
        calls: Vec<SdkCall>,
        tags: BTreeMap<String, String>,
        ids: BTreeMap<&'static str, String>,
        observer: Option<SdkObserver>,
        initialized: bool,
        external_id: Option<String>,
    }

    /// Scriptable [`PushSdk`] that records every call.
    ///
    /// Tags behave additively: `add_tags` upserts, `remove_tags` deletes.
    pub struct MockPushSdk {
        state: Mutex<MockState>,
        grant_permission: bool,
        failure: Option<SdkError>,
    }

    impl MockPushSdk {
        pub fn new() -> Self {
            Self {
                state: Mutex::new(MockState::default()),
                grant_permission: true,
                failure: None,
            }
        }

        /// Makes `request_permission` resolve to `granted`.
        pub fn with_permission(mut self, granted: bool) -> Self {
            self.grant_permission = granted;
            self
        }

        /// Makes every call fail with `error`.
        pub fn failing(mut self, error: SdkError) -> Self {
            self.failure = Some(error);
            self
        }

        /// Seeds the value `current_id` returns for `kind`.
        pub fn with_id(self, kind: IdentityKind, value: &str) -> Self {
            self.lock().ids.insert(kind.as_str(), value.to_string());
            self
        }

        /// Simulates the SDK assigning an identifier: updates `current_id`
        /// and fires the registered observer.
        pub fn emit(&self, kind: IdentityKind, value: Option<&str>) {
            let observer = {
                let mut state = self.lock();
                match value {
                    Some(v) => state.ids.insert(kind.as_str(), v.to_string()),
                    None => state.ids.remove(kind.as_str()),
                };
                state.observer.clone()
            };
            if let Some(observer) = observer {
                observer(kind, value.map(str::to_string));
            }
        }

        pub fn calls(&self) -> Vec<SdkCall> {
            self.lock().calls.clone()
        }

        pub fn tags(&self) -> BTreeMap<String, String> {
            self.lock().tags.clone()
        }

        pub fn external_id(&self) -> Option<String> {
            self.lock().external_id.clone()
        }

        pub fn is_initialized(&self) -> bool {
            self.lock().initialized
        }

        fn lock(&self) -> MutexGuard<'_, MockState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        fn record(&self, call: SdkCall) -> SdkResult<MutexGuard<'_, MockState>> {
            let mut state = self.lock();
            state.calls.push(call);
            match &self.failure {
                Some(err) => Err(err.clone()),
                None => Ok(state),
            }
        }
    }

    impl Default for MockPushSdk {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl PushSdk for MockPushSdk {
        fn initialize(&self, app_key: &str) -> SdkResult<()> {
            let mut state = self.record(SdkCall::Initialize(app_key.to_string()))?;
            state.initialized = true;
            Ok(())
        }

        fn observe(&self, observer: SdkObserver) -> SdkResult<()> {
            let mut state = self.record(SdkCall::Observe)?;
            state.observer = Some(observer);
            Ok(())
        }

        fn current_id(&self, kind: IdentityKind) -> SdkResult<Option<String>> {
            Ok(self.lock().ids.get(kind.as_str()).cloned())
        }

        async fn request_permission(&self) -> SdkResult<bool> {
            self.record(SdkCall::RequestPermission)?;
            Ok(self.grant_permission)
        }

        fn set_consent(&self, granted: bool) -> SdkResult<()> {
            self.record(SdkCall::SetConsent(granted))?;
            Ok(())
        }

        fn login(&self, external_id: &str) -> SdkResult<()> {
            let mut state = self.record(SdkCall::Login(external_id.to_string()))?;
            state.external_id = Some(external_id.to_string());
            Ok(())
        }

        fn add_tags(&self, tags: &BTreeMap<String, String>) -> SdkResult<()> {
            let mut state = self.record(SdkCall::AddTags(tags.clone()))?;
            state
                .tags
                .extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
            Ok(())
        }

        fn remove_tags(&self, keys: &[String]) -> SdkResult<()> {
            let mut state = self.record(SdkCall::RemoveTags(keys.to_vec()))?;
            for key in keys {
                state.tags.remove(key);
            }
            Ok(())
        }
    }
}
