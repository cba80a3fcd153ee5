//! Core → host command channel.
//!
//! The native host owns the push SDK. It hands pushbind a table of C
//! callbacks; [`HostSdk`] adapts that table to [`PushSdk`] so providers
//! drive the host exactly as they would an in-process SDK.

use async_trait::async_trait;
use pushbind_identity::{IdentityKind, PushSdk, SdkError, SdkObserver, SdkResult};
use std::collections::BTreeMap;
use std::ffi::{CString, c_char};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// A host callback taking one UTF-8 string. Returns false on failure.
pub type HostStrFn = unsafe extern "C" fn(value: *const c_char) -> bool;

/// Callback table registered by the native host.
///
/// Unset entries make the matching command fail with "unavailable".
/// `request_permission` must return immediately; the host reports the
/// user's answer later through `pushbind_complete_permission`. An answer
/// that does not arrive within the configured wait counts as denied.
#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct PushbindHostCallbacks {
    pub initialize: Option<HostStrFn>,
    pub login: Option<HostStrFn>,
    /// Receives a JSON object of tag key to value.
    pub add_tags: Option<HostStrFn>,
    /// Receives a JSON array of tag keys.
    pub remove_tags: Option<HostStrFn>,
    pub set_consent: Option<unsafe extern "C" fn(granted: bool) -> bool>,
    pub request_permission: Option<unsafe extern "C" fn()>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// [`PushSdk`] backed by host callbacks.
pub(crate) struct HostSdk {
    callbacks: RwLock<PushbindHostCallbacks>,
    observer: Mutex<Option<SdkObserver>>,
    pending_permission: Mutex<Option<oneshot::Sender<bool>>>,
    permission_timeout: Duration,
}

impl HostSdk {
    pub(crate) fn new(permission_timeout: Duration) -> Self {
        Self {
            callbacks: RwLock::default(),
            observer: Mutex::default(),
            pending_permission: Mutex::default(),
            permission_timeout,
        }
    }

    pub(crate) fn set_callbacks(&self, callbacks: PushbindHostCallbacks) {
        *self
            .callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner) = callbacks;
    }

    fn callbacks(&self) -> PushbindHostCallbacks {
        *self.callbacks.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Forwards a host-side identity change to the registered observer.
    pub(crate) fn notify(&self, kind: IdentityKind, value: Option<String>) -> bool {
        let observer = lock(&self.observer).clone();
        match observer {
            Some(observer) => {
                observer(kind, value);
                true
            }
            None => false,
        }
    }

    /// Resolves a pending permission request. Returns false when none is
    /// pending.
    pub(crate) fn complete_permission(&self, granted: bool) -> bool {
        match lock(&self.pending_permission).take() {
            Some(tx) => tx.send(granted).is_ok(),
            None => false,
        }
    }

    fn call_str(&self, name: &str, callback: Option<HostStrFn>, value: &str) -> SdkResult<()> {
        let Some(callback) = callback else {
            return Err(SdkError::Unavailable(format!("host has no {name} callback")));
        };
        let value = CString::new(value)
            .map_err(|_| SdkError::Rejected(format!("{name} argument contains NUL")))?;
        // SAFETY: the host guarantees registered callbacks stay valid and
        // accept a NUL-terminated string for the duration of the call.
        if unsafe { callback(value.as_ptr()) } {
            Ok(())
        } else {
            Err(SdkError::Rejected(format!("host rejected {name}")))
        }
    }

    fn call_json<T: serde::Serialize>(
        &self,
        name: &str,
        callback: Option<HostStrFn>,
        value: &T,
    ) -> SdkResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| SdkError::Rejected(format!("{name} encoding failed: {e}")))?;
        self.call_str(name, callback, &json)
    }
}

#[async_trait]
impl PushSdk for HostSdk {
    fn initialize(&self, app_key: &str) -> SdkResult<()> {
        let callbacks = self.callbacks();
        match callbacks.initialize {
            Some(_) => self.call_str("initialize", callbacks.initialize, app_key),
            // The host may boot its SDK on its own.
            None => {
                debug!("host has no initialize callback, assuming host-side boot");
                Ok(())
            }
        }
    }

    fn observe(&self, observer: SdkObserver) -> SdkResult<()> {
        *lock(&self.observer) = Some(observer);
        Ok(())
    }

    async fn request_permission(&self) -> SdkResult<bool> {
        let Some(callback) = self.callbacks().request_permission else {
            return Err(SdkError::Unavailable(
                "host has no request_permission callback".to_string(),
            ));
        };
        let (tx, rx) = oneshot::channel();
        // A newer request supersedes an unanswered one.
        *lock(&self.pending_permission) = Some(tx);
        // SAFETY: registered callbacks stay valid while registered.
        unsafe { callback() };

        match tokio::time::timeout(self.permission_timeout, rx).await {
            Ok(answer) => Ok(answer.unwrap_or(false)),
            Err(_) => {
                warn!(
                    "Host did not answer permission request within {:?}, treating as denied",
                    self.permission_timeout
                );
                // Drop our own stale sender; a newer request keeps its slot.
                lock(&self.pending_permission).take_if(|tx| tx.is_closed());
                Ok(false)
            }
        }
    }

    fn set_consent(&self, granted: bool) -> SdkResult<()> {
        let Some(callback) = self.callbacks().set_consent else {
            return Err(SdkError::Unavailable("host has no set_consent callback".to_string()));
        };
        // SAFETY: registered callbacks stay valid while registered.
        if unsafe { callback(granted) } {
            Ok(())
        } else {
            Err(SdkError::Rejected("host rejected set_consent".to_string()))
        }
    }

    fn login(&self, external_id: &str) -> SdkResult<()> {
        self.call_str("login", self.callbacks().login, external_id)
    }

    fn add_tags(&self, tags: &BTreeMap<String, String>) -> SdkResult<()> {
        self.call_json("add_tags", self.callbacks().add_tags, tags)
    }

    fn remove_tags(&self, keys: &[String]) -> SdkResult<()> {
        self.call_json("remove_tags", self.callbacks().remove_tags, &keys)
    }
}
