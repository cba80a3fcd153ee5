//! C ABI exports for pushbind.
//!
//! The native host calls [`pushbind_init`] once with a JSON
//! [`FfiConfig`], registers its command callbacks with
//! [`pushbind_register_host`], and from then on reports identities with
//! [`pushbind_report_identity`] whenever its push SDK observer fires.
//!
//! Functions returning `*mut c_char` hand back a JSON [`SdkResponse`]
//! (or a plain string, where documented) that must be released with
//! [`pushbind_free_string`].

mod host;
mod identity;
mod sync;

pub use host::{HostStrFn, PushbindHostCallbacks};
pub use identity::{pushbind_complete_permission, pushbind_query_identity, pushbind_report_identity};
pub use sync::{
    pushbind_refresh_registration, pushbind_request_permission, pushbind_set_access_token,
    pushbind_start_sync, pushbind_sync_state,
};

use host::HostSdk;
use pushbind_identity::NotificationIdentityProvider;
use pushbind_net::{ApiClient, ClientConfig};
use pushbind_sync::{
    Collaborators, InMemoryRegistrationStore, InMemorySessionStore, OrchestratorHandle, Services,
    SyncConfig,
};
use pushbind_types::Platform;
use serde::{Deserialize, Serialize};
use std::ffi::{CStr, CString, c_char};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Status code for exports that do not return a JSON document.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushbindStatus {
    Ok = 0,
    NotInitialized = 1,
    InvalidArgument = 2,
    /// The call was valid but had nothing to act on.
    Ignored = 3,
}

/// How long the host gets to answer a permission prompt by default.
const DEFAULT_PERMISSION_ANSWER_MS: u64 = 60_000;

/// JSON document accepted by [`pushbind_init`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FfiConfig {
    pub client: ClientConfig,
    pub sync: SyncConfig,
    /// Tracing filter directive. Falls back to `RUST_LOG`, then `info`.
    pub log_filter: Option<String>,
    /// Backend access token, if the user is already authenticated.
    pub access_token: Option<String>,
    /// How long to wait for `pushbind_complete_permission` before treating
    /// the prompt as denied. Defaults to 60 s.
    pub permission_answer_ms: Option<u64>,
}

/// Response envelope for JSON-returning exports.
#[derive(Debug, Serialize)]
pub struct SdkResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl SdkResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error_code: None,
            error_message: None,
            data: Some(data),
        }
    }

    pub fn ok_empty() -> Self {
        Self {
            success: true,
            error_code: None,
            error_message: None,
            data: None,
        }
    }

    pub fn err(code: &str, message: &str) -> Self {
        Self {
            success: false,
            error_code: Some(code.to_string()),
            error_message: Some(message.to_string()),
            data: None,
        }
    }

    pub(crate) fn not_initialized() -> Self {
        Self::err("not_initialized", "pushbind runtime not initialized")
    }

    pub(crate) fn into_raw(self) -> *mut c_char {
        let json = serde_json::to_string(&self).unwrap_or_else(|_| {
            r#"{"success":false,"error_code":"json_error","error_message":"Failed to serialize response"}"#.to_string()
        });
        into_c_string(json)
    }
}

/// Process-wide state behind the C boundary.
pub(crate) struct Handle {
    runtime: tokio::runtime::Runtime,
    services: Services,
    host: Arc<HostSdk>,
    session: Arc<InMemorySessionStore>,
    registrations: Arc<InMemoryRegistrationStore>,
    sync: Option<OrchestratorHandle>,
}

static HANDLE: Mutex<Option<Handle>> = Mutex::new(None);

pub(crate) fn lock_handle() -> MutexGuard<'static, Option<Handle>> {
    HANDLE.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn into_c_string(value: String) -> *mut c_char {
    CString::new(value).unwrap_or_default().into_raw()
}

/// Reads an optional UTF-8 argument. Null maps to `Ok(None)`.
///
/// # Safety
/// `ptr` must be null or a valid null-terminated string.
pub(crate) unsafe fn read_str<'a>(ptr: *const c_char) -> Result<Option<&'a str>, SdkResponse> {
    if ptr.is_null() {
        return Ok(None);
    }
    match unsafe { CStr::from_ptr(ptr) }.to_str() {
        Ok(s) => Ok(Some(s)),
        Err(_) => Err(SdkResponse::err("invalid_utf8", "argument is not valid UTF-8")),
    }
}

fn init_logging(filter: Option<&str>) {
    let filter = match filter {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    // A host that already installed a subscriber keeps it.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn build_handle(config: FfiConfig) -> Result<Handle, SdkResponse> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("pushbind")
        .enable_all()
        .build()
        .map_err(|e| SdkResponse::err("runtime_error", &format!("failed to start runtime: {e}")))?;

    // reqwest needs the runtime's reactor while the client is built.
    let api = {
        let _guard = runtime.enter();
        ApiClient::new(&config.client)
            .map_err(|e| SdkResponse::err("config_error", &e.to_string()))?
    };

    let host = Arc::new(HostSdk::new(Duration::from_millis(
        config
            .permission_answer_ms
            .unwrap_or(DEFAULT_PERMISSION_ANSWER_MS),
    )));
    let session = Arc::new(InMemorySessionStore::new());
    let registrations = Arc::new(match config.access_token {
        Some(token) => InMemoryRegistrationStore::with_access_token(token),
        None => InMemoryRegistrationStore::new(),
    });
    let deps = Collaborators {
        api,
        session: session.clone(),
        registrations: registrations.clone(),
    };
    let services = match config.sync.platform {
        Platform::Android => Services::android(config.sync, host.clone(), deps),
        Platform::Ios => Services::hosted(config.sync, host.clone(), deps),
    };

    Ok(Handle {
        runtime,
        services,
        host,
        session,
        registrations,
        sync: None,
    })
}

unsafe fn init_inner(config_json: *const c_char) -> SdkResponse {
    let config: FfiConfig = match unsafe { read_str(config_json) } {
        Ok(Some(json)) => match serde_json::from_str(json) {
            Ok(config) => config,
            Err(e) => return SdkResponse::err("json_parse_error", &format!("Invalid JSON: {e}")),
        },
        Ok(None) => FfiConfig::default(),
        Err(response) => return response,
    };
    init_logging(config.log_filter.as_deref());

    let mut guard = lock_handle();
    if guard.is_some() {
        return SdkResponse::err("already_initialized", "pushbind runtime already initialized");
    }
    let platform = config.sync.platform;
    match build_handle(config) {
        Ok(handle) => {
            *guard = Some(handle);
            info!(%platform, "pushbind initialized");
            SdkResponse::ok(serde_json::json!({ "platform": platform }))
        }
        Err(response) => response,
    }
}

/// Initializes the runtime. `config_json` may be null for defaults.
///
/// # Safety
/// `config_json` must be null or a valid null-terminated UTF-8 string.
/// The returned pointer must be freed with `pushbind_free_string`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pushbind_init(config_json: *const c_char) -> *mut c_char {
    unsafe { init_inner(config_json) }.into_raw()
}

/// Registers the host's command callbacks, replacing any previous table.
#[unsafe(no_mangle)]
pub extern "C" fn pushbind_register_host(callbacks: PushbindHostCallbacks) -> PushbindStatus {
    let host = match lock_handle().as_ref() {
        Some(handle) => handle.host.clone(),
        None => return PushbindStatus::NotInitialized,
    };
    host.set_callbacks(callbacks);
    PushbindStatus::Ok
}

/// Cancels any running sync and tears the runtime down.
#[unsafe(no_mangle)]
pub extern "C" fn pushbind_shutdown() -> PushbindStatus {
    let Some(handle) = lock_handle().take() else {
        return PushbindStatus::NotInitialized;
    };
    if let Some(sync) = &handle.sync {
        sync.cancel();
    }
    handle.services.provider.clear_listener();
    let Handle { runtime, .. } = handle;
    runtime.shutdown_background();
    info!("pushbind shut down");
    PushbindStatus::Ok
}

/// Frees a string returned by any pushbind export.
///
/// # Safety
/// `ptr` must be null or a pointer previously returned by pushbind and not
/// yet freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pushbind_free_string(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr) });
}

pub(crate) fn log_ignored(what: &str) {
    warn!("Ignoring {}: runtime not initialized", what);
}
