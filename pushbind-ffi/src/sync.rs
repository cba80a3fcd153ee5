//! Sync lifecycle exports.

use crate::{PushbindStatus, SdkResponse, lock_handle, read_str};
use pushbind_sync::SessionSnapshot;
use std::ffi::c_char;
use tracing::{debug, info};

unsafe fn start_sync_inner(session_json: *const c_char) -> SdkResponse {
    let snapshot: Option<SessionSnapshot> = match unsafe { read_str(session_json) } {
        Ok(Some(json)) => match serde_json::from_str(json) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => return SdkResponse::err("json_parse_error", &format!("Invalid JSON: {e}")),
        },
        Ok(None) => None,
        Err(response) => return response,
    };

    let (runtime, session) = match lock_handle().as_ref() {
        Some(handle) if handle.sync.is_some() => return already_started(),
        Some(handle) => (handle.runtime.handle().clone(), handle.session.clone()),
        None => return SdkResponse::not_initialized(),
    };
    // HANDLE stays unlocked while the session is restored.
    if let Some(snapshot) = snapshot {
        runtime.block_on(session.restore(snapshot));
    }

    let mut guard = lock_handle();
    let Some(handle) = guard.as_mut() else {
        return SdkResponse::not_initialized();
    };
    if handle.sync.is_some() {
        return already_started();
    }
    let _enter = handle.runtime.enter();
    handle.sync = Some(handle.services.orchestrator.spawn());
    info!("sync started");
    SdkResponse::ok_empty()
}

fn already_started() -> SdkResponse {
    SdkResponse::err("already_started", "sync already started for this run")
}

/// Starts the correlation run in the background.
///
/// `session_json` is an optional `{ "userId", "isFirstTime", "launchCount" }`
/// document that replaces the session before the run starts. Blocks while
/// the session is restored; must not be called from inside a host callback.
///
/// # Safety
/// `session_json` must be null or a valid null-terminated UTF-8 string.
/// The returned pointer must be freed with `pushbind_free_string`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pushbind_start_sync(session_json: *const c_char) -> *mut c_char {
    unsafe { start_sync_inner(session_json) }.into_raw()
}

/// Current sync state as `{ "state": ..., "reason": ... }`.
///
/// The returned pointer must be freed with `pushbind_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn pushbind_sync_state() -> *mut c_char {
    let state = match lock_handle().as_ref() {
        Some(handle) => handle.services.orchestrator.state(),
        None => return SdkResponse::not_initialized().into_raw(),
    };
    let response = match serde_json::to_value(&state) {
        Ok(value) => SdkResponse::ok(value),
        Err(e) => SdkResponse::err("json_error", &e.to_string()),
    };
    response.into_raw()
}

/// Sets or clears (null) the backend access token. Safe to call from any
/// thread, including inside host callbacks.
///
/// # Safety
/// `token` must be null or a valid null-terminated UTF-8 string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pushbind_set_access_token(token: *const c_char) -> PushbindStatus {
    let token = match unsafe { read_str(token) } {
        Ok(token) => token.map(str::to_string),
        Err(_) => return PushbindStatus::InvalidArgument,
    };
    let registrations = match lock_handle().as_ref() {
        Some(handle) => handle.registrations.clone(),
        None => return PushbindStatus::NotInitialized,
    };
    registrations.set_access_token(token);
    debug!("access token updated");
    PushbindStatus::Ok
}

/// Re-registers the current push identity if it changed. Blocks until the
/// backend answers; must not be called from inside a host callback.
///
/// The returned pointer must be freed with `pushbind_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn pushbind_refresh_registration() -> *mut c_char {
    let (runtime, orchestrator) = match lock_handle().as_ref() {
        Some(handle) => (
            handle.runtime.handle().clone(),
            handle.services.orchestrator.clone(),
        ),
        None => return SdkResponse::not_initialized().into_raw(),
    };
    let response = match runtime.block_on(orchestrator.refresh_registration()) {
        Ok(outcome) => match serde_json::to_value(&outcome) {
            Ok(value) => SdkResponse::ok(value),
            Err(e) => SdkResponse::err("json_error", &e.to_string()),
        },
        Err(e) => SdkResponse::err("cancelled", &e.to_string()),
    };
    response.into_raw()
}

/// Asks the host to prompt for notification permission and, once the host
/// reports the answer through `pushbind_complete_permission`, correlates
/// if permission was granted. Returns immediately.
#[unsafe(no_mangle)]
pub extern "C" fn pushbind_request_permission() -> PushbindStatus {
    let (runtime, orchestrator) = match lock_handle().as_ref() {
        Some(handle) => (
            handle.runtime.handle().clone(),
            handle.services.orchestrator.clone(),
        ),
        None => return PushbindStatus::NotInitialized,
    };
    runtime.spawn(async move {
        match orchestrator.request_permission_and_register().await {
            Ok(granted) => debug!(granted, "permission flow finished"),
            Err(_) => debug!("permission flow cancelled"),
        }
    });
    PushbindStatus::Ok
}
