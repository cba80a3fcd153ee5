//! Host → core identity reports and core → host reads.

use crate::{PushbindStatus, into_c_string, lock_handle, log_ignored, read_str};
use pushbind_identity::{IdentityKind, NotificationIdentityProvider};
use std::ffi::c_char;
use std::ptr;

/// Reports an identity from the host's push SDK observer.
///
/// `kind` is `0` for the push subscription id and `1` for the push
/// service's user id. A null or blank `value` is ignored. Safe to call
/// from any thread, repeatedly.
///
/// # Safety
/// `value` must be null or a valid null-terminated UTF-8 string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pushbind_report_identity(kind: i32, value: *const c_char) -> PushbindStatus {
    let Some(kind) = IdentityKind::from_code(kind) else {
        return PushbindStatus::InvalidArgument;
    };
    let value = match unsafe { read_str(value) } {
        Ok(value) => value.map(str::to_string),
        Err(_) => return PushbindStatus::InvalidArgument,
    };

    let (bridge, host) = match lock_handle().as_ref() {
        Some(handle) => (handle.services.bridge.clone(), handle.host.clone()),
        None => {
            log_ignored("identity report");
            return PushbindStatus::NotInitialized;
        }
    };

    let Some(bridge) = bridge else {
        // In-process builds feed the SDK observer instead of the bridge.
        return if host.notify(kind, value) {
            PushbindStatus::Ok
        } else {
            PushbindStatus::Ignored
        };
    };
    bridge.report_identity(kind, value.as_deref());
    PushbindStatus::Ok
}

/// Returns the last reported value for `kind`, or null when none is known.
///
/// Reads cached state only; never calls back into the host. A non-null
/// result must be freed with `pushbind_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn pushbind_query_identity(kind: i32) -> *mut c_char {
    let Some(kind) = IdentityKind::from_code(kind) else {
        return ptr::null_mut();
    };
    let (bridge, provider) = match lock_handle().as_ref() {
        Some(handle) => (
            handle.services.bridge.clone(),
            handle.services.provider.clone(),
        ),
        None => return ptr::null_mut(),
    };

    let value = match bridge {
        Some(bridge) => bridge.query_identity(kind),
        None => provider.current_identity().and_then(|identity| match kind {
            IdentityKind::PushSubscriptionId => identity.push_subscription_id,
            IdentityKind::NativeUserId => identity.native_user_id,
        }),
    };
    value.map_or(ptr::null_mut(), into_c_string)
}

/// Delivers the user's answer to the last `request_permission` callback.
#[unsafe(no_mangle)]
pub extern "C" fn pushbind_complete_permission(granted: bool) -> PushbindStatus {
    let host = match lock_handle().as_ref() {
        Some(handle) => handle.host.clone(),
        None => return PushbindStatus::NotInitialized,
    };
    if host.complete_permission(granted) {
        PushbindStatus::Ok
    } else {
        PushbindStatus::Ignored
    }
}
