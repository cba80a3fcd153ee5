//! Identity shapes.

use crate::cell::IdentityCell;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which externally assigned identifier a value is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKind {
    /// The device's push subscription id.
    PushSubscriptionId,
    /// The push service's own user id for this install.
    NativeUserId,
}

impl IdentityKind {
    pub const ALL: [IdentityKind; 2] = [IdentityKind::PushSubscriptionId, IdentityKind::NativeUserId];

    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityKind::PushSubscriptionId => "push_subscription_id",
            IdentityKind::NativeUserId => "native_user_id",
        }
    }

    /// Stable numeric code used across the C boundary.
    pub fn code(&self) -> i32 {
        match self {
            IdentityKind::PushSubscriptionId => 0,
            IdentityKind::NativeUserId => 1,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(IdentityKind::PushSubscriptionId),
            1 => Some(IdentityKind::NativeUserId),
            _ => None,
        }
    }
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a provider could find out about this install's push identity.
///
/// Fields are independently optional; consumers must accept partial
/// identities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationIdentity {
    pub push_subscription_id: Option<String>,
    pub native_user_id: Option<String>,
    pub opted_in: bool,
    pub external_user_id: Option<String>,
}

impl NotificationIdentity {
    /// True when neither identifier is known.
    pub fn is_empty(&self) -> bool {
        self.push_subscription_id.is_none() && self.native_user_id.is_none()
    }

    /// The identifier to register with the backend: the subscription id,
    /// falling back to the native user id.
    pub fn registration_id(&self) -> Option<&str> {
        self.push_subscription_id
            .as_deref()
            .or(self.native_user_id.as_deref())
    }
}

/// One cell per [`IdentityKind`].
#[derive(Debug, Default)]
pub struct IdentityCells {
    push_subscription_id: IdentityCell<String>,
    native_user_id: IdentityCell<String>,
}

impl IdentityCells {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, kind: IdentityKind) -> &IdentityCell<String> {
        match kind {
            IdentityKind::PushSubscriptionId => &self.push_subscription_id,
            IdentityKind::NativeUserId => &self.native_user_id,
        }
    }

    /// True when any cell holds a value.
    pub fn any_ready(&self) -> bool {
        IdentityKind::ALL
            .iter()
            .any(|kind| self.cell(*kind).get().is_some())
    }
}
