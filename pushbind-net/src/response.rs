//! Response envelope and payload shapes shared by the sync layer.

use serde::{Deserialize, Serialize};

/// Status value that marks a successful body.
pub const STATUS_SUCCESS: &str = "success";

/// Wire envelope: `{ "status": string, "data": T | null }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseResponse<T> {
    pub status: Option<String>,
    pub data: Option<T>,
}

impl<T> BaseResponse<T> {
    pub fn new(status: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: Some(status.into()),
            data,
        }
    }

    /// True when `status == "success"`.
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }
}

/// Access and refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

impl TokenResponse {
    pub fn new(token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// Body of the push registration endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRegistration {
    /// Push subscription id assigned by the notification service.
    pub player_id: String,
    /// Lowercase platform name.
    pub platform: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}
