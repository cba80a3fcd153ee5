//! Error types for push SDK pass-through calls.

use thiserror::Error;

/// Result type for SDK calls.
pub type SdkResult<T> = Result<T, SdkError>;

/// Errors reported by a [`PushSdk`](crate::PushSdk).
///
/// Providers log these; they never reach the provider's caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkError {
    /// The SDK has not been initialized yet.
    #[error("push SDK not initialized")]
    NotInitialized,

    /// The app key was rejected.
    #[error("invalid app key: {0}")]
    InvalidAppKey(String),

    /// The SDK refused the call.
    #[error("push SDK rejected call: {0}")]
    Rejected(String),

    /// The SDK (or the host that owns it) is not reachable.
    #[error("push SDK unavailable: {0}")]
    Unavailable(String),
}
