//! Error types for the sync layer's external collaborators.

use thiserror::Error;

pub type SessionResult<T> = Result<T, SessionError>;

/// Errors from a [`SessionStore`](crate::SessionStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),

    #[error("session store error: {0}")]
    Store(String),
}

pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Errors from a [`RegistrationStore`](crate::RegistrationStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("registration store error: {0}")]
    Store(String),
}
