//! The discriminated outcome of a remote call.

use serde::{Deserialize, Serialize};

/// Classification of a fault that happened during a call attempt.
///
/// Cancellation has no variant here: a cancelled call surfaces as
/// `Err(Cancelled)` from the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The attempt exceeded a deadline.
    Timeout,
    /// The remote could not be reached.
    ConnectionError,
    /// Any other fault, including undecodable bodies.
    Unknown,
}

/// Outcome of one remote call. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultEnvelope<T> {
    /// 2xx status and a well-formed body.
    Success(T),
    /// The remote answered with a non-2xx status.
    ApplicationError {
        /// HTTP status code.
        code: u16,
        /// Reason phrase, if the status has one.
        message: Option<String>,
    },
    /// The attempt failed before a usable answer arrived.
    TransportFailure {
        /// What kind of fault it was.
        kind: FailureKind,
        /// Description of the underlying fault.
        detail: Option<String>,
    },
}

impl<T> ResultEnvelope<T> {
    /// Builds a transport failure with a detail message.
    pub fn failure(kind: FailureKind, detail: impl Into<String>) -> Self {
        ResultEnvelope::TransportFailure {
            kind,
            detail: Some(detail.into()),
        }
    }

    /// True for `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, ResultEnvelope::Success(_))
    }

    /// The success value, if any.
    pub fn success(&self) -> Option<&T> {
        match self {
            ResultEnvelope::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the envelope, returning the success value if any.
    pub fn into_success(self) -> Option<T> {
        match self {
            ResultEnvelope::Success(value) => Some(value),
            _ => None,
        }
    }

    /// The status code of an `ApplicationError`.
    pub fn error_code(&self) -> Option<u16> {
        match self {
            ResultEnvelope::ApplicationError { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// The kind of a `TransportFailure`.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ResultEnvelope::TransportFailure { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Maps the success value, leaving other variants untouched.
    pub fn map<U, F>(self, f: F) -> ResultEnvelope<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            ResultEnvelope::Success(value) => ResultEnvelope::Success(f(value)),
            ResultEnvelope::ApplicationError { code, message } => {
                ResultEnvelope::ApplicationError { code, message }
            }
            ResultEnvelope::TransportFailure { kind, detail } => {
                ResultEnvelope::TransportFailure { kind, detail }
            }
        }
    }

    /// Runs `f` on the success value and returns the envelope unchanged.
    pub fn on_success<F>(self, f: F) -> Self
    where
        F: FnOnce(&T),
    {
        if let ResultEnvelope::Success(value) = &self {
            f(value);
        }
        self
    }

    /// Runs `f` on an application error and returns the envelope unchanged.
    pub fn on_error<F>(self, f: F) -> Self
    where
        F: FnOnce(u16, Option<&str>),
    {
        if let ResultEnvelope::ApplicationError { code, message } = &self {
            f(*code, message.as_deref());
        }
        self
    }

    /// Runs `f` on a transport failure and returns the envelope unchanged.
    pub fn on_failure<F>(self, f: F) -> Self
    where
        F: FnOnce(FailureKind, Option<&str>),
    {
        if let ResultEnvelope::TransportFailure { kind, detail } = &self {
            f(*kind, detail.as_deref());
        }
        self
    }
}
