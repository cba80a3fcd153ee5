//! Error types for the network layer.

use thiserror::Error;

/// Result type for network setup operations.
pub type NetResult<T> = Result<T, NetError>;

/// Errors raised while building clients or requests.
///
/// Outcomes of an executed call are never reported through this type; they
/// are data in a [`ResultEnvelope`](crate::ResultEnvelope).
#[derive(Debug, Error)]
pub enum NetError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// Request body serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// A fault raised by an [`HttpTransport`](crate::HttpTransport) during one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFault {
    /// The attempt was cancelled cooperatively.
    #[error("request cancelled")]
    Cancelled,

    /// The attempt exceeded a deadline.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The remote could not be reached.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Anything else, with the original description.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportFault {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportFault::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportFault::Connect(err.to_string())
        } else {
            TransportFault::Other(err.to_string())
        }
    }
}

/// A response body that could not be decoded into the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to decode response body: {0}")]
pub struct DecodeError(pub String);

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError(err.to_string())
    }
}
