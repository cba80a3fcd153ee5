//! Executes one remote call and classifies its outcome.

use crate::config::ClientConfig;
use crate::descriptor::CallDescriptor;
use crate::envelope::{FailureKind, ResultEnvelope};
use crate::error::{NetResult, TransportFault};
use crate::transport::{HttpTransport, ReqwestTransport};
use pushbind_types::{CancelToken, Cancelled};
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::{debug, warn};

/// Statuses classified as success.
const SUCCESS_RANGE: RangeInclusive<u16> = 200..=299;

/// Description fragments that identify a deadline fault.
const TIMEOUT_MARKERS: &[&str] = &["timeout", "timed out", "deadline"];

/// Description fragments that identify a connectivity fault.
const CONNECTION_MARKERS: &[&str] = &[
    "connection refused",
    "connection reset",
    "connection aborted",
    "connection closed before",
    "failed to connect",
    "connect error",
    "unreachable",
    "refused",
    "dns error",
    "no route to host",
    "network is down",
];

/// Executes calls over an [`HttpTransport`].
///
/// The executor holds no mutable state. No retry happens here; retry
/// policy belongs to the caller.
#[derive(Clone)]
pub struct CallExecutor {
    transport: Arc<dyn HttpTransport>,
}

impl CallExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Builds an executor over a reqwest transport.
    pub fn from_config(config: &ClientConfig) -> NetResult<Self> {
        Ok(Self::new(Arc::new(ReqwestTransport::new(config)?)))
    }

    /// Performs the call and classifies the outcome.
    ///
    /// Returns `Err(Cancelled)` when the transport reports cancellation.
    /// Dropping the returned future cancels the attempt as well.
    pub async fn execute<T>(
        &self,
        descriptor: CallDescriptor<T>,
    ) -> Result<ResultEnvelope<T>, Cancelled> {
        let (request, decoder) = descriptor.into_parts();
        let method = request.method;
        let path = request.path.clone();

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(fault) => {
                let (kind, detail) = classify_fault(fault)?;
                warn!(%method, %path, ?kind, %detail, "call failed in transport");
                return Ok(ResultEnvelope::TransportFailure {
                    kind,
                    detail: Some(detail),
                });
            }
        };

        if !SUCCESS_RANGE.contains(&response.status) {
            debug!(%method, %path, status = response.status, "call rejected");
            return Ok(ResultEnvelope::ApplicationError {
                code: response.status,
                message: response.reason,
            });
        }

        match decoder(&response.body) {
            Ok(value) => {
                debug!(%method, %path, status = response.status, "call succeeded");
                Ok(ResultEnvelope::Success(value))
            }
            Err(err) => {
                warn!(%method, %path, status = response.status, error = %err, "undecodable success body");
                Ok(ResultEnvelope::TransportFailure {
                    kind: FailureKind::Unknown,
                    detail: Some(err.to_string()),
                })
            }
        }
    }

    /// Like [`execute`](Self::execute), but also gives up when `token` fires.
    pub async fn execute_with_cancel<T>(
        &self,
        descriptor: CallDescriptor<T>,
        token: &CancelToken,
    ) -> Result<ResultEnvelope<T>, Cancelled> {
        token.run(self.execute(descriptor)).await?
    }
}

/// Classifies a transport fault.
///
/// Cancellation comes back as `Err` so it can be re-raised. Every other
/// fault yields its [`FailureKind`] and a description for diagnostics.
pub fn classify_fault(fault: TransportFault) -> Result<(FailureKind, String), Cancelled> {
    match fault {
        TransportFault::Cancelled => Err(Cancelled),
        TransportFault::Timeout(detail) => Ok((FailureKind::Timeout, detail)),
        TransportFault::Connect(detail) => Ok((FailureKind::ConnectionError, detail)),
        TransportFault::Other(detail) => Ok((classify_description(&detail), detail)),
    }
}

fn classify_description(detail: &str) -> FailureKind {
    let lower = detail.to_ascii_lowercase();
    if TIMEOUT_MARKERS.iter().any(|m| lower.contains(m)) {
        FailureKind::Timeout
    } else if CONNECTION_MARKERS.iter().any(|m| lower.contains(m)) {
        FailureKind::ConnectionError
    } else {
        FailureKind::Unknown
    }
}
