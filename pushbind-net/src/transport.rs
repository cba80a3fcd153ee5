//! Transport abstraction.
//!
//! An [`HttpTransport`] performs exactly one attempt and reports either the
//! raw response or a [`TransportFault`]. Classification into a
//! [`ResultEnvelope`](crate::ResultEnvelope) happens in the executor.

use crate::config::ClientConfig;
use crate::descriptor::Method;
use crate::error::{NetError, NetResult, TransportFault};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// A request as handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequest {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// A response as received from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase for the status, if known.
    pub reason: Option<String>,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// A response with the canonical reason phrase for `status`.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .map(str::to_string);
        Self {
            status,
            reason,
            body: body.into(),
        }
    }
}

/// Performs one HTTP attempt.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: RawRequest) -> Result<RawResponse, TransportFault>;
}

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Builds a transport from configuration.
    pub fn new(config: &ClientConfig) -> NetResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(NetError::Config("base_url is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: RawRequest) -> Result<RawResponse, TransportFault> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };
        let url = self.url(&request.path);
        debug!(%method, %url, "sending request");

        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            body: body.to_vec(),
        })
    }
}

/// Scripted transports for testing.
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays queued outcomes in order and records every request.
    ///
    /// When the queue runs dry every further call fails with
    /// `TransportFault::Other("no scripted response")`.
    #[derive(Debug, Default)]
    pub struct ScriptedTransport {
        outcomes: Mutex<VecDeque<Result<RawResponse, TransportFault>>>,
        requests: Mutex<Vec<RawRequest>>,
        delay: Option<Duration>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Delays every reply by `delay`.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Queues a response.
        pub fn respond(self, status: u16, body: impl Into<Vec<u8>>) -> Self {
            self.push(Ok(RawResponse::new(status, body)))
        }

        /// Queues a fault.
        pub fn fail(self, fault: TransportFault) -> Self {
            self.push(Err(fault))
        }

        /// Queues an arbitrary outcome.
        pub fn push(self, outcome: Result<RawResponse, TransportFault>) -> Self {
            self.lock_outcomes().push_back(outcome);
            self
        }

        /// Requests seen so far.
        pub fn requests(&self) -> Vec<RawRequest> {
            self.requests
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone()
        }

        fn lock_outcomes(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<RawResponse, TransportFault>>> {
            self.outcomes
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn send(&self, request: RawRequest) -> Result<RawResponse, TransportFault> {
            self.requests
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.lock_outcomes()
                .pop_front()
                .unwrap_or_else(|| Err(TransportFault::Other("no scripted response".to_string())))
        }
    }
}
