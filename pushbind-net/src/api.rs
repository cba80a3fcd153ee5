//! Endpoints used by the identity-sync layer.

use crate::config::ClientConfig;
use crate::descriptor::CallDescriptor;
use crate::envelope::{FailureKind, ResultEnvelope};
use crate::error::NetResult;
use crate::executor::CallExecutor;
use crate::response::{BaseResponse, PushRegistration, TokenResponse};
use pushbind_types::Cancelled;

/// Token endpoint.
pub const GET_TOKEN: &str = "/auth/token";
/// Push registration endpoint.
pub const POST_PUSH_REGISTER: &str = "/v1/push/register";

/// Thin typed wrapper over a [`CallExecutor`].
#[derive(Clone)]
pub struct ApiClient {
    executor: CallExecutor,
}

impl ApiClient {
    /// Builds a client over a reqwest transport.
    pub fn new(config: &ClientConfig) -> NetResult<Self> {
        Ok(Self::with_executor(CallExecutor::from_config(config)?))
    }

    pub fn with_executor(executor: CallExecutor) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &CallExecutor {
        &self.executor
    }

    /// `GET /auth/token`, authorized when a token is available.
    pub async fn get_token(
        &self,
        access_token: Option<&str>,
    ) -> Result<ResultEnvelope<BaseResponse<TokenResponse>>, Cancelled> {
        let mut call = CallDescriptor::get(GET_TOKEN);
        if let Some(token) = access_token {
            call = call.bearer(token);
        }
        self.executor.execute(call).await
    }

    /// `POST /v1/push/register`.
    pub async fn register_push(
        &self,
        registration: &PushRegistration,
        access_token: &str,
    ) -> Result<ResultEnvelope<BaseResponse<serde_json::Value>>, Cancelled> {
        let call = match CallDescriptor::post(POST_PUSH_REGISTER)
            .bearer(access_token)
            .json_body(registration)
        {
            Ok(call) => call,
            Err(err) => {
                return Ok(ResultEnvelope::failure(
                    FailureKind::Unknown,
                    format!("failed to encode request body: {err}"),
                ));
            }
        };
        self.executor.execute(call).await
    }
}
