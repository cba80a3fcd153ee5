use proptest::prelude::*;
use pushbind_net::transport::mock::ScriptedTransport;
use pushbind_net::{
    BaseResponse, CallDescriptor, CallExecutor, CancelToken, Cancelled, DecodeError,
    FailureKind, Method, ResultEnvelope, TokenResponse, TransportFault,
};
use std::sync::Arc;
use std::time::Duration;

fn executor(transport: ScriptedTransport) -> (CallExecutor, Arc<ScriptedTransport>) {
    let transport = Arc::new(transport);
    (CallExecutor::new(transport.clone()), transport)
}

fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(fut)
}

// ── Success path ────────────────────────────────────────────────

#[tokio::test]
async fn success_body_is_decoded() {
    let body = r#"{"status":"success","data":{"token":"abc","refreshToken":"def"}}"#;
    let (exec, _) = executor(ScriptedTransport::new().respond(200, body));

    let result = exec
        .execute(CallDescriptor::<BaseResponse<TokenResponse>>::get("/auth/token"))
        .await
        .unwrap();

    let expected = BaseResponse::new("success", Some(TokenResponse::new("abc", "def")));
    assert_eq!(result, ResultEnvelope::Success(expected));
}

#[tokio::test]
async fn created_status_is_success() {
    let (exec, _) = executor(ScriptedTransport::new().respond(201, r#"{"status":"success","data":null}"#));
    let result = exec
        .execute(CallDescriptor::<BaseResponse<serde_json::Value>>::post("/v1/things"))
        .await
        .unwrap();
    let body = result.into_success().unwrap();
    assert!(body.is_success());
    assert!(body.data.is_none());
}

#[tokio::test]
async fn empty_success_body_is_unknown_failure() {
    let (exec, _) = executor(ScriptedTransport::new().respond(200, ""));
    let result = exec
        .execute(CallDescriptor::<TokenResponse>::get("/auth/token"))
        .await
        .unwrap();
    assert_eq!(result.failure_kind(), Some(FailureKind::Unknown));
    match result {
        ResultEnvelope::TransportFailure { detail, .. } => {
            assert!(detail.unwrap().contains("decode"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_success_body_is_unknown_failure() {
    let (exec, _) = executor(ScriptedTransport::new().respond(200, r#"{"token": 5}"#));
    let result = exec
        .execute(CallDescriptor::<TokenResponse>::get("/auth/token"))
        .await
        .unwrap();
    assert!(!result.is_success());
    assert_eq!(result.failure_kind(), Some(FailureKind::Unknown));
}

#[tokio::test]
async fn custom_decoder_is_used() {
    fn count_bytes(bytes: &[u8]) -> Result<usize, DecodeError> {
        if bytes.is_empty() {
            Err(DecodeError("empty".into()))
        } else {
            Ok(bytes.len())
        }
    }
    let (exec, _) = executor(ScriptedTransport::new().respond(200, "hello"));
    let call = CallDescriptor::with_decoder(Method::Get, "/raw", count_bytes);
    assert_eq!(exec.execute(call).await.unwrap(), ResultEnvelope::Success(5));
}

// ── Application errors ──────────────────────────────────────────

#[tokio::test]
async fn not_found_maps_to_application_error() {
    let (exec, _) = executor(ScriptedTransport::new().respond(404, "missing"));
    let result = exec
        .execute(CallDescriptor::<TokenResponse>::get("/auth/token"))
        .await
        .unwrap();
    assert_eq!(
        result,
        ResultEnvelope::ApplicationError {
            code: 404,
            message: Some("Not Found".to_string()),
        }
    );
}

#[tokio::test]
async fn redirect_status_is_not_success() {
    let (exec, _) = executor(ScriptedTransport::new().respond(304, ""));
    let result = exec
        .execute(CallDescriptor::<TokenResponse>::get("/auth/token"))
        .await
        .unwrap();
    assert_eq!(result.error_code(), Some(304));
}

#[tokio::test]
async fn no_retry_on_server_error() {
    let (exec, transport) = executor(
        ScriptedTransport::new()
            .respond(503, "")
            .respond(200, r#"{"token":"a","refreshToken":"b"}"#),
    );
    let result = exec
        .execute(CallDescriptor::<TokenResponse>::get("/auth/token"))
        .await
        .unwrap();
    assert_eq!(result.error_code(), Some(503));
    assert_eq!(transport.requests().len(), 1);
}

// ── Transport faults ────────────────────────────────────────────

#[tokio::test]
async fn fault_mentioning_timeout_is_timeout() {
    let (exec, _) = executor(
        ScriptedTransport::new().fail(TransportFault::Other("socket timeout after 60000 ms".into())),
    );
    let result = exec
        .execute(CallDescriptor::<TokenResponse>::get("/auth/token"))
        .await
        .unwrap();
    assert_eq!(result.failure_kind(), Some(FailureKind::Timeout));
}

#[tokio::test]
async fn typed_faults_are_classified() {
    let (exec, _) = executor(
        ScriptedTransport::new()
            .fail(TransportFault::Timeout("deadline".into()))
            .fail(TransportFault::Connect("refused".into()))
            .fail(TransportFault::Other("bad certificate".into())),
    );
    let mut kinds = Vec::new();
    for _ in 0..3 {
        let result = exec
            .execute(CallDescriptor::<TokenResponse>::get("/auth/token"))
            .await
            .unwrap();
        kinds.push(result.failure_kind().unwrap());
    }
    assert_eq!(
        kinds,
        vec![FailureKind::Timeout, FailureKind::ConnectionError, FailureKind::Unknown]
    );
}

#[tokio::test]
async fn unknown_fault_keeps_description() {
    let (exec, _) = executor(ScriptedTransport::new().fail(TransportFault::Other("bad certificate".into())));
    let result = exec
        .execute(CallDescriptor::<TokenResponse>::get("/auth/token"))
        .await
        .unwrap();
    assert_eq!(
        result,
        ResultEnvelope::TransportFailure {
            kind: FailureKind::Unknown,
            detail: Some("bad certificate".to_string()),
        }
    );
}

// ── Cancellation ────────────────────────────────────────────────

#[tokio::test]
async fn cancelled_fault_is_reraised() {
    let (exec, _) = executor(ScriptedTransport::new().fail(TransportFault::Cancelled));
    let result = exec
        .execute(CallDescriptor::<TokenResponse>::get("/auth/token"))
        .await;
    assert_eq!(result, Err(Cancelled));
}

#[tokio::test(start_paused = true)]
async fn cancel_token_interrupts_in_flight_call() {
    let (exec, _) = executor(
        ScriptedTransport::new()
            .with_delay(Duration::from_secs(30))
            .respond(200, r#"{"token":"a","refreshToken":"b"}"#),
    );
    let token = CancelToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let result = exec
        .execute_with_cancel(CallDescriptor::<TokenResponse>::get("/auth/token"), &token)
        .await;
    assert_eq!(result, Err(Cancelled));
}

#[tokio::test]
async fn cancellation_propagates_with_question_mark() {
    async fn caller(exec: &CallExecutor) -> Result<u16, Cancelled> {
        let envelope = exec
            .execute(CallDescriptor::<TokenResponse>::get("/auth/token"))
            .await?;
        Ok(envelope.error_code().unwrap_or(0))
    }
    let (exec, _) = executor(ScriptedTransport::new().fail(TransportFault::Cancelled));
    assert_eq!(caller(&exec).await, Err(Cancelled));
}

// ── Request shape ───────────────────────────────────────────────

#[tokio::test]
async fn descriptor_is_passed_to_transport() {
    let (exec, transport) = executor(ScriptedTransport::new().respond(200, "null"));
    let call = CallDescriptor::<Option<String>>::post("/v1/items")
        .bearer("secret")
        .json_body(&serde_json::json!({"a": 1}))
        .unwrap();
    exec.execute(call).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.path, "/v1/items");
    assert!(request
        .headers
        .contains(&("Authorization".to_string(), "Bearer secret".to_string())));
    assert_eq!(request.body.as_deref(), Some(br#"{"a":1}"#.as_slice()));
}

// ── Properties ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn success_range_decodes_body(
        status in 200u16..=299,
        token in "[a-zA-Z0-9]{0,16}",
        refresh in "[a-zA-Z0-9]{0,16}",
    ) {
        let expected = TokenResponse::new(token, refresh);
        let body = serde_json::to_vec(&expected).unwrap();
        let (exec, _) = executor(ScriptedTransport::new().respond(status, body));
        let result = block_on(exec.execute(CallDescriptor::<TokenResponse>::get("/auth/token"))).unwrap();
        prop_assert_eq!(result, ResultEnvelope::Success(expected));
    }

    #[test]
    fn outside_success_range_is_application_error(
        status in prop_oneof![100u16..200, 300u16..600],
    ) {
        let (exec, _) = executor(ScriptedTransport::new().respond(status, r#"{"token":"a","refreshToken":"b"}"#));
        let result = block_on(exec.execute(CallDescriptor::<TokenResponse>::get("/auth/token"))).unwrap();
        prop_assert_eq!(result.error_code(), Some(status));
    }
}
