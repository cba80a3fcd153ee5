use pretty_assertions::assert_eq;
use pushbind_net::{BaseResponse, FailureKind, ResultEnvelope, TokenResponse};
use std::cell::Cell;

#[test]
fn on_success_runs_only_for_success() {
    let hits = Cell::new(0);
    let ok: ResultEnvelope<i32> = ResultEnvelope::Success(3);
    let ok = ok.on_success(|v| hits.set(hits.get() + *v));
    assert_eq!(hits.get(), 3);
    assert!(ok.is_success());

    let err: ResultEnvelope<i32> = ResultEnvelope::ApplicationError { code: 500, message: None };
    err.on_success(|_| hits.set(100));
    assert_eq!(hits.get(), 3);
}

#[test]
fn on_error_and_on_failure_see_their_fields() {
    let seen = Cell::new(0u16);
    let err: ResultEnvelope<()> = ResultEnvelope::ApplicationError {
        code: 401,
        message: Some("Unauthorized".into()),
    };
    err.on_error(|code, message| {
        assert_eq!(message, Some("Unauthorized"));
        seen.set(code);
    })
    .on_failure(|_, _| panic!("not a failure"));
    assert_eq!(seen.get(), 401);

    let kind = Cell::new(None);
    let failure: ResultEnvelope<()> = ResultEnvelope::failure(FailureKind::Timeout, "slow");
    failure.on_failure(|k, detail| {
        assert_eq!(detail, Some("slow"));
        kind.set(Some(k));
    });
    assert_eq!(kind.get(), Some(FailureKind::Timeout));
}

#[test]
fn map_transforms_success_and_keeps_errors() {
    let ok: ResultEnvelope<i32> = ResultEnvelope::Success(2);
    assert_eq!(ok.map(|v| v * 10), ResultEnvelope::Success(20));

    let err: ResultEnvelope<i32> = ResultEnvelope::ApplicationError { code: 404, message: None };
    assert_eq!(err.map(|v| v.to_string()).error_code(), Some(404));
}

#[test]
fn accessors() {
    let ok: ResultEnvelope<&str> = ResultEnvelope::Success("x");
    assert_eq!(ok.success(), Some(&"x"));
    assert_eq!(ok.error_code(), None);
    assert_eq!(ok.failure_kind(), None);
}

#[test]
fn base_response_success_flag() {
    let ok: BaseResponse<()> = BaseResponse::new("success", None);
    assert!(ok.is_success());
    let failed: BaseResponse<()> = BaseResponse::new("error", None);
    assert!(!failed.is_success());
    let empty: BaseResponse<()> = serde_json::from_str("{}").unwrap();
    assert!(!empty.is_success());
}

#[test]
fn token_response_wire_names() {
    let token = TokenResponse::new("abc", "def");
    let json = serde_json::to_value(&token).unwrap();
    assert_eq!(json, serde_json::json!({"token": "abc", "refreshToken": "def"}));
}

#[test]
fn failure_kind_serializes_snake_case() {
    let json = serde_json::to_string(&FailureKind::ConnectionError).unwrap();
    assert_eq!(json, r#""connection_error""#);
}
