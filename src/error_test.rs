use super::*;

#[derive(Debug)]
struct Flaky;

impl std::fmt::Display for Flaky {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("upstream hiccup")
    }
}

impl ErrorCode for Flaky {
    fn error_code(&self) -> &'static str {
        "E_FLAKY"
    }

    fn retryable(&self) -> bool {
        true
    }
}

#[derive(Debug)]
struct Plain;

impl std::fmt::Display for Plain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("plain")
    }
}

impl ErrorCode for Plain {
    fn error_code(&self) -> &'static str {
        "E_PLAIN"
    }
}

#[test]
fn body_carries_code_message_and_retryable() {
    let body = ErrorBody::from_error(&Flaky);
    assert_eq!(body.code, "E_FLAKY");
    assert_eq!(body.message, "upstream hiccup");
    assert!(body.retryable);
}

#[test]
fn retryable_defaults_to_false() {
    assert!(!ErrorBody::from_error(&Plain).retryable);
}

#[test]
fn error_response_uses_given_status() {
    let resp = error_response(StatusCode::BAD_GATEWAY, &Flaky);
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn body_serializes_with_flat_fields() {
    let json = serde_json::to_value(ErrorBody::from_error(&Plain)).unwrap();
    assert_eq!(json, serde_json::json!({ "code": "E_PLAIN", "message": "plain", "retryable": false }));
}
