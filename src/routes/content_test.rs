use super::*;
use crate::llm::types::LlmError;

#[test]
fn invalid_input_is_bad_request() {
    let err = GenerateError::InvalidInput("topic is required".into());
    assert_eq!(generate_error_to_status(&err), StatusCode::BAD_REQUEST);
}

#[test]
fn missing_llm_is_service_unavailable() {
    assert_eq!(generate_error_to_status(&GenerateError::LlmUnavailable), StatusCode::SERVICE_UNAVAILABLE);
}

#[test]
fn upstream_failure_is_bad_gateway() {
    let err = GenerateError::Llm(LlmError::ApiResponse { status: 500, body: String::new() });
    assert_eq!(generate_error_to_status(&err), StatusCode::BAD_GATEWAY);
}

#[test]
fn unusable_output_is_unprocessable() {
    assert_eq!(generate_error_to_status(&GenerateError::ModelOutput("x".into())), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(generate_error_to_status(&GenerateError::Program("x".into())), StatusCode::UNPROCESSABLE_ENTITY);
}

#[test]
fn topic_body_grade_is_optional() {
    let body: TopicBody = serde_json::from_str(r#"{"topic":"Ротација"}"#).unwrap();
    assert_eq!(body.topic, "Ротација");
    assert!(body.grade.is_none());
}
