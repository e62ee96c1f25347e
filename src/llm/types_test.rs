use super::*;

// =============================================================================
// LlmError::error_code
// =============================================================================

#[test]
fn error_codes_are_stable() {
    let cases = [
        (LlmError::ConfigParse("bad".into()), "E_CONFIG_PARSE"),
        (LlmError::MissingApiKey { var: "KEY".into() }, "E_MISSING_API_KEY"),
        (LlmError::ApiRequest("timeout".into()), "E_API_REQUEST"),
        (LlmError::ApiResponse { status: 500, body: "oops".into() }, "E_API_RESPONSE"),
        (LlmError::ApiParse("json".into()), "E_API_PARSE"),
        (LlmError::HttpClientBuild("tls".into()), "E_HTTP_CLIENT_BUILD"),
    ];
    for (err, code) in cases {
        assert_eq!(err.error_code(), code);
    }
}

// =============================================================================
// LlmError::retryable
// =============================================================================

#[test]
fn retryable_api_request() {
    assert!(LlmError::ApiRequest("conn refused".into()).retryable());
}

#[test]
fn retryable_rate_limit_and_server_errors() {
    for status in [429, 500, 503] {
        let err = LlmError::ApiResponse { status, body: String::new() };
        assert!(err.retryable(), "status {status} should be retryable");
    }
}

#[test]
fn not_retryable_client_errors() {
    for status in [400, 401, 404] {
        let err = LlmError::ApiResponse { status, body: String::new() };
        assert!(!err.retryable(), "status {status} should not be retryable");
    }
}

#[test]
fn not_retryable_parse_or_config() {
    assert!(!LlmError::ApiParse("bad".into()).retryable());
    assert!(!LlmError::MissingApiKey { var: "KEY".into() }.retryable());
}

// =============================================================================
// ChatResponse::text
// =============================================================================

#[test]
fn text_joins_text_blocks_and_skips_thinking() {
    let resp = ChatResponse {
        content: vec![
            ContentBlock::Thinking { thinking: "hmm".into() },
            ContentBlock::Text { text: "{\"a\":".into() },
            ContentBlock::Text { text: "1}".into() },
        ],
        model: "mock".into(),
        stop_reason: "end_turn".into(),
        input_tokens: 0,
        output_tokens: 0,
    };
    assert_eq!(resp.text(), "{\"a\":1}");
}

#[test]
fn content_block_unknown_type_deserializes() {
    let block: ContentBlock = serde_json::from_str(r#"{"type":"server_tool_use","id":"x"}"#).unwrap();
    assert_eq!(block, ContentBlock::Unknown);
}

#[test]
fn message_user_sets_role() {
    let msg = Message::user("hi");
    assert_eq!(msg.role, "user");
    assert_eq!(msg.content, "hi");
}
