use super::*;

fn make_response(parts: serde_json::Value, finish: &str) -> String {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": parts },
            "finishReason": finish
        }],
        "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 34 },
        "modelVersion": "gemini-3-flash-preview"
    })
    .to_string()
}

#[test]
fn parse_text_response() {
    let json = make_response(serde_json::json!([{ "text": "[{\"question\":\"?\"}]" }]), "STOP");
    let resp = parse_response(&json, "requested").unwrap();
    assert_eq!(resp.text(), "[{\"question\":\"?\"}]");
    assert_eq!(resp.model, "gemini-3-flash-preview");
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 12);
    assert_eq!(resp.output_tokens, 34);
}

#[test]
fn parse_skips_thought_parts() {
    let json = make_response(
        serde_json::json!([{ "text": "thinking...", "thought": true }, { "text": "answer" }]),
        "STOP",
    );
    let resp = parse_response(&json, "m").unwrap();
    assert_eq!(resp.content.len(), 1);
    assert_eq!(resp.text(), "answer");
}

#[test]
fn parse_max_tokens_finish() {
    let json = make_response(serde_json::json!([{ "text": "{" }]), "MAX_TOKENS");
    assert_eq!(parse_response(&json, "m").unwrap().stop_reason, "max_tokens");
}

#[test]
fn parse_falls_back_to_requested_model() {
    let json = serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": "x" }] } }]
    })
    .to_string();
    let resp = parse_response(&json, "gemini-x").unwrap();
    assert_eq!(resp.model, "gemini-x");
    assert_eq!(resp.input_tokens, 0);
}

#[test]
fn parse_blocked_prompt_reports_reason() {
    let json = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } }).to_string();
    let err = parse_response(&json, "m").unwrap_err();
    assert!(matches!(err, LlmError::ApiParse(ref msg) if msg.contains("SAFETY")));
}

#[test]
fn parse_invalid_json() {
    assert!(matches!(parse_response("<html>", "m"), Err(LlmError::ApiParse(_))));
}

#[test]
fn request_maps_roles_and_json_mode() {
    let messages = [Message::user("q"), Message { role: "assistant".into(), content: "a".into() }];
    let body = build_request(512, "persona", &messages, ResponseFormat::Json);
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["systemInstruction"]["parts"][0]["text"], "persona");
    assert!(json["systemInstruction"].get("role").is_none());
    assert_eq!(json["contents"][0]["role"], "user");
    assert_eq!(json["contents"][1]["role"], "model");
    assert_eq!(json["generationConfig"]["maxOutputTokens"], 512);
    assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
}

#[test]
fn request_text_mode_omits_mime_type() {
    let messages = [Message::user("q")];
    let body = build_request(64, "", &messages, ResponseFormat::Text);
    let json = serde_json::to_value(&body).unwrap();
    assert!(json.get("systemInstruction").is_none());
    assert!(json["generationConfig"].get("responseMimeType").is_none());
}
