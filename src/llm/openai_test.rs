use super::*;

// ===== chat completions =====

#[test]
fn cc_parse_text_response() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "Hello!" },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert!(matches!(&resp.content[0], ContentBlock::Text { text } if text == "Hello!"));
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 10);
    assert_eq!(resp.output_tokens, 5);
    assert_eq!(resp.model, "gpt-4o");
}

#[test]
fn cc_parse_length_is_max_tokens() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [{ "message": { "content": "{\"title\":" }, "finish_reason": "length" }]
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.stop_reason, "max_tokens");
}

#[test]
fn cc_parse_null_content_is_empty() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [{ "message": { "content": null }, "finish_reason": "stop" }]
    })
    .to_string();
    assert!(parse_chat_completions_response(&json).unwrap().content.is_empty());
}

#[test]
fn cc_parse_missing_choices() {
    let json = serde_json::json!({ "model": "gpt-4o", "choices": [] }).to_string();
    assert!(parse_chat_completions_response(&json).is_err());
}

#[test]
fn cc_messages_lead_with_system() {
    let messages = [Message::user("draw a circle")];
    let msgs = build_chat_completions_messages("be brief", &messages);
    assert_eq!(msgs.len(), 2);
    assert_eq!(msgs[0].role, "system");
    assert_eq!(msgs[1].content, "draw a circle");
}

#[test]
fn cc_messages_skip_blank_system() {
    let messages = [Message::user("x")];
    assert_eq!(build_chat_completions_messages("  ", &messages).len(), 1);
}

#[test]
fn cc_request_sets_json_object_format() {
    let messages = [Message::user("x")];
    let msgs = build_chat_completions_messages("", &messages);
    let body = CcRequest {
        model: "gpt-4o",
        max_tokens: 10,
        messages: &msgs,
        response_format: json_format(ResponseFormat::Json),
    };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["response_format"]["type"], "json_object");

    let body = CcRequest { model: "gpt-4o", max_tokens: 10, messages: &msgs, response_format: None };
    let json = serde_json::to_value(&body).unwrap();
    assert!(json.get("response_format").is_none());
}

// ===== responses API =====

#[test]
fn resp_parse_text_response() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "output": [{
            "type": "message",
            "content": [{ "type": "output_text", "text": "Done!" }]
        }],
        "usage": { "input_tokens": 15, "output_tokens": 8 }
    })
    .to_string();
    let resp = parse_responses_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert!(matches!(&resp.content[0], ContentBlock::Text { text } if text == "Done!"));
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 15);
}

#[test]
fn resp_parse_skips_reasoning_items() {
    let json = serde_json::json!({
        "model": "o4-mini",
        "output": [
            { "type": "reasoning", "summary": [] },
            { "type": "message", "content": [{ "type": "output_text", "text": "ok" }] }
        ]
    })
    .to_string();
    let resp = parse_responses_response(&json).unwrap();
    assert_eq!(resp.text(), "ok");
}

#[test]
fn resp_parse_output_text_fallback() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "output_text": "Fallback text",
        "usage": { "input_tokens": 5, "output_tokens": 3 }
    })
    .to_string();
    let resp = parse_responses_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert!(matches!(&resp.content[0], ContentBlock::Text { text } if text == "Fallback text"));
}

#[test]
fn resp_parse_incomplete_is_max_tokens() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "output": [],
        "incomplete_details": { "reason": "max_output_tokens" }
    })
    .to_string();
    assert_eq!(parse_responses_response(&json).unwrap().stop_reason, "max_tokens");
}

#[test]
fn resp_input_marks_assistant_turns_as_output_text() {
    let messages = [Message::user("q"), Message { role: "assistant".into(), content: "a".into() }];
    let input = build_responses_input(&messages);
    let json = serde_json::to_value(&input).unwrap();
    assert_eq!(json[0]["type"], "message");
    assert_eq!(json[0]["content"][0]["type"], "input_text");
    assert_eq!(json[1]["content"][0]["type"], "output_text");
}
