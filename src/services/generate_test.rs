use super::*;
use crate::state::test_helpers::MockLlm;

const CIRCLE_PROGRAM: &str = "
const cx = width / 2, cy = height / 2;
const R = Math.min(width, height) * 0.3;
ctx.strokeStyle = primaryColor;
ctx.lineWidth = 3;
drawRotated(cx, cy, frame * 0.02, () => {
    ctx.beginPath();
    ctx.arc(cx, cy, R, 0, Math.PI * 2);
    ctx.stroke();
});
registerShape('O', { type: 'point', x: cx, y: cy }, 'Центар O');
registerShape('k', { type: 'circle', x: cx, y: cy, r: R }, 'Кружница k');
";

fn llm(mock: &Arc<MockLlm>) -> Arc<dyn LlmChat> {
    Arc::clone(mock) as Arc<dyn LlmChat>
}

// =========================================================================
// parse_json_safe
// =========================================================================

#[test]
fn parse_json_strips_fences() {
    let text = "```json\n{\"title\":\"Агли\",\"objectives\":[\"a\"],\"content\":\"c\"}\n```";
    let lesson: Lesson = parse_json_safe(text).unwrap();
    assert_eq!(lesson.title, "Агли");
}

#[test]
fn parse_json_falls_back_to_forward_slashes() {
    // `\p` is not a valid JSON escape.
    let text = r#"{"title":"Плоштина","objectives":["π"],"content":"P = r\pi"}"#;
    let lesson: Lesson = parse_json_safe(text).unwrap();
    assert_eq!(lesson.content, "P = r/pi");
}

#[test]
fn parse_json_keeps_valid_escapes_on_first_try() {
    let text = r#"{"title":"T","objectives":["a"],"content":"ред 1\nред 2"}"#;
    let lesson: Lesson = parse_json_safe(text).unwrap();
    assert_eq!(lesson.content, "ред 1\nред 2");
}

#[test]
fn parse_json_rejects_garbage() {
    let err = parse_json_safe::<Lesson>("Извини, не можам.").unwrap_err();
    assert!(matches!(err, GenerateError::ModelOutput(_)));
    assert_eq!(err.error_code(), "E_MODEL_OUTPUT");
}

#[test]
fn parse_json_rejects_empty() {
    let err = parse_json_safe::<Lesson>("```json\n```").unwrap_err();
    assert!(matches!(err, GenerateError::ModelOutput(ref m) if m.contains("empty")));
}

#[test]
fn lesson_objectives_accept_bullet_text() {
    let text = r#"{"title":"T","objectives":"- прво\n- второ\n\n* трето","content":"c"}"#;
    let lesson: Lesson = parse_json_safe(text).unwrap();
    assert_eq!(lesson.objectives, vec!["прво", "второ", "трето"]);
}

#[test]
fn scenario_joins_list_fields_and_tolerates_missing_ones() {
    let text = r#"{"topic":"Ротација","standards":["• прв","• втор"],"mainActivity":"работа во групи"}"#;
    let scenario: Scenario = parse_json_safe(text).unwrap();
    assert_eq!(scenario.standards, "• прв\n• втор");
    assert_eq!(scenario.main_activity, "работа во групи");
    assert!(scenario.resources.is_empty());
    assert!(scenario.image_prompt.is_none());
}

// =========================================================================
// parse_quiz
// =========================================================================

fn question(options: usize, correct: usize) -> serde_json::Value {
    serde_json::json!({
        "question": "Колку степени има правиот агол?",
        "options": (0..options).map(|i| format!("{}°", 90 + i)).collect::<Vec<_>>(),
        "correctAnswerIndex": correct,
        "explanation": "Правиот агол има 90°.",
        "difficulty": "Лесно"
    })
}

#[test]
fn quiz_keeps_answerable_questions() {
    let text = serde_json::json!([question(4, 0), question(4, 3)]).to_string();
    let quiz = parse_quiz(&text).unwrap();
    assert_eq!(quiz.len(), 2);
    assert_eq!(quiz[0].difficulty, Difficulty::Easy);
    assert_eq!(quiz[1].correct_answer_index, 3);
}

#[test]
fn quiz_drops_out_of_range_answers() {
    let text = serde_json::json!([question(4, 0), question(3, 3), question(1, 0)]).to_string();
    assert_eq!(parse_quiz(&text).unwrap().len(), 1);
}

#[test]
fn quiz_accepts_wrapped_list() {
    let text = serde_json::json!({ "questions": [question(2, 1)] }).to_string();
    assert_eq!(parse_quiz(&text).unwrap().len(), 1);
}

#[test]
fn quiz_with_nothing_answerable_is_model_output_error() {
    let text = serde_json::json!([question(4, 9)]).to_string();
    assert!(matches!(parse_quiz(&text), Err(GenerateError::ModelOutput(_))));
}

#[test]
fn quiz_rejects_unknown_difficulty() {
    let mut q = question(4, 0);
    q["difficulty"] = "Невозможно".into();
    let text = serde_json::json!([q]).to_string();
    assert!(parse_quiz(&text).is_err());
}

#[test]
fn difficulty_serializes_with_macedonian_label() {
    assert_eq!(serde_json::to_value(Difficulty::Hard).unwrap(), "Тешко");
    assert_eq!(serde_json::to_value(Difficulty::Medium).unwrap(), "Средно");
}

// =========================================================================
// verify_program
// =========================================================================

#[test]
fn verify_accepts_working_program() {
    let program = verify_program(CIRCLE_PROGRAM).unwrap();
    assert_eq!(program.shape_count, 2);
    assert!(program.source.starts_with("const cx"));
}

#[test]
fn verify_cleans_fences_and_wrapper() {
    let raw = format!("```javascript\nfunction draw() {{{CIRCLE_PROGRAM}}}\n```");
    let program = verify_program(&raw).unwrap();
    assert!(!program.source.contains("function draw"));
    assert!(!program.source.contains("```"));
    assert_eq!(program.shape_count, 2);
}

#[test]
fn verify_reports_compile_errors() {
    let err = verify_program("ctx.beginPath(;").unwrap_err();
    assert!(matches!(err, GenerateError::Program(ref m) if m.starts_with("compile: line 1:")));
    assert_eq!(err.error_code(), "E_PROGRAM");
}

#[test]
fn verify_reports_runtime_errors() {
    let err = verify_program("ctx.beginPath();\ndocument.body;").unwrap_err();
    assert!(matches!(err, GenerateError::Program(ref m) if m.contains("document is not defined")));
}

#[test]
fn verify_runs_the_static_result_frame() {
    // Fine on frame 0, fails once the animation has moved on.
    let err = verify_program("if (frame > 100) { missing(); }").unwrap_err();
    assert!(matches!(err, GenerateError::Program(ref m) if m.contains("frame 6000")));
}

#[test]
fn verify_rejects_empty_code() {
    assert!(matches!(verify_program("```js\n```"), Err(GenerateError::ModelOutput(_))));
}

// =========================================================================
// GenerateError
// =========================================================================

#[test]
fn error_codes_and_retryable() {
    assert_eq!(GenerateError::InvalidInput("x".into()).error_code(), "E_INVALID_INPUT");
    assert_eq!(GenerateError::LlmUnavailable.error_code(), "E_LLM_UNAVAILABLE");
    assert!(!GenerateError::LlmUnavailable.retryable());
    assert!(GenerateError::ModelOutput("x".into()).retryable());

    let upstream = GenerateError::from(LlmError::ApiResponse { status: 429, body: String::new() });
    assert_eq!(upstream.error_code(), "E_API_RESPONSE");
    assert!(upstream.retryable());
}

// =========================================================================
// generators (with MockLlm)
// =========================================================================

#[tokio::test]
async fn lesson_uses_persona_and_json_mode() {
    let mock = MockLlm::replying(r#"{"title":"Кружница","objectives":["a","b","c"],"content":"**Кружница** е ..."}"#);
    let lesson = lesson(Some(&llm(&mock)), "2.1 Кружница, круг, кружен лак", None)
        .await
        .unwrap();
    assert_eq!(lesson.title, "Кружница");
    assert_eq!(lesson.objectives.len(), 3);

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].system, prompts::SYSTEM_PERSONA);
    assert_eq!(calls[0].format, ResponseFormat::Json);
    assert!(calls[0].prompt.contains("\"2.1 Кружница, круг, кружен лак\""));
    assert!(calls[0].prompt.contains("VII одделение"));
}

#[tokio::test]
async fn lesson_without_title_is_rejected() {
    let mock = MockLlm::replying(r#"{"title":" ","objectives":["a"],"content":"c"}"#);
    let err = lesson(Some(&llm(&mock)), "Агли", None).await.unwrap_err();
    assert!(matches!(err, GenerateError::ModelOutput(_)));
}

#[tokio::test]
async fn blank_topic_is_invalid_before_calling_llm() {
    let mock = MockLlm::replying("{}");
    let err = lesson(Some(&llm(&mock)), "   ", None).await.unwrap_err();
    assert!(matches!(err, GenerateError::InvalidInput(_)));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn oversized_topic_is_invalid() {
    let topic = "а".repeat(MAX_TOPIC_CHARS + 1);
    let err = quiz(None, &topic, None).await.unwrap_err();
    assert!(matches!(err, GenerateError::InvalidInput(ref m) if m.contains("exceeds")));
}

#[tokio::test]
async fn unsupported_grade_is_invalid() {
    let err = quiz(None, "Агли", Some("VIII")).await.unwrap_err();
    assert!(matches!(err, GenerateError::InvalidInput(ref m) if m.contains("VIII")));
}

#[tokio::test]
async fn missing_llm_is_unavailable() {
    let err = scenario(None, "Ротација").await.unwrap_err();
    assert!(matches!(err, GenerateError::LlmUnavailable));
}

#[tokio::test]
async fn upstream_failure_is_wrapped() {
    let mock = Arc::new(MockLlm::new(vec![Err(LlmError::ApiRequest("timeout".into()))]));
    let err = quiz(Some(&llm(&mock)), "Агли", Some("VII")).await.unwrap_err();
    assert!(matches!(err, GenerateError::Llm(LlmError::ApiRequest(_))));
    assert!(err.retryable());
}

#[tokio::test]
async fn quiz_asks_for_five_questions() {
    let reply = serde_json::json!([question(4, 1)]).to_string();
    let mock = MockLlm::replying(&reply);
    let quiz = quiz(Some(&llm(&mock)), "Централен агол", None).await.unwrap();
    assert_eq!(quiz.len(), 1);
    assert!(mock.calls()[0].prompt.starts_with("Генерирај 5 прашања"));
}

#[tokio::test]
async fn scenario_fills_missing_topic() {
    let mock = MockLlm::replying(r#"{"mainActivity":"Учениците цртаат агли."}"#);
    let scenario = scenario(Some(&llm(&mock)), "2.10 Централен агол").await.unwrap();
    assert_eq!(scenario.topic, "2.10 Централен агол");
}

#[tokio::test]
async fn scenario_without_main_activity_is_rejected() {
    let mock = MockLlm::replying(r#"{"topic":"T"}"#);
    let err = scenario(Some(&llm(&mock)), "T").await.unwrap_err();
    assert!(matches!(err, GenerateError::ModelOutput(_)));
}

#[tokio::test]
async fn program_uses_engine_persona_and_text_mode() {
    let reply = format!("```js\n{CIRCLE_PROGRAM}\n```");
    let mock = MockLlm::replying(&reply);
    let program = program(Some(&llm(&mock)), "Кружница која пулсира").await.unwrap();
    assert_eq!(program.shape_count, 2);

    let calls = mock.calls();
    assert_eq!(calls[0].system, prompts::GEOMETRY_ENGINE_PERSONA);
    assert_eq!(calls[0].format, ResponseFormat::Text);
    assert!(calls[0].prompt.contains("INPUT: \"Кружница која пулсира\""));
}

#[tokio::test]
async fn program_that_does_not_compile_is_rejected() {
    let mock = MockLlm::replying("const x = ;");
    let err = program(Some(&llm(&mock)), "триаголник").await.unwrap_err();
    assert!(matches!(err, GenerateError::Program(_)));
}

#[tokio::test]
async fn program_exhausting_step_budget_is_rejected() {
    let mock = MockLlm::replying("registerShape('A', { type: 'point', x: 0, y: 0 });\nwhile (true) {}");
    let err = program(Some(&llm(&mock)), "бесконечна анимација").await.unwrap_err();
    assert!(matches!(err, GenerateError::Program(ref m) if m.contains("frame 0") && m.contains("budget")), "{err}");
    assert_eq!(err.error_code(), "E_PROGRAM");
}

#[tokio::test(flavor = "current_thread")]
async fn dry_run_leaves_the_runtime_responsive() {
    let mock = MockLlm::replying("while (true) {}");
    let ticker = tokio::spawn(async {
        tokio::task::yield_now().await;
    });
    let err = program(Some(&llm(&mock)), "бесконечна анимација").await.unwrap_err();
    assert!(matches!(err, GenerateError::Program(_)));
    assert!(ticker.is_finished(), "other tasks ran while the dry run was busy");
}

#[tokio::test]
async fn curriculum_id_expands_to_topic_title() {
    let mock = MockLlm::replying(r#"{"mainActivity":"Ротирај го триаголникот."}"#);
    let scenario = scenario(Some(&llm(&mock)), "vii-rotation").await.unwrap();
    assert_eq!(scenario.topic, "2.28 Ротација");
    assert!(mock.calls()[0].prompt.contains("\"2.28 Ротација\""));
}
