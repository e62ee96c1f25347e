//! Content generation: topic or description in, validated content out.
//!
//! DESIGN
//! ======
//! Each generator builds a prompt, makes one LLM call and turns the model's
//! text into a typed value. Teaching content comes back as JSON and goes
//! through [`parse_json_safe`]. Drawing programs come back as code: they are
//! cleaned with the same routine the browser uses, compiled, and dry-run
//! against the SVG backend so a program that cannot draw never reaches a
//! client.

use std::sync::{Arc, OnceLock};

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use canvas::consts::STATIC_RESULT_FRAME;
use canvas::hit::InteractiveShape;
use canvas::script::{self, FrameParams};
use canvas::svg::SvgSurface;
use canvas::theme::Theme;

use crate::curriculum::{self, GradeLevel};
use crate::error::ErrorCode;
use crate::llm::LlmChat;
use crate::llm::types::{ChatResponse, LlmError, Message, ResponseFormat};
use crate::services::prompts;

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;

const DEFAULT_GEN_MAX_TOKENS: u32 = 8192;
const QUIZ_QUESTION_COUNT: usize = 5;
const MAX_TOPIC_CHARS: usize = 200;
const MAX_DESCRIPTION_CHARS: usize = 4000;
const DRY_RUN_WIDTH: f64 = 800.0;
const DRY_RUN_HEIGHT: f64 = 600.0;
const DRY_RUN_COLOR: &str = "#60a5fa";

fn gen_max_tokens() -> u32 {
    static VALUE: OnceLock<u32> = OnceLock::new();
    *VALUE.get_or_init(|| {
        std::env::var("GEN_MAX_TOKENS").map_or(DEFAULT_GEN_MAX_TOKENS, |v| v.parse().unwrap_or(DEFAULT_GEN_MAX_TOKENS))
    })
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("LLM not configured")]
    LlmUnavailable,
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("unusable model output: {0}")]
    ModelOutput(String),
    #[error("generated program rejected: {0}")]
    Program(String),
}

impl ErrorCode for GenerateError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "E_INVALID_INPUT",
            Self::LlmUnavailable => "E_LLM_UNAVAILABLE",
            Self::Llm(err) => err.error_code(),
            Self::ModelOutput(_) => "E_MODEL_OUTPUT",
            Self::Program(_) => "E_PROGRAM",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Llm(err) => err.retryable(),
            // A fresh sample usually fixes a malformed answer.
            Self::ModelOutput(_) | Self::Program(_) => true,
            Self::InvalidInput(_) | Self::LlmUnavailable => false,
        }
    }
}

// =============================================================================
// CONTENT TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub title: String,
    #[serde(deserialize_with = "lines_or_list")]
    pub objectives: Vec<String>,
    #[serde(deserialize_with = "text_or_lines")]
    pub content: String,
}

/// Quiz difficulty tier, serialized with its Macedonian label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "Лесно")]
    Easy,
    #[serde(rename = "Средно")]
    Medium,
    #[serde(rename = "Тешко")]
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
    pub explanation: String,
    pub difficulty: Difficulty,
}

impl QuizQuestion {
    /// At least two options and the answer index points at one of them.
    #[must_use]
    pub fn is_answerable(&self) -> bool {
        self.options.len() >= 2 && self.correct_answer_index < self.options.len() && !self.question.trim().is_empty()
    }
}

/// Lesson-plan document in the official preparation layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub topic: String,
    #[serde(default, deserialize_with = "text_or_lines")]
    pub standards: String,
    #[serde(default, deserialize_with = "text_or_lines")]
    pub content: String,
    #[serde(default, deserialize_with = "text_or_lines")]
    pub intro_activity: String,
    #[serde(default, deserialize_with = "text_or_lines")]
    pub main_activity: String,
    #[serde(default, deserialize_with = "text_or_lines")]
    pub final_activity: String,
    #[serde(default, deserialize_with = "text_or_lines")]
    pub resources: String,
    #[serde(default, deserialize_with = "text_or_lines")]
    pub assessment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
}

/// A drawing program that compiled and survived a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedProgram {
    pub source: String,
    /// Shapes the static frame registers for hit-testing.
    pub shape_count: usize,
}

/// Models sometimes answer a text field with a bullet array.
#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrLines {
    Text(String),
    Lines(Vec<String>),
}

fn text_or_lines<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match TextOrLines::deserialize(deserializer)? {
        TextOrLines::Text(text) => text,
        TextOrLines::Lines(lines) => lines.join("\n"),
    })
}

fn lines_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    match TextOrLines::deserialize(deserializer)? {
        TextOrLines::Lines(lines) => Ok(lines),
        TextOrLines::Text(text) => {
            let lines: Vec<String> = text
                .lines()
                .map(|l| l.trim_start_matches(['-', '*', '•', ' ']).trim().to_owned())
                .filter(|l| !l.is_empty())
                .collect();
            if lines.is_empty() {
                return Err(de::Error::custom("objectives are empty"));
            }
            Ok(lines)
        }
    }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

/// Strip Markdown JSON fences from a model answer.
#[must_use]
pub fn strip_json_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_owned()
}

/// Parse a model's JSON answer.
///
/// Fences are stripped first. When the text does not parse, it is retried
/// once with every backslash replaced by `/` (LaTeX escapes are the usual
/// culprit).
///
/// # Errors
///
/// Returns [`GenerateError::ModelOutput`] when neither attempt parses.
pub fn parse_json_safe<T: DeserializeOwned>(text: &str) -> Result<T, GenerateError> {
    let clean = strip_json_fences(text);
    if clean.is_empty() {
        return Err(GenerateError::ModelOutput("empty response".into()));
    }
    match serde_json::from_str(&clean) {
        Ok(value) => Ok(value),
        Err(first) => {
            warn!(error = %first, "generate: JSON parse failed, retrying without backslashes");
            serde_json::from_str(&clean.replace('\\', "/"))
                .map_err(|_| GenerateError::ModelOutput(format!("invalid JSON: {first}")))
        }
    }
}

// =============================================================================
// INPUT VALIDATION
// =============================================================================

fn require_text(field: &str, raw: &str, max_chars: usize) -> Result<String, GenerateError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(GenerateError::InvalidInput(format!("{field} is required")));
    }
    if text.chars().count() > max_chars {
        return Err(GenerateError::InvalidInput(format!("{field} exceeds {max_chars} characters")));
    }
    Ok(text.to_owned())
}

/// A curriculum id (`vii-rotation`) stands for its topic title.
fn require_topic(raw: &str) -> Result<String, GenerateError> {
    let topic = require_text("topic", raw, MAX_TOPIC_CHARS)?;
    Ok(curriculum::find(&topic).map_or(topic, |t| t.name.to_owned()))
}

/// Only grade VII is covered; absent means VII.
fn require_grade(raw: Option<&str>) -> Result<GradeLevel, GenerateError> {
    match raw.map(str::trim) {
        None | Some("" | "VII") => Ok(GradeLevel::VII),
        Some(other) => Err(GenerateError::InvalidInput(format!("unsupported grade: {other}"))),
    }
}

fn require_llm(llm: Option<&Arc<dyn LlmChat>>) -> Result<&Arc<dyn LlmChat>, GenerateError> {
    llm.ok_or(GenerateError::LlmUnavailable)
}

// =============================================================================
// GENERATORS
// =============================================================================

async fn ask(
    llm: &Arc<dyn LlmChat>,
    kind: &str,
    system: &str,
    prompt: String,
    format: ResponseFormat,
) -> Result<String, GenerateError> {
    let messages = [Message::user(prompt)];
    let response: ChatResponse = llm
        .chat(gen_max_tokens(), system, &messages, format)
        .await?;
    info!(
        kind,
        model = %response.model,
        stop_reason = %response.stop_reason,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "generate: llm response"
    );
    if response.stop_reason == "max_tokens" {
        warn!(kind, "generate: response truncated at max tokens");
    }
    Ok(response.text())
}

/// Generate a lesson for a curriculum topic.
///
/// # Errors
///
/// Invalid input, a missing LLM, an upstream failure or an unusable answer.
pub async fn lesson(llm: Option<&Arc<dyn LlmChat>>, topic: &str, grade: Option<&str>) -> Result<Lesson, GenerateError> {
    let topic = require_topic(topic)?;
    let grade = require_grade(grade)?;
    let llm = require_llm(llm)?;

    let text = ask(
        llm,
        "lesson",
        prompts::SYSTEM_PERSONA,
        prompts::lesson_prompt(&topic, grade.as_str()),
        ResponseFormat::Json,
    )
    .await?;
    let lesson: Lesson = parse_json_safe(&text)?;
    if lesson.title.trim().is_empty() || lesson.content.trim().is_empty() {
        return Err(GenerateError::ModelOutput("lesson is missing a title or content".into()));
    }
    Ok(lesson)
}

/// Generate a multiple-choice quiz.
///
/// Questions whose answer index does not point at an option are dropped.
///
/// # Errors
///
/// Fails like [`lesson`], and with [`GenerateError::ModelOutput`] when no
/// answerable question remains.
pub async fn quiz(
    llm: Option<&Arc<dyn LlmChat>>,
    topic: &str,
    grade: Option<&str>,
) -> Result<Vec<QuizQuestion>, GenerateError> {
    let topic = require_topic(topic)?;
    let grade = require_grade(grade)?;
    let llm = require_llm(llm)?;

    let text = ask(
        llm,
        "quiz",
        prompts::SYSTEM_PERSONA,
        prompts::quiz_prompt(&topic, grade.as_str(), QUIZ_QUESTION_COUNT),
        ResponseFormat::Json,
    )
    .await?;
    parse_quiz(&text)
}

/// Parse and filter a quiz answer. Accepts a bare array or `{"questions": [...]}`.
///
/// # Errors
///
/// [`GenerateError::ModelOutput`] when nothing answerable is left.
pub fn parse_quiz(text: &str) -> Result<Vec<QuizQuestion>, GenerateError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum QuizShape {
        List(Vec<QuizQuestion>),
        Wrapped { questions: Vec<QuizQuestion> },
    }

    let questions = match parse_json_safe::<QuizShape>(text)? {
        QuizShape::List(list) | QuizShape::Wrapped { questions: list } => list,
    };
    let total = questions.len();
    let kept: Vec<QuizQuestion> = questions
        .into_iter()
        .filter(QuizQuestion::is_answerable)
        .collect();
    if kept.len() < total {
        warn!(dropped = total - kept.len(), "generate: dropped unanswerable quiz questions");
    }
    if kept.is_empty() {
        return Err(GenerateError::ModelOutput("quiz has no answerable questions".into()));
    }
    Ok(kept)
}

/// Generate a lesson-plan document.
///
/// # Errors
///
/// Fails like [`lesson`].
pub async fn scenario(llm: Option<&Arc<dyn LlmChat>>, topic: &str) -> Result<Scenario, GenerateError> {
    let topic = require_topic(topic)?;
    let llm = require_llm(llm)?;

    let text = ask(
        llm,
        "scenario",
        prompts::SYSTEM_PERSONA,
        prompts::scenario_prompt(&topic),
        ResponseFormat::Json,
    )
    .await?;
    let mut scenario: Scenario = parse_json_safe(&text)?;
    if scenario.topic.trim().is_empty() {
        scenario.topic = topic;
    }
    if scenario.main_activity.trim().is_empty() {
        return Err(GenerateError::ModelOutput("lesson plan has no main activity".into()));
    }
    Ok(scenario)
}

/// Generate a drawing program from a description.
///
/// # Errors
///
/// Fails like [`lesson`], and with [`GenerateError::Program`] when the
/// cleaned code does not compile or fails its dry run. The dry run runs on
/// the blocking thread pool.
pub async fn program(llm: Option<&Arc<dyn LlmChat>>, description: &str) -> Result<GeneratedProgram, GenerateError> {
    let description = require_text("description", description, MAX_DESCRIPTION_CHARS)?;
    let llm = require_llm(llm)?;

    let text = ask(
        llm,
        "program",
        prompts::GEOMETRY_ENGINE_PERSONA,
        prompts::program_prompt(&description),
        ResponseFormat::Text,
    )
    .await?;
    // CPU-bound: each dry-run frame may use the full step budget.
    tokio::task::spawn_blocking(move || verify_program(&text))
        .await
        .map_err(|e| GenerateError::Program(format!("dry run aborted: {e}")))?
}

/// Clean, compile and dry-run model output.
///
/// The dry run draws the first frame and the static result frame into an
/// off-screen SVG surface; both must complete.
///
/// # Errors
///
/// [`GenerateError::ModelOutput`] for empty code, [`GenerateError::Program`]
/// for compile or runtime failures.
pub fn verify_program(raw: &str) -> Result<GeneratedProgram, GenerateError> {
    let source = script::clean_source(raw);
    if source.is_empty() {
        return Err(GenerateError::ModelOutput("no program text".into()));
    }
    let program = script::compile(&source).map_err(|e| GenerateError::Program(format!("compile: {e}")))?;

    let mut shape_count = 0;
    for frame in [0, STATIC_RESULT_FRAME] {
        let params = FrameParams {
            width: DRY_RUN_WIDTH,
            height: DRY_RUN_HEIGHT,
            frame,
            theme: Theme::Dark,
            show_grid: true,
            primary_color: DRY_RUN_COLOR.to_owned(),
        };
        let mut surface = SvgSurface::new(DRY_RUN_WIDTH, DRY_RUN_HEIGHT, Theme::Dark.background_hex());
        let mut count = 0usize;
        program
            .run(&mut surface, &params, &mut |_: InteractiveShape| count += 1)
            .map_err(|e| GenerateError::Program(format!("frame {frame}: {e}")))?;
        shape_count = count;
    }
    if shape_count == 0 {
        warn!("generate: program registers no interactive shapes");
    }
    Ok(GeneratedProgram { source, shape_count })
}
