//! Content-generation routes.
//!
//! Every handler validates through the generation service and maps its
//! typed error onto a status code plus the shared JSON error body.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;

use crate::curriculum::{CURRICULUM, Topic};
use crate::error::{ErrorCode, error_response};
use crate::services::generate::{self, GenerateError, GeneratedProgram, Lesson, QuizQuestion, Scenario};
use crate::services::prompts::EXAMPLE_DESCRIPTIONS;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TopicBody {
    pub topic: String,
    #[serde(default)]
    pub grade: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DescriptionBody {
    pub description: String,
}

type ApiResult<T> = Result<Json<T>, Response>;

pub(crate) fn generate_error_to_status(err: &GenerateError) -> StatusCode {
    match err {
        GenerateError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        GenerateError::LlmUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        GenerateError::Llm(_) => StatusCode::BAD_GATEWAY,
        GenerateError::ModelOutput(_) | GenerateError::Program(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn reject(err: GenerateError) -> Response {
    let status = generate_error_to_status(&err);
    if status.is_server_error() {
        tracing::warn!(code = err.error_code(), error = %err, "generate: request failed");
    }
    error_response(status, &err)
}

/// Unwrap a JSON body, turning extractor rejections into `E_INVALID_INPUT`.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|rejection| reject(GenerateError::InvalidInput(rejection.body_text())))
}

/// `GET /api/curriculum`: fixed topic list.
pub async fn curriculum() -> Json<&'static [Topic]> {
    Json(CURRICULUM)
}

/// `GET /api/visualizer/examples`: sample descriptions for the visualizer.
pub async fn examples() -> Json<[&'static str; 5]> {
    Json(EXAMPLE_DESCRIPTIONS)
}

/// `POST /api/lessons`: generate a lesson for a topic.
pub async fn create_lesson(State(state): State<AppState>, payload: Result<Json<TopicBody>, JsonRejection>) -> ApiResult<Lesson> {
    let body = body(payload)?;
    generate::lesson(state.llm.as_ref(), &body.topic, body.grade.as_deref())
        .await
        .map(Json)
        .map_err(reject)
}

/// `POST /api/quizzes`: generate a multiple-choice quiz.
pub async fn create_quiz(
    State(state): State<AppState>,
    payload: Result<Json<TopicBody>, JsonRejection>,
) -> ApiResult<Vec<QuizQuestion>> {
    let body = body(payload)?;
    generate::quiz(state.llm.as_ref(), &body.topic, body.grade.as_deref())
        .await
        .map(Json)
        .map_err(reject)
}

/// `POST /api/scenarios`: generate a lesson-plan document.
pub async fn create_scenario(
    State(state): State<AppState>,
    payload: Result<Json<TopicBody>, JsonRejection>,
) -> ApiResult<Scenario> {
    let body = body(payload)?;
    generate::scenario(state.llm.as_ref(), &body.topic)
        .await
        .map(Json)
        .map_err(reject)
}

/// `POST /api/visualizer/program`: generate a verified drawing program.
pub async fn create_program(
    State(state): State<AppState>,
    payload: Result<Json<DescriptionBody>, JsonRejection>,
) -> ApiResult<GeneratedProgram> {
    let body = body(payload)?;
    generate::program(state.llm.as_ref(), &body.description)
        .await
        .map(Json)
        .map_err(reject)
}

#[cfg(test)]
#[path = "content_test.rs"]
mod tests;
