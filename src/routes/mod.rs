//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! JSON API under `/api` plus `/healthz`. When a static directory is
//! configured (the built web client with the wasm visualizer bundle) it is
//! served as the fallback, so the page and the API share one origin.

pub mod content;

use std::path::Path;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

/// API routes shared by the web client and the wasm visualizer.
fn api_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/curriculum", get(content::curriculum))
        .route("/api/lessons", post(content::create_lesson))
        .route("/api/quizzes", post(content::create_quiz))
        .route("/api/scenarios", post(content::create_scenario))
        .route("/api/visualizer/program", post(content::create_program))
        .route("/api/visualizer/examples", get(content::examples))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
}

/// Full application router.
pub fn app(state: AppState, static_dir: Option<&Path>) -> Router {
    let router = api_routes(state);
    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true)),
        None => router,
    };
    router
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
