//! Generation requests against the content server.
//!
//! Only compiled with the `remote` feature. The server cleans and verifies
//! the program before answering, but the engine cleans and compiles it again
//! on arrival.

use serde::{Deserialize, Serialize};

/// Path of the drawing-program endpoint.
pub const PROGRAM_PATH: &str = "/api/visualizer/program";

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("{code}: {message}")]
    Server { code: String, message: String },
    #[error("server returned status {0}")]
    Status(u16),
    #[error("invalid response body: {0}")]
    Body(String),
}

#[derive(Serialize)]
struct ProgramRequest<'a> {
    description: &'a str,
}

#[derive(Deserialize)]
struct ProgramResponse {
    source: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Ask the server at `base` for a drawing program matching `description`.
///
/// # Errors
///
/// Returns a [`RemoteError`] for transport failures, non-success statuses
/// (with the server's error code when it sent one) and malformed bodies.
pub async fn generate_program(base: &str, description: &str) -> Result<String, RemoteError> {
    let url = format!("{base}{PROGRAM_PATH}");
    let resp = gloo_net::http::Request::post(&url)
        .json(&ProgramRequest { description })
        .map_err(|e| RemoteError::Request(e.to_string()))?
        .send()
        .await
        .map_err(|e| RemoteError::Request(e.to_string()))?;

    let status = resp.status();
    if !(200..300).contains(&status) {
        return Err(match resp.json::<ErrorBody>().await {
            Ok(body) => RemoteError::Server { code: body.code, message: body.message },
            Err(_) => RemoteError::Status(status),
        });
    }

    let body: ProgramResponse = resp.json().await.map_err(|e| RemoteError::Body(e.to_string()))?;
    log::debug!("received drawing program ({} bytes)", body.source.len());
    Ok(body.source)
}
