//! Route handlers

use axum::{extract::State, Json};
use serde_json::json;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{AnswerResponse, QueryRequest};

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

/// POST / - answer a question
///
/// Recoverable failures (generation errors, low-quality answers) are absorbed
/// inside the pipeline; anything surfacing here becomes a JSON error body via
/// the `IntoResponse` impl on `Error`.
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<AnswerResponse>> {
    tracing::info!("Question: \"{}\"", request.question);
    let response = state
        .context()
        .answer(&request.question, request.image.as_deref())
        .await?;
    Ok(Json(response))
}
