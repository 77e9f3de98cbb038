use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// Both fields are required; they are optional here so a missing field is a
/// validation error rather than an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub profile_summary: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

/// POST /api/v1/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload?;
    let request_id = Uuid::new_v4();
    let span = info_span!("chat", %request_id);

    let answer = state
        .chat
        .answer(
            req.question.as_deref().unwrap_or_default(),
            req.profile_summary.as_deref().unwrap_or_default(),
        )
        .instrument(span.clone())
        .await?;

    span.in_scope(|| info!(chars = answer.len(), "Chat answer returned"));
    Ok(Json(ChatResponse { answer }))
}
