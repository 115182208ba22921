use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::enrichment::ChatTurn;
use crate::errors::AppError;
use crate::state::AppState;

/// Prior turns beyond this many are dropped, oldest first.
const MAX_HISTORY_TURNS: usize = 20;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub question: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

/// POST /api/v1/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.question.trim().is_empty() {
        return Err(AppError::Validation("question must not be empty".to_string()));
    }
    let skip = req.history.len().saturating_sub(MAX_HISTORY_TURNS);
    let answer = state
        .gateway
        .converse(req.question.trim(), &req.history[skip..])
        .await?;
    Ok(Json(ChatResponse { answer }))
}
