//! Chat endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use std::time::Instant;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{ChatRequest, ChatResponse};

/// POST /api/sessions/:id/chat - Answer one question
pub async fn chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let start = Instant::now();

    if request.question.trim().is_empty() {
        return Err(Error::InvalidRequest("question must not be empty".to_string()));
    }

    // Held for the whole turn so turns of one session never interleave
    let mut session = state.sessions().lock(id).await?;

    let turn_index = state
        .orchestrator()
        .handle_turn(&mut session, &request.question)
        .await;
    let turn = session.turn(turn_index)?.clone();

    let processing_time_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        "Session {} turn {} answered in {}ms",
        id,
        turn_index,
        processing_time_ms
    );

    Ok(Json(ChatResponse {
        turn_index,
        turn,
        query_count: session.query_count,
        processing_time_ms,
    }))
}
