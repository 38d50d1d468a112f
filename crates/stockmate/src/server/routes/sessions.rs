//! Session lifecycle endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::chat::Session;
use crate::error::Result;
use crate::server::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedSession {
    pub session_id: Uuid,
}

/// POST /api/sessions - Start a conversation
pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<CreatedSession>) {
    let session_id = state.sessions().create();
    tracing::info!("Session {} started ({} active)", session_id, state.sessions().len());
    (StatusCode::CREATED, Json(CreatedSession { session_id }))
}

/// GET /api/sessions/:id - History and query count
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>> {
    let handle = state.sessions().get(id)?;
    let session = handle.lock().await;
    Ok(Json(session.clone()))
}

/// DELETE /api/sessions/:id - End a conversation
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.sessions().remove(id)?;
    tracing::info!("Session {} ended", id);
    Ok(StatusCode::NO_CONTENT)
}
