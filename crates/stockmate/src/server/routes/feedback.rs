//! Feedback and export endpoints

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Local;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::feedback::{export_recent, EXPORT_FILE_NAME, XLSX_CONTENT_TYPE};
use crate::server::state::AppState;
use crate::types::{FeedbackRecord, FeedbackRequest};

#[derive(Debug, Serialize)]
pub struct FeedbackAck {
    pub status: &'static str,
    pub feedback: &'static str,
}

/// POST /api/sessions/:id/turns/:index/feedback - Rate a displayed turn
pub async fn submit_feedback(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<FeedbackAck>> {
    let record = {
        let handle = state.sessions().get(id)?;
        let session = handle.lock().await;
        let turn = session.turn(index)?;
        FeedbackRecord::new(&turn.question, &turn.answer, request.feedback)
    };

    let log_state = state.clone();
    tokio::task::spawn_blocking(move || log_state.feedback().append(&record))
        .await
        .map_err(|e| Error::internal(format!("Task join error: {}", e)))??;

    Ok(Json(FeedbackAck {
        status: "recorded",
        feedback: request.feedback.as_str(),
    }))
}

/// GET /api/feedback/export - Download the last window of feedback as XLSX
pub async fn export_feedback(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let window_days = state.config().feedback.export_window_days;
    let export_state = state.clone();

    let bytes = tokio::task::spawn_blocking(move || {
        export_recent(export_state.feedback(), Local::now().naive_local(), window_days)
    })
    .await
    .map_err(|e| Error::internal(format!("Task join error: {}", e)))??;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ),
        ],
        bytes,
    ))
}
