//! API routes for the chatbot server

pub mod chat;
pub mod feedback;
pub mod sessions;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Sessions
        .route("/sessions", post(sessions::create_session))
        .route(
            "/sessions/:id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        // Chat
        .route("/sessions/:id/chat", post(chat::chat))
        // Feedback
        .route(
            "/sessions/:id/turns/:index/feedback",
            post(feedback::submit_feedback),
        )
        .route("/feedback/export", get(feedback::export_feedback))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let orchestrator = state.orchestrator();
    Json(serde_json::json!({
        "name": "stockmate",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Inventory chatbot answering from the inventory database and policy documents",
        "model": state.config().completion.model,
        "database": orchestrator.runner_name(),
        "retrieval_available": orchestrator.retrieval_available(),
        "active_sessions": state.sessions().len(),
        "endpoints": {
            "POST /api/sessions": "Start a chat session",
            "GET /api/sessions/:id": "Session history and query count",
            "DELETE /api/sessions/:id": "End a chat session",
            "POST /api/sessions/:id/chat": "Ask a question",
            "POST /api/sessions/:id/turns/:index/feedback": "Rate an answer (helpful / not_useful)",
            "GET /api/feedback/export": "Download the last 30 days of feedback as XLSX",
            "GET /api/info": "This information",
            "GET /health": "Health check",
            "GET /ready": "Readiness check",
        }
    }))
}
