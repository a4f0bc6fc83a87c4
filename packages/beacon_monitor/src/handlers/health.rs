use axum::{Json, extract::State, response::IntoResponse};

use crate::AppState;

/// Health check endpoint - returns relay status
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "subscribers": state.relay.subscriber_count(),
        "uptime_secs": state.started_at.elapsed().as_secs(),
    }))
}

/// Liveness probe - returns 200 if the server is running
pub async fn health_live_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "alive" }))
}
