use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::AppState;

pub mod deck;
pub mod lessons;
pub mod settings;
pub mod words;

/// GET /health - liveness plus a storage round trip.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.services.settings().load().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "storage": "ok" })),
        ),
        Err(err) => {
            tracing::warn!("storage health check failed: {err}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "storage": err.to_string() })),
            )
        }
    }
}
