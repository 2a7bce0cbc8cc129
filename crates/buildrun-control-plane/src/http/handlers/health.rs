//! Probe handlers.

use axum::{response::IntoResponse, Json};

use crate::http::responses::ReadyResponse;

/// Readiness probe.
pub async fn ready() -> impl IntoResponse {
    Json(ReadyResponse {
        status: "ready for jobs".to_string(),
    })
}

/// Health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
