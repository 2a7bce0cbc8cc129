//! HTTP server for the control plane.
//!
//! Provides endpoints for:
//! - Readiness probe (`/`)
//! - Health check (`/health`)
//! - Build launch (`POST /kaniko`)
//! - Build status (`GET /kaniko?name=...`)

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod handlers;
pub mod responses;

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Build routes
        .route(
            "/kaniko",
            get(handlers::build_status).post(handlers::launch_build),
        )
        // Probe routes
        .route("/", get(handlers::ready))
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
