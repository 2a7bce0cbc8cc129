//! Build launch and status handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{debug, error, info, warn};

use buildrun_core::{BuildRequest, QueryError, TaskStatus};

use crate::http::responses::{BuildStatusResponse, ErrorResponse, LaunchResponse, StatusQuery};
use crate::state::AppState;

/// Launch a build.
///
/// Validates the request, derives the task descriptor and dispatches it.
/// Bodies that do not parse get the same JSON error shape as invalid ones.
pub async fn launch_build(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BuildRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Malformed build request");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Invalid request: {}", rejection.body_text()),
                }),
            )
                .into_response();
        }
    };

    if let Err(e) = req.validate() {
        warn!(name = %req.name, error = %e, "Invalid build request");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Invalid request: {}", e),
            }),
        )
            .into_response();
    }

    info!(name = %req.name, namespace = %state.namespace(), "Launching build");

    match state.dispatcher.submit(&req).await {
        Ok(handle) => {
            let message = format!("{} launched successfully as {}", req.name, handle.name);
            info!(name = %req.name, task = %handle.name, "{}", message);
            (
                StatusCode::OK,
                Json(LaunchResponse {
                    message,
                    name: handle.name.into_inner(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            let message = format!("Failed to launch {}: {}", req.name, e);
            error!(name = %req.name, error = %e, "Failed to launch build");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: message }),
            )
                .into_response()
        }
    }
}

/// Report the live status of a build.
pub async fn build_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> impl IntoResponse {
    let name = query.name;

    let status = match state.translator.query(&name).await {
        Ok(status) => status,
        Err(QueryError::NotFound(_)) => {
            debug!(name = %name, "Build not found");
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Build {} not found", name),
                }),
            )
                .into_response();
        }
        Err(e) => {
            error!(name = %name, error = %e, "Failed to get build status");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to get build status for {}: {}", name, e),
                }),
            )
                .into_response();
        }
    };

    let (code, message) = match status {
        TaskStatus::Succeeded => (StatusCode::OK, format!("{} completed successfully", name)),
        TaskStatus::Failed => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{} failed", name),
        ),
        TaskStatus::Running => (StatusCode::OK, format!("{} is running", name)),
        TaskStatus::Unknown => (StatusCode::ACCEPTED, format!("{} is pending", name)),
    };
    debug!(name = %name, status = ?status, "{}", message);

    let done = status.is_done();
    (
        code,
        Json(BuildStatusResponse {
            message,
            done,
            pass: done.then_some(status == TaskStatus::Succeeded),
        }),
    )
        .into_response()
}
