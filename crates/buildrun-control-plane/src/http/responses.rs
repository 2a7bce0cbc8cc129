//! HTTP request and response types.

use serde::{Deserialize, Serialize};

// ============================================================================
// Probe types
// ============================================================================

/// Response for the readiness probe.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: String,
}

// ============================================================================
// Build types
// ============================================================================

/// Query string for the build status endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub name: String,
}

/// Response body for a launched build.
#[derive(Debug, Serialize)]
pub struct LaunchResponse {
    pub message: String,

    /// Name the task was created under.
    pub name: String,
}

/// Response body for a build status query.
#[derive(Debug, Serialize)]
pub struct BuildStatusResponse {
    pub message: String,

    /// True once the build succeeded or failed.
    pub done: bool,

    /// Only present when `done` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass: Option<bool>,
}

// ============================================================================
// Error types
// ============================================================================

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
