//! Core domain errors.

use thiserror::Error;

/// Errors raised while turning an inbound request into a task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A required request field was empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Errors returned when submitting a task to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A task with this name already exists in the namespace.
    #[error("Build '{0}' already exists")]
    AlreadyExists(String),

    /// The scheduler refused the task (quota, malformed, missing namespace...).
    #[error("Rejected by scheduler: {0}")]
    Rejected(String),
}

/// Errors returned when reading a task's status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// No task with this name exists in the namespace.
    #[error("Build '{0}' not found")]
    NotFound(String),

    /// Any other transport or API failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Errors raised during a reaper sweep. Never propagated outside the sweep.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReaperError {
    /// Listing tasks failed; the whole sweep is skipped.
    #[error("Failed to list tasks: {0}")]
    ListFailed(String),

    /// Deleting a single task failed; the sweep moves on.
    #[error("Failed to delete task '{name}': {reason}")]
    DeleteFailed { name: String, reason: String },
}
