//! Scheduler backends.
//!
//! The control plane never talks to the cluster directly; it goes through a
//! [`TaskBackend`]. Production uses [`KubeBackend`], tests and local runs use
//! [`InMemoryBackend`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use buildrun_core::{TaskCounters, TaskDescriptor, TaskHandle, TaskName};

mod convert;
mod kubernetes;
mod memory;

pub use convert::{counters_from_job, job_from_descriptor, record_from_job};
pub use kubernetes::{ConnectError, KubeBackend};
pub use memory::InMemoryBackend;

/// Errors surfaced by a scheduler backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The object already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The object does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other API or transport failure.
    #[error("{0}")]
    Api(String),
}

/// A task as seen when listing the namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub name: TaskName,
    /// Missing only if the scheduler has not stamped the object.
    pub created_at: Option<DateTime<Utc>>,
}

/// Operations the control plane needs from the cluster scheduler.
///
/// Every implementation is bound to a single namespace.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Namespace this backend operates in.
    fn namespace(&self) -> &str;

    /// Create the task. Fails with `Conflict` if the name is taken.
    async fn create(&self, descriptor: &TaskDescriptor) -> Result<TaskHandle, BackendError>;

    /// Read the live counters of a task.
    async fn counters(&self, name: &str) -> Result<TaskCounters, BackendError>;

    /// List every task in the namespace.
    async fn list(&self) -> Result<Vec<TaskRecord>, BackendError>;

    /// Delete a task and, in the background, everything it owns.
    async fn delete(&self, name: &str) -> Result<(), BackendError>;
}
