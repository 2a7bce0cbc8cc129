//! Outward task status and the raw scheduler counters it is derived from.

use serde::{Deserialize, Serialize};

/// Status of a build task as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// At least one pod is active.
    Running,
    /// The build finished and pushed its image.
    Succeeded,
    /// The build failed.
    Failed,
    /// Accepted but not yet scheduled, or no status observed yet.
    Unknown,
}

impl TaskStatus {
    /// Returns true if the build has finished, one way or the other.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Replica counters reported by the scheduler for a single task.
///
/// The counters are not mutually exclusive while the scheduler transitions a
/// task, so a task may briefly report e.g. both a success and a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounters {
    pub active: i32,
    pub succeeded: i32,
    pub failed: i32,
}

impl TaskCounters {
    pub fn new(active: i32, succeeded: i32, failed: i32) -> Self {
        Self {
            active,
            succeeded,
            failed,
        }
    }

    /// Map counters to an outward status. Rule order decides, not magnitude.
    ///
    /// A single failed attempt reports `Failed` (done, not passed) even while
    /// a retry pod is active (`failed = 1, active = 1`) and within the retry
    /// budget. That retry may still succeed, after which the same task reads
    /// `Succeeded`, so a `Failed` answer is not final until `active` is zero.
    pub fn status(&self) -> TaskStatus {
        if self.succeeded >= 1 {
            TaskStatus::Succeeded
        } else if self.failed >= 1 {
            TaskStatus::Failed
        } else if self.active >= 1 {
            TaskStatus::Running
        } else {
            TaskStatus::Unknown
        }
    }
}

impl From<TaskCounters> for TaskStatus {
    fn from(counters: TaskCounters) -> Self {
        counters.status()
    }
}
