//! Reaper - periodically deletes build tasks past their retention window.
//!
//! Runs as its own tokio task, independent of request handling. It holds no
//! locks: a task queried while being reaped reads as not found.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use buildrun_core::{policy, ReaperError, TaskName};

use crate::backend::{BackendError, TaskBackend};

/// Outcome of one sweep.
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Tasks listed in the namespace.
    pub examined: usize,
    /// Tasks deleted (or found already gone).
    pub deleted: Vec<TaskName>,
    /// Per-task failures, retried next sweep.
    pub failures: Vec<ReaperError>,
}

/// Background garbage collector for finished and stale tasks.
pub struct Reaper {
    backend: Arc<dyn TaskBackend>,
    retention: Duration,
    interval: Duration,
}

impl Reaper {
    /// Create a reaper with the fixed retention window and sweep interval.
    pub fn new(backend: Arc<dyn TaskBackend>) -> Self {
        Self {
            backend,
            retention: policy::RETENTION_WINDOW,
            interval: policy::SWEEP_INTERVAL,
        }
    }

    /// Override the retention window.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// True if `created_at + retention` lies before `now`.
    pub fn is_expired(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        (now - created_at)
            .to_std()
            .map(|age| age > self.retention)
            .unwrap_or(false)
    }

    /// Run a single sweep against the current time.
    pub async fn sweep(&self) -> Result<SweepReport, ReaperError> {
        self.sweep_at(Utc::now()).await
    }

    /// Run a single sweep as if the current time were `now`.
    ///
    /// Only a failed listing aborts the sweep. Delete failures are collected
    /// in the report and the sweep moves on.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<SweepReport, ReaperError> {
        let records = self
            .backend
            .list()
            .await
            .map_err(|e| ReaperError::ListFailed(e.to_string()))?;

        let mut report = SweepReport {
            examined: records.len(),
            ..Default::default()
        };

        for record in records {
            let Some(created_at) = record.created_at else {
                debug!(name = %record.name, "Task has no creation timestamp yet, skipping");
                continue;
            };
            if !self.is_expired(created_at, now) {
                continue;
            }

            info!(name = %record.name, created_at = %created_at, "Deleting expired build task");
            match self.backend.delete(record.name.as_str()).await {
                Ok(()) => report.deleted.push(record.name),
                Err(BackendError::NotFound(_)) => {
                    debug!(name = %record.name, "Task already gone");
                    report.deleted.push(record.name);
                }
                Err(e) => {
                    let err = ReaperError::DeleteFailed {
                        name: record.name.to_string(),
                        reason: e.to_string(),
                    };
                    warn!(error = %err, "Failed to delete build task");
                    report.failures.push(err);
                }
            }
        }

        Ok(report)
    }

    /// Sweep on every tick until `shutdown` is cancelled.
    ///
    /// The first sweep happens one full interval after start.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            namespace = %self.backend.namespace(),
            interval_secs = self.interval.as_secs(),
            retention_secs = self.retention.as_secs(),
            "Reaper started"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Reaper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    info!("Cleaning up old build tasks");
                    match self.sweep().await {
                        Ok(report) => info!(
                            examined = report.examined,
                            deleted = report.deleted.len(),
                            failed = report.failures.len(),
                            "Sweep finished"
                        ),
                        Err(e) => warn!(error = %e, "Sweep aborted, retrying next tick"),
                    }
                }
            }
        }
    }

    /// Spawn [`Reaper::run`] on the current runtime.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
