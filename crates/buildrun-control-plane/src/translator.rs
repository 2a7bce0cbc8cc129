//! Status translator - reads a task's live counters and maps them to a status.

use std::sync::Arc;

use tracing::debug;

use buildrun_core::{QueryError, TaskStatus};

use crate::backend::{BackendError, TaskBackend};

/// Point-in-time status reads. No caching, no retries.
pub struct StatusTranslator {
    backend: Arc<dyn TaskBackend>,
}

impl StatusTranslator {
    pub fn new(backend: Arc<dyn TaskBackend>) -> Self {
        Self { backend }
    }

    /// Read the current status of a task.
    ///
    /// A task reaped between two calls shows up as `NotFound`.
    pub async fn query(&self, name: &str) -> Result<TaskStatus, QueryError> {
        let counters = self.backend.counters(name).await.map_err(|e| match e {
            BackendError::NotFound(_) => QueryError::NotFound(name.to_string()),
            other => QueryError::Backend(other.to_string()),
        })?;

        let status = counters.status();
        debug!(
            name = %name,
            active = counters.active,
            succeeded = counters.succeeded,
            failed = counters.failed,
            status = ?status,
            "Build status read"
        );
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::dispatcher::Dispatcher;
    use buildrun_core::{BuildRequest, TaskCounters};

    async fn setup() -> (Arc<InMemoryBackend>, Dispatcher, StatusTranslator) {
        let backend = Arc::new(InMemoryBackend::new("kaniko"));
        let dispatcher = Dispatcher::new(backend.clone());
        let translator = StatusTranslator::new(backend.clone());
        (backend, dispatcher, translator)
    }

    #[tokio::test]
    async fn test_fresh_task_is_not_done() {
        let (_backend, dispatcher, translator) = setup().await;
        let req = BuildRequest::new("build-1", "git://repo", "registry/img:tag", "reg-cred");

        dispatcher.submit(&req).await.unwrap();
        let status = translator.query("build-1").await.unwrap();

        assert!(matches!(status, TaskStatus::Running | TaskStatus::Unknown));
    }

    #[tokio::test]
    async fn test_status_follows_counters() {
        let (backend, dispatcher, translator) = setup().await;
        let req = BuildRequest::new("build-1", "ctx", "dst", "sec");
        dispatcher.submit(&req).await.unwrap();

        backend
            .set_counters("build-1", TaskCounters::new(1, 0, 0))
            .await;
        assert_eq!(translator.query("build-1").await, Ok(TaskStatus::Running));

        backend
            .set_counters("build-1", TaskCounters::new(0, 1, 1))
            .await;
        assert_eq!(translator.query("build-1").await, Ok(TaskStatus::Succeeded));

        backend
            .set_counters("build-1", TaskCounters::new(0, 0, 1))
            .await;
        assert_eq!(translator.query("build-1").await, Ok(TaskStatus::Failed));
    }

    #[tokio::test]
    async fn test_unknown_name_is_not_found() {
        let (_backend, _dispatcher, translator) = setup().await;

        assert_eq!(
            translator.query("never-dispatched").await,
            Err(QueryError::NotFound("never-dispatched".to_string()))
        );
    }

    #[tokio::test]
    async fn test_backend_failure_is_distinct_from_not_found() {
        let (backend, _dispatcher, translator) = setup().await;
        backend
            .fail_get(Some("connection refused".to_string()))
            .await;

        assert_eq!(
            translator.query("build-1").await,
            Err(QueryError::Backend("connection refused".to_string()))
        );
    }

    #[tokio::test]
    async fn test_reaped_task_is_not_found() {
        let (backend, dispatcher, translator) = setup().await;
        let req = BuildRequest::new("build-1", "ctx", "dst", "sec");
        dispatcher.submit(&req).await.unwrap();

        backend.delete("build-1").await.unwrap();

        assert!(matches!(
            translator.query("build-1").await,
            Err(QueryError::NotFound(_))
        ));
    }
}
