//! Dispatcher - submits build tasks to the scheduler.

use std::sync::Arc;

use tracing::{info, warn};

use buildrun_core::{BuildRequest, DispatchError, SpecBuilder, TaskDescriptor, TaskHandle};

use crate::backend::{BackendError, TaskBackend};

/// Submits task descriptors. Never retries: a name is claimed at most once.
pub struct Dispatcher {
    backend: Arc<dyn TaskBackend>,
    builder: SpecBuilder,
}

impl Dispatcher {
    /// Create a new Dispatcher targeting the backend's namespace.
    pub fn new(backend: Arc<dyn TaskBackend>) -> Self {
        let builder = SpecBuilder::new(backend.namespace());
        Self { backend, builder }
    }

    /// Create the task in the cluster.
    ///
    /// A name that is already taken yields `AlreadyExists`; the caller should
    /// treat the build as already tracked rather than resubmit.
    pub async fn dispatch(&self, descriptor: &TaskDescriptor) -> Result<TaskHandle, DispatchError> {
        match self.backend.create(descriptor).await {
            Ok(handle) => {
                info!(
                    name = %descriptor.name,
                    task = %handle.name,
                    namespace = %handle.namespace,
                    created_at = ?handle.created_at,
                    "Build task created"
                );
                Ok(handle)
            }
            Err(BackendError::Conflict(_)) => {
                warn!(name = %descriptor.name, "Build task already exists");
                Err(DispatchError::AlreadyExists(descriptor.name.to_string()))
            }
            Err(e) => {
                warn!(name = %descriptor.name, error = %e, "Scheduler rejected build task");
                Err(DispatchError::Rejected(e.to_string()))
            }
        }
    }

    /// Build the descriptor for a request and dispatch it.
    pub async fn submit(&self, request: &BuildRequest) -> Result<TaskHandle, DispatchError> {
        let descriptor = self.builder.build(request);
        self.dispatch(&descriptor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;

    fn request(name: &str) -> BuildRequest {
        BuildRequest::new(name, "git://repo", "registry/img:tag", "reg-cred")
    }

    #[tokio::test]
    async fn test_dispatch_creates_one_task() {
        let backend = Arc::new(InMemoryBackend::new("kaniko"));
        let dispatcher = Dispatcher::new(backend.clone());

        let handle = dispatcher.submit(&request("build-1")).await.unwrap();

        assert_eq!(handle.name.as_str(), "build-1");
        assert_eq!(handle.namespace, "kaniko");
        assert!(handle.created_at.is_some());
        assert_eq!(backend.task_count().await, 1);
        let stored = backend.descriptor("build-1").await.unwrap();
        assert_eq!(stored.namespace, "kaniko");
    }

    #[tokio::test]
    async fn test_duplicate_name_already_exists() {
        let backend = Arc::new(InMemoryBackend::new("kaniko"));
        let dispatcher = Dispatcher::new(backend.clone());

        let first = dispatcher.submit(&request("build-1")).await;
        // Different content, same name.
        let mut second_req = request("build-1");
        second_req.destination = "registry/other:tag".to_string();
        let second = dispatcher.submit(&second_req).await;

        assert!(first.is_ok());
        assert_eq!(
            second.unwrap_err(),
            DispatchError::AlreadyExists("build-1".to_string())
        );
        assert_eq!(backend.task_count().await, 1);
        assert_eq!(
            backend.descriptor("build-1").await.unwrap().args[3],
            "registry/img:tag"
        );
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_one_wins() {
        let backend = Arc::new(InMemoryBackend::new("kaniko"));
        let dispatcher = Arc::new(Dispatcher::new(backend.clone()));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move { dispatcher.submit(&request("build-1")).await })
            })
            .collect();

        let mut ok = 0;
        let mut exists = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(DispatchError::AlreadyExists(_)) => exists += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!((ok, exists), (1, 1));
        assert_eq!(backend.task_count().await, 1);
    }

    #[tokio::test]
    async fn test_other_failures_are_rejected() {
        let backend = Arc::new(InMemoryBackend::new("kaniko"));
        backend
            .fail_create(Some("exceeded quota".to_string()))
            .await;
        let dispatcher = Dispatcher::new(backend.clone());

        let err = dispatcher.submit(&request("build-1")).await.unwrap_err();

        assert_eq!(err, DispatchError::Rejected("exceeded quota".to_string()));
        assert_eq!(backend.task_count().await, 0);
    }
}
