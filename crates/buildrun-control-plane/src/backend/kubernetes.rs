//! Kubernetes backend: build tasks are `batch/v1` Jobs.

use std::path::Path;

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig, KubeconfigError};
use kube::{Client, Config};
use thiserror::Error;
use tracing::{debug, info, warn};

use buildrun_core::{TaskCounters, TaskDescriptor, TaskHandle, TaskName};

use super::convert::{counters_from_job, job_from_descriptor, record_from_job};
use super::{BackendError, TaskBackend, TaskRecord};

/// Page size used when listing jobs.
const LIST_PAGE_SIZE: u32 = 500;

/// Errors establishing cluster connectivity at startup.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Failed to load kubeconfig: {0}")]
    Kubeconfig(#[from] KubeconfigError),

    #[error("Failed to create Kubernetes client: {0}")]
    Client(#[from] kube::Error),
}

/// Job-backed task backend for one namespace.
#[derive(Clone)]
pub struct KubeBackend {
    jobs: Api<Job>,
    namespace: String,
}

impl KubeBackend {
    /// Create a backend from an existing client.
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            jobs: Api::namespaced(client, &namespace),
            namespace,
        }
    }

    /// Connect to the cluster.
    ///
    /// With a kubeconfig path, that file is used. Otherwise the config is
    /// inferred (in-cluster service account first, then `~/.kube/config`).
    pub async fn connect(
        kubeconfig: Option<&Path>,
        namespace: impl Into<String>,
    ) -> Result<Self, ConnectError> {
        let client = match kubeconfig {
            Some(path) => {
                info!(path = %path.display(), "Loading kubeconfig");
                let kubeconfig = Kubeconfig::read_from(path)?;
                let config =
                    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                        .await?;
                Client::try_from(config)?
            }
            None => {
                info!("No kubeconfig given, inferring cluster configuration");
                Client::try_default().await?
            }
        };
        Ok(Self::new(client, namespace))
    }
}

/// Classify a kube error by its HTTP status code.
fn classify(err: kube::Error) -> BackendError {
    match err {
        kube::Error::Api(resp) if resp.code == 409 => BackendError::Conflict(resp.message),
        kube::Error::Api(resp) if resp.code == 404 => BackendError::NotFound(resp.message),
        other => BackendError::Api(other.to_string()),
    }
}

#[async_trait]
impl TaskBackend for KubeBackend {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn create(&self, descriptor: &TaskDescriptor) -> Result<TaskHandle, BackendError> {
        let job = job_from_descriptor(descriptor);
        let created = self
            .jobs
            .create(&PostParams::default(), &job)
            .await
            .map_err(classify)?;

        let name = created
            .metadata
            .name
            .map(TaskName::new)
            .unwrap_or_else(|| descriptor.name.clone());

        Ok(TaskHandle {
            name,
            namespace: self.namespace.clone(),
            created_at: created.metadata.creation_timestamp.map(|t| t.0),
        })
    }

    async fn counters(&self, name: &str) -> Result<TaskCounters, BackendError> {
        let job = self.jobs.get(name).await.map_err(classify)?;
        Ok(counters_from_job(&job))
    }

    async fn list(&self) -> Result<Vec<TaskRecord>, BackendError> {
        let mut records = Vec::new();
        let mut params = ListParams::default().limit(LIST_PAGE_SIZE);

        loop {
            let page = self.jobs.list(&params).await.map_err(classify)?;
            for job in &page.items {
                match record_from_job(job) {
                    Some(record) => records.push(record),
                    None => warn!(namespace = %self.namespace, "Skipping job without a name"),
                }
            }

            match page.metadata.continue_.filter(|token| !token.is_empty()) {
                Some(token) => {
                    debug!(fetched = records.len(), "Fetching next job page");
                    params = ListParams::default()
                        .limit(LIST_PAGE_SIZE)
                        .continue_token(&token);
                }
                None => break,
            }
        }

        Ok(records)
    }

    async fn delete(&self, name: &str) -> Result<(), BackendError> {
        self.jobs
            .delete(name, &DeleteParams::background())
            .await
            .map_err(classify)?;
        Ok(())
    }
}
