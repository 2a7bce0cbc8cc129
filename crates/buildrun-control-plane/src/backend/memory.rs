//! In-memory backend.
//!
//! Behaves like a single-namespace scheduler that never runs anything: tasks
//! stay `unknown` until their counters are set by hand. Used by tests and by
//! `--in-memory` local runs.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use buildrun_core::{TaskCounters, TaskDescriptor, TaskHandle, TaskName};

use super::{BackendError, TaskBackend, TaskRecord};

struct StoredTask {
    descriptor: TaskDescriptor,
    counters: TaskCounters,
    created_at: DateTime<Utc>,
}

/// Scheduler double keeping tasks in a map.
pub struct InMemoryBackend {
    namespace: String,
    tasks: RwLock<BTreeMap<String, StoredTask>>,
    create_error: RwLock<Option<String>>,
    get_error: RwLock<Option<String>>,
    list_error: RwLock<Option<String>>,
    delete_errors: RwLock<HashSet<String>>,
}

impl InMemoryBackend {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            tasks: RwLock::new(BTreeMap::new()),
            create_error: RwLock::new(None),
            get_error: RwLock::new(None),
            list_error: RwLock::new(None),
            delete_errors: RwLock::new(HashSet::new()),
        }
    }

    /// Overwrite a task's counters. Returns false if the task does not exist.
    pub async fn set_counters(&self, name: &str, counters: TaskCounters) -> bool {
        match self.tasks.write().await.get_mut(name) {
            Some(task) => {
                task.counters = counters;
                true
            }
            None => false,
        }
    }

    /// Overwrite a task's creation time. Returns false if the task does not exist.
    pub async fn set_created_at(&self, name: &str, created_at: DateTime<Utc>) -> bool {
        match self.tasks.write().await.get_mut(name) {
            Some(task) => {
                task.created_at = created_at;
                true
            }
            None => false,
        }
    }

    /// Make every following create fail (`None` to recover).
    pub async fn fail_create(&self, reason: Option<String>) {
        *self.create_error.write().await = reason;
    }

    /// Make every following status read fail (`None` to recover).
    pub async fn fail_get(&self, reason: Option<String>) {
        *self.get_error.write().await = reason;
    }

    /// Make every following list fail (`None` to recover).
    pub async fn fail_list(&self, reason: Option<String>) {
        *self.list_error.write().await = reason;
    }

    /// Make deletes of this task fail.
    pub async fn fail_delete(&self, name: &str) {
        self.delete_errors.write().await.insert(name.to_string());
    }

    /// Descriptor a task was created from.
    pub async fn descriptor(&self, name: &str) -> Option<TaskDescriptor> {
        self.tasks
            .read()
            .await
            .get(name)
            .map(|t| t.descriptor.clone())
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.tasks.read().await.contains_key(name)
    }

    pub async fn task_count(&self) -> usize {
        self.tasks.read().await.len()
    }
}

#[async_trait]
impl TaskBackend for InMemoryBackend {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn create(&self, descriptor: &TaskDescriptor) -> Result<TaskHandle, BackendError> {
        if let Some(reason) = self.create_error.read().await.clone() {
            return Err(BackendError::Api(reason));
        }

        let mut tasks = self.tasks.write().await;
        let name = descriptor.name.as_str();
        if tasks.contains_key(name) {
            return Err(BackendError::Conflict(format!(
                "jobs.batch \"{}\" already exists",
                name
            )));
        }

        let created_at = Utc::now();
        tasks.insert(
            name.to_string(),
            StoredTask {
                descriptor: descriptor.clone(),
                counters: TaskCounters::default(),
                created_at,
            },
        );

        Ok(TaskHandle {
            name: descriptor.name.clone(),
            namespace: self.namespace.clone(),
            created_at: Some(created_at),
        })
    }

    async fn counters(&self, name: &str) -> Result<TaskCounters, BackendError> {
        if let Some(reason) = self.get_error.read().await.clone() {
            return Err(BackendError::Api(reason));
        }

        self.tasks
            .read()
            .await
            .get(name)
            .map(|t| t.counters)
            .ok_or_else(|| BackendError::NotFound(format!("jobs.batch \"{}\" not found", name)))
    }

    async fn list(&self) -> Result<Vec<TaskRecord>, BackendError> {
        if let Some(reason) = self.list_error.read().await.clone() {
            return Err(BackendError::Api(reason));
        }

        Ok(self
            .tasks
            .read()
            .await
            .iter()
            .map(|(name, task)| TaskRecord {
                name: TaskName::new(name.clone()),
                created_at: Some(task.created_at),
            })
            .collect())
    }

    async fn delete(&self, name: &str) -> Result<(), BackendError> {
        if self.delete_errors.read().await.contains(name) {
            return Err(BackendError::Api(format!("delete of \"{}\" refused", name)));
        }

        self.tasks
            .write()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| BackendError::NotFound(format!("jobs.batch \"{}\" not found", name)))
    }
}
