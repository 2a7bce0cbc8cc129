//! Task descriptors and the spec builder that derives them from requests.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::TaskName;
use crate::policy;
use crate::request::BuildRequest;

/// Restart policy of the build pod.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestartPolicy {
    /// A failed build is never restarted in place.
    #[default]
    Never,
}

impl RestartPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Never => "Never",
        }
    }
}

/// CPU and memory requests/limits, as scheduler quantity strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePolicy {
    pub cpu_request: String,
    pub memory_request: String,
    pub cpu_limit: String,
    pub memory_limit: String,
}

impl Default for ResourcePolicy {
    fn default() -> Self {
        Self {
            cpu_request: policy::CPU_REQUEST.to_string(),
            memory_request: policy::MEMORY_REQUEST.to_string(),
            cpu_limit: policy::CPU_LIMIT.to_string(),
            memory_limit: policy::MEMORY_LIMIT.to_string(),
        }
    }
}

/// Read-only volume projecting registry credentials into the build container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialVolume {
    /// Volume name inside the pod.
    pub volume_name: String,
    /// Secret the volume is sourced from.
    pub secret_name: String,
    /// Key of the secret to project.
    pub secret_key: String,
    /// File name the key is projected to.
    pub file_name: String,
    /// Mount path inside the container.
    pub mount_path: String,
}

impl CredentialVolume {
    /// Credential volume for the given secret with the fixed mount layout.
    pub fn for_secret(secret_name: impl Into<String>) -> Self {
        Self {
            volume_name: policy::CREDENTIAL_VOLUME_NAME.to_string(),
            secret_name: secret_name.into(),
            secret_key: policy::CREDENTIAL_SECRET_KEY.to_string(),
            file_name: policy::CREDENTIAL_FILE_NAME.to_string(),
            mount_path: policy::CREDENTIAL_MOUNT_PATH.to_string(),
        }
    }
}

/// Scheduler-ready description of one build task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub name: TaskName,
    pub namespace: String,
    pub image: String,
    pub image_pull_policy: String,
    pub args: Vec<String>,
    pub resources: ResourcePolicy,
    /// Empty unless an architecture hint was given.
    pub node_selector: BTreeMap<String, String>,
    pub restart_policy: RestartPolicy,
    pub credentials: CredentialVolume,
    pub backoff_limit: i32,
}

/// Result of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHandle {
    /// Name the scheduler recorded the task under.
    pub name: TaskName,
    pub namespace: String,
    /// Creation time, when the scheduler reported one.
    pub created_at: Option<DateTime<Utc>>,
}

/// Maps build requests to task descriptors for one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecBuilder {
    namespace: String,
}

impl SpecBuilder {
    /// Create a builder targeting the given namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Derive the task descriptor for a request.
    ///
    /// Pure and total. Build args come out sorted by key, each exactly once.
    pub fn build(&self, request: &BuildRequest) -> TaskDescriptor {
        let mut args = vec![
            "--context".to_string(),
            request.context.clone(),
            "--destination".to_string(),
            request.destination.clone(),
        ];
        if let Some(build_args) = &request.build_args {
            args.extend(
                build_args
                    .iter()
                    .map(|(key, value)| format!("--build-arg={}={}", key, value)),
            );
        }

        let mut node_selector = BTreeMap::new();
        if let Some(arch) = request.arch.as_deref().filter(|a| !a.is_empty()) {
            node_selector.insert(policy::ARCH_NODE_LABEL.to_string(), arch.to_string());
        }

        TaskDescriptor {
            name: request.name.clone(),
            namespace: self.namespace.clone(),
            image: policy::EXECUTOR_IMAGE.to_string(),
            image_pull_policy: policy::IMAGE_PULL_POLICY.to_string(),
            args,
            resources: ResourcePolicy::default(),
            node_selector,
            restart_policy: RestartPolicy::Never,
            credentials: CredentialVolume::for_secret(request.secret.clone()),
            backoff_limit: policy::BACKOFF_LIMIT,
        }
    }
}

impl Default for SpecBuilder {
    fn default() -> Self {
        Self::new(policy::DEFAULT_NAMESPACE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> BuildRequest {
        BuildRequest::new("build-1", "git://repo", "registry/img:tag", "reg-cred")
    }

    fn build_arg_count(desc: &TaskDescriptor) -> usize {
        desc.args
            .iter()
            .filter(|a| a.starts_with("--build-arg="))
            .count()
    }

    #[test]
    fn test_build_is_pure() {
        let builder = SpecBuilder::new("kaniko");
        let req = request().with_arch("arm64").with_build_arg("A", "1");

        assert_eq!(builder.build(&req), builder.build(&req));
    }

    #[test]
    fn test_build_minimal_request() {
        let desc = SpecBuilder::new("builds").build(&request());

        assert_eq!(desc.name.as_str(), "build-1");
        assert_eq!(desc.namespace, "builds");
        assert_eq!(desc.image, policy::EXECUTOR_IMAGE);
        assert_eq!(
            desc.args,
            vec!["--context", "git://repo", "--destination", "registry/img:tag"]
        );
        assert!(desc.node_selector.is_empty());
        assert_eq!(desc.restart_policy, RestartPolicy::Never);
        assert_eq!(desc.backoff_limit, policy::BACKOFF_LIMIT);
        assert_eq!(desc.resources, ResourcePolicy::default());
    }

    #[test]
    fn test_empty_build_args_add_nothing() {
        let mut req = request();
        req.build_args = Some(BTreeMap::new());
        let desc = SpecBuilder::default().build(&req);

        assert_eq!(build_arg_count(&desc), 0);
        assert_eq!(desc.args.len(), 4);
    }

    #[test]
    fn test_each_build_arg_once() {
        let req = request()
            .with_build_arg("VERSION", "1.2")
            .with_build_arg("DEBUG", "0")
            .with_build_arg("URL", "a=b");
        let desc = SpecBuilder::default().build(&req);

        assert_eq!(build_arg_count(&desc), 3);
        for expected in [
            "--build-arg=VERSION=1.2",
            "--build-arg=DEBUG=0",
            "--build-arg=URL=a=b",
        ] {
            assert_eq!(desc.args.iter().filter(|a| *a == expected).count(), 1);
        }
        // Sorted by key.
        assert_eq!(desc.args[4], "--build-arg=DEBUG=0");
    }

    #[test]
    fn test_arch_becomes_node_selector() {
        let desc = SpecBuilder::default().build(&request().with_arch("amd64"));

        assert_eq!(desc.node_selector.len(), 1);
        assert_eq!(desc.node_selector[policy::ARCH_NODE_LABEL], "amd64");
    }

    #[test]
    fn test_empty_arch_is_ignored() {
        let desc = SpecBuilder::default().build(&request().with_arch(""));
        assert!(desc.node_selector.is_empty());
    }

    #[test]
    fn test_credentials_are_mounted_from_secret() {
        let desc = SpecBuilder::default().build(&request());

        assert_eq!(desc.credentials.secret_name, "reg-cred");
        assert_eq!(desc.credentials.mount_path, "/kaniko/.docker");
        assert_eq!(desc.credentials.secret_key, ".dockerconfigjson");
        assert_eq!(desc.credentials.file_name, "config.json");
    }

    #[test]
    fn test_name_is_passed_through_unchecked() {
        let req = BuildRequest::new("Not_A_Valid_Name!", "ctx", "dst", "sec");
        let desc = SpecBuilder::default().build(&req);
        assert_eq!(desc.name.as_str(), "Not_A_Valid_Name!");
    }
}
