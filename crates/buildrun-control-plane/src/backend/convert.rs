//! Converters between domain types and Kubernetes objects.

use std::collections::BTreeMap;

use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{
    Container, KeyToPath, PodSpec, PodTemplateSpec, ResourceRequirements, SecretVolumeSource,
    Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use buildrun_core::{ResourcePolicy, TaskCounters, TaskDescriptor, TaskName};

use super::TaskRecord;

// ============================================================================
// TaskDescriptor -> Job
// ============================================================================

/// Render a task descriptor as a `batch/v1` Job.
pub fn job_from_descriptor(desc: &TaskDescriptor) -> Job {
    let creds = &desc.credentials;

    let container = Container {
        name: desc.name.as_str().to_string(),
        image: Some(desc.image.clone()),
        image_pull_policy: Some(desc.image_pull_policy.clone()),
        args: Some(desc.args.clone()),
        volume_mounts: Some(vec![VolumeMount {
            name: creds.volume_name.clone(),
            mount_path: creds.mount_path.clone(),
            read_only: Some(true),
            ..Default::default()
        }]),
        resources: Some(resource_requirements(&desc.resources)),
        ..Default::default()
    };

    let volume = Volume {
        name: creds.volume_name.clone(),
        secret: Some(SecretVolumeSource {
            secret_name: Some(creds.secret_name.clone()),
            items: Some(vec![KeyToPath {
                key: creds.secret_key.clone(),
                path: creds.file_name.clone(),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    };

    let node_selector = if desc.node_selector.is_empty() {
        None
    } else {
        Some(desc.node_selector.clone())
    };

    Job {
        metadata: ObjectMeta {
            name: Some(desc.name.as_str().to_string()),
            namespace: Some(desc.namespace.clone()),
            ..Default::default()
        },
        spec: Some(JobSpec {
            backoff_limit: Some(desc.backoff_limit),
            template: PodTemplateSpec {
                metadata: None,
                spec: Some(PodSpec {
                    containers: vec![container],
                    node_selector,
                    restart_policy: Some(desc.restart_policy.as_str().to_string()),
                    volumes: Some(vec![volume]),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        status: None,
    }
}

fn resource_requirements(policy: &ResourcePolicy) -> ResourceRequirements {
    let requests = BTreeMap::from([
        ("cpu".to_string(), Quantity(policy.cpu_request.clone())),
        ("memory".to_string(), Quantity(policy.memory_request.clone())),
    ]);
    let limits = BTreeMap::from([
        ("cpu".to_string(), Quantity(policy.cpu_limit.clone())),
        ("memory".to_string(), Quantity(policy.memory_limit.clone())),
    ]);

    ResourceRequirements {
        requests: Some(requests),
        limits: Some(limits),
        ..Default::default()
    }
}

// ============================================================================
// Job -> domain
// ============================================================================

/// Extract the replica counters from a Job. Missing status counts as zero.
pub fn counters_from_job(job: &Job) -> TaskCounters {
    job.status
        .as_ref()
        .map(|s| {
            TaskCounters::new(
                s.active.unwrap_or(0),
                s.succeeded.unwrap_or(0),
                s.failed.unwrap_or(0),
            )
        })
        .unwrap_or_default()
}

/// Extract the reaper's view of a Job. `None` for unnamed objects.
pub fn record_from_job(job: &Job) -> Option<TaskRecord> {
    let name = job.metadata.name.as_ref()?;
    Some(TaskRecord {
        name: TaskName::new(name.clone()),
        created_at: job.metadata.creation_timestamp.as_ref().map(|t| t.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildrun_core::{policy, BuildRequest, SpecBuilder};
    use chrono::{TimeZone, Utc};
    use k8s_openapi::api::batch::v1::JobStatus;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

    fn descriptor(req: &BuildRequest) -> TaskDescriptor {
        SpecBuilder::new("kaniko").build(req)
    }

    fn pod_spec(job: &Job) -> &PodSpec {
        job.spec.as_ref().unwrap().template.spec.as_ref().unwrap()
    }

    #[test]
    fn test_job_shape() {
        let req = BuildRequest::new("build-1", "git://repo", "registry/img:tag", "reg-cred");
        let job = job_from_descriptor(&descriptor(&req));

        assert_eq!(job.metadata.name.as_deref(), Some("build-1"));
        assert_eq!(job.metadata.namespace.as_deref(), Some("kaniko"));
        assert_eq!(
            job.spec.as_ref().unwrap().backoff_limit,
            Some(policy::BACKOFF_LIMIT)
        );

        let pod = pod_spec(&job);
        assert_eq!(pod.restart_policy.as_deref(), Some("Never"));
        assert!(pod.node_selector.is_none());
        assert_eq!(pod.containers.len(), 1);

        let container = &pod.containers[0];
        assert_eq!(container.name, "build-1");
        assert_eq!(container.image.as_deref(), Some(policy::EXECUTOR_IMAGE));
        assert_eq!(
            container.args.as_ref().unwrap(),
            &vec!["--context", "git://repo", "--destination", "registry/img:tag"]
        );

        let resources = container.resources.as_ref().unwrap();
        let requests = resources.requests.as_ref().unwrap();
        let limits = resources.limits.as_ref().unwrap();
        assert_eq!(requests["cpu"], Quantity("100m".to_string()));
        assert_eq!(requests["memory"], Quantity("512Mi".to_string()));
        assert_eq!(limits["cpu"], Quantity("800m".to_string()));
        assert_eq!(limits["memory"], Quantity("2048Mi".to_string()));
    }

    #[test]
    fn test_credentials_volume() {
        let req = BuildRequest::new("build-1", "git://repo", "registry/img:tag", "reg-cred");
        let job = job_from_descriptor(&descriptor(&req));
        let pod = pod_spec(&job);

        let mount = &pod.containers[0].volume_mounts.as_ref().unwrap()[0];
        assert_eq!(mount.name, "kaniko-secret");
        assert_eq!(mount.mount_path, "/kaniko/.docker");
        assert_eq!(mount.read_only, Some(true));

        let volume = &pod.volumes.as_ref().unwrap()[0];
        let secret = volume.secret.as_ref().unwrap();
        assert_eq!(volume.name, mount.name);
        assert_eq!(secret.secret_name.as_deref(), Some("reg-cred"));
        let item = &secret.items.as_ref().unwrap()[0];
        assert_eq!(item.key, ".dockerconfigjson");
        assert_eq!(item.path, "config.json");
    }

    #[test]
    fn test_arch_node_selector() {
        let req = BuildRequest::new("build-1", "ctx", "dst", "sec").with_arch("arm64");
        let job = job_from_descriptor(&descriptor(&req));

        let selector = pod_spec(&job).node_selector.as_ref().unwrap();
        assert_eq!(selector.len(), 1);
        assert_eq!(selector["kubernetes.io/arch"], "arm64");
    }

    #[test]
    fn test_counters_from_job() {
        let mut job = Job::default();
        assert_eq!(counters_from_job(&job), TaskCounters::default());

        job.status = Some(JobStatus {
            active: Some(1),
            failed: Some(2),
            ..Default::default()
        });
        assert_eq!(counters_from_job(&job), TaskCounters::new(1, 0, 2));
    }

    #[test]
    fn test_record_from_job() {
        assert!(record_from_job(&Job::default()).is_none());

        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let job = Job {
            metadata: ObjectMeta {
                name: Some("build-1".to_string()),
                creation_timestamp: Some(Time(created)),
                ..Default::default()
            },
            ..Default::default()
        };

        let record = record_from_job(&job).unwrap();
        assert_eq!(record.name.as_str(), "build-1");
        assert_eq!(record.created_at, Some(created));
    }
}
