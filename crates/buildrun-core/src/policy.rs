//! Fixed build policy.
//!
//! None of these values can be influenced by a request. Callers pick what to
//! build and where to push it; they never pick the image that runs, how much
//! of the cluster it may use, or where credentials land.

use std::time::Duration;

/// Executor image every build task runs.
pub const EXECUTOR_IMAGE: &str = "gcr.io/kaniko-project/executor:latest";

/// Pull policy for the executor image.
pub const IMAGE_PULL_POLICY: &str = "IfNotPresent";

/// CPU request for the build container.
pub const CPU_REQUEST: &str = "100m";

/// CPU limit for the build container.
pub const CPU_LIMIT: &str = "800m";

/// Memory request for the build container.
pub const MEMORY_REQUEST: &str = "512Mi";

/// Memory limit for the build container.
pub const MEMORY_LIMIT: &str = "2048Mi";

/// Pod-level retries the scheduler may attempt before marking the task failed.
pub const BACKOFF_LIMIT: i32 = 2;

/// Volume holding the registry credentials.
pub const CREDENTIAL_VOLUME_NAME: &str = "kaniko-secret";

/// Where the executor looks for its docker config.
pub const CREDENTIAL_MOUNT_PATH: &str = "/kaniko/.docker";

/// Key inside the credential secret.
pub const CREDENTIAL_SECRET_KEY: &str = ".dockerconfigjson";

/// File name the secret key is projected to inside the mount.
pub const CREDENTIAL_FILE_NAME: &str = "config.json";

/// Node label used for the architecture hint.
pub const ARCH_NODE_LABEL: &str = "kubernetes.io/arch";

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "kaniko";

/// Age after which a task is reclaimed.
pub const RETENTION_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Time between two reaper sweeps.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);
