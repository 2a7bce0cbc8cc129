//! Inbound build request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::ids::TaskName;

/// A caller-supplied image build request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    /// Unique name, also used as the task name.
    pub name: TaskName,

    /// Location of the build context (git://, s3://, dir://...).
    #[serde(default)]
    pub context: String,

    /// Image reference to push the result to.
    #[serde(default)]
    pub destination: String,

    /// Name of the pre-existing registry credential secret.
    ///
    /// Defaults to empty so a missing secret fails `validate()` like an
    /// empty one.
    #[serde(default)]
    pub secret: String,

    /// Optional node architecture (e.g. `amd64`, `arm64`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,

    /// Optional `--build-arg` values. Keyed map, so each key appears once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_args: Option<BTreeMap<String, String>>,
}

impl BuildRequest {
    /// Create a request without architecture hint or build args.
    pub fn new(
        name: impl Into<TaskName>,
        context: impl Into<String>,
        destination: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            context: context.into(),
            destination: destination.into(),
            secret: secret.into(),
            arch: None,
            build_args: None,
        }
    }

    /// Builder method to set the architecture hint.
    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    /// Builder method to add a build arg.
    pub fn with_build_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.build_args
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Reject requests with empty required fields.
    ///
    /// Name syntax is left to the scheduler.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.name.is_empty() {
            return Err(BuildError::MissingField("name"));
        }
        if self.context.is_empty() {
            return Err(BuildError::MissingField("context"));
        }
        if self.destination.is_empty() {
            return Err(BuildError::MissingField("destination"));
        }
        if self.secret.is_empty() {
            return Err(BuildError::MissingField("secret"));
        }
        Ok(())
    }
}
