//! BuildRun Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - HTTP
//! - The Kubernetes API
//! - Runtime specifics
//!
//! Everything here describes what a build is and how it maps onto a
//! single-run cluster task. Talking to the cluster lives in the control plane.

pub mod descriptor;
pub mod error;
pub mod ids;
pub mod policy;
pub mod request;
pub mod status;

// Re-export commonly used types
pub use descriptor::{
    CredentialVolume, ResourcePolicy, RestartPolicy, SpecBuilder, TaskDescriptor, TaskHandle,
};
pub use error::{BuildError, DispatchError, QueryError, ReaperError};
pub use ids::TaskName;
pub use request::BuildRequest;
pub use status::{TaskCounters, TaskStatus};
