//! Control plane configuration.

use std::path::PathBuf;

use clap::Parser;

use buildrun_core::policy;

/// BuildRun control plane: launches Kaniko builds as Kubernetes jobs.
#[derive(Parser, Debug, Clone)]
#[command(name = "buildrun-control-plane", about, version)]
pub struct Config {
    /// Namespace to run build jobs in
    #[arg(long, default_value = policy::DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// HTTP server address
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub http_addr: String,

    /// Path to a kubeconfig file (inferred from the environment if unset)
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Use an in-memory scheduler instead of a cluster (local development)
    #[arg(long)]
    pub in_memory: bool,
}
