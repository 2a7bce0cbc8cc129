//! BuildRun Control Plane Server

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use buildrun_control_plane::backend::{InMemoryBackend, KubeBackend, TaskBackend};
use buildrun_control_plane::{http, AppState, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("buildrun=info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let http_addr: SocketAddr = config.http_addr.parse()?;

    // Connect to the scheduler. Failure here is the only fatal error.
    let backend: Arc<dyn TaskBackend> = if config.in_memory {
        warn!("Using in-memory scheduler - builds will never run");
        Arc::new(InMemoryBackend::new(config.namespace.clone()))
    } else {
        let backend =
            KubeBackend::connect(config.kubeconfig.as_deref(), config.namespace.clone()).await?;
        Arc::new(backend)
    };

    let state = AppState::new(backend);
    let shutdown = CancellationToken::new();

    // Start the reaper
    let reaper = state.reaper().spawn(shutdown.clone());

    // Start HTTP server
    let http_router = http::create_router(state);
    let http_listener = TcpListener::bind(http_addr).await?;

    info!(
        http_addr = %http_addr,
        namespace = %config.namespace,
        "Starting BuildRun control plane"
    );

    let server_shutdown = shutdown.clone();
    let result = axum::serve(http_listener, http_router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("Shutdown signal received");
            server_shutdown.cancel();
        })
        .await;

    if let Err(e) = &result {
        tracing::error!(error = %e, "HTTP server error");
    }

    shutdown.cancel();
    if let Err(e) = reaper.await {
        warn!(error = %e, "Reaper task ended abnormally");
    }

    info!("BuildRun control plane stopped");
    result.map_err(Into::into)
}

/// Resolve on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
