//! OS signal handling.
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGTERM and Ctrl+C both trigger graceful shutdown
//! - SIGHUP triggers a mapping reload, not shutdown

use std::path::PathBuf;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::mapping::MappingStore;

/// Wait for Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("Shutdown signal received");
}

/// Reload the mapping table from `path` on every SIGHUP until shutdown.
#[cfg(unix)]
pub fn spawn_sighup_reload(
    store: MappingStore,
    path: PathBuf,
    mut shutdown: broadcast::Receiver<()>,
) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                received = hangup.recv() => {
                    if received.is_none() {
                        break;
                    }
                    tracing::info!(path = %path.display(), "SIGHUP received, reloading mappings");
                    // Errors are logged by the store.
                    let _ = store.reload_from(&path);
                }
                _ = shutdown.recv() => break,
            }
        }
    }))
}

#[cfg(not(unix))]
pub fn spawn_sighup_reload(
    _store: MappingStore,
    _path: PathBuf,
    _shutdown: broadcast::Receiver<()>,
) -> std::io::Result<JoinHandle<()>> {
    tracing::warn!("SIGHUP reload is not supported on this platform");
    Ok(tokio::spawn(async {}))
}
