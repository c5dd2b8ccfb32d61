//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve configuration (file, then command-line overrides)
//! - Load the initial mapping table
//! - Start reload triggers (SIGHUP, file watch, admin API)
//! - Bind listeners and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::admin::{setup_admin_router, AdminState};
use crate::config::validation::validate_config;
use crate::config::{load_config, ConfigError, MappingWatcher, RelayConfig};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::{self, Shutdown};
use crate::lifecycle::signals;
use crate::mapping::{MappingError, MappingStore, MappingTable};
use crate::observability::metrics;

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "relay.toml";

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to load mappings from {path}: {source}")]
    Mappings {
        path: PathBuf,
        #[source]
        source: MappingError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Overrides supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    pub config_path: Option<PathBuf>,
    pub mappings_path: Option<PathBuf>,
    pub bind_address: Option<String>,
}

/// Build the effective configuration.
///
/// An explicit config path must exist; the default `relay.toml` is optional.
pub fn resolve_config(options: &StartupOptions) -> Result<RelayConfig, StartupError> {
    let mut config = match &options.config_path {
        Some(path) => load_config(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => load_config(Path::new(DEFAULT_CONFIG_FILE))?,
        None => RelayConfig::default(),
    };

    if let Some(path) = &options.mappings_path {
        config.mappings.path = path.clone();
    }
    if let Some(bind) = &options.bind_address {
        config.listener.bind_address = bind.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Run the relay until a shutdown signal arrives.
pub async fn run(config: RelayConfig) -> Result<(), StartupError> {
    let mappings_path = config.mappings.path.clone();
    let table = MappingTable::load(&mappings_path).map_err(|source| StartupError::Mappings {
        path: mappings_path.clone(),
        source,
    })?;
    tracing::info!(
        path = %mappings_path.display(),
        platforms = ?table.platform_names().collect::<Vec<_>>(),
        entries = table.entry_count(),
        "Mappings loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse::<SocketAddr>() {
            metrics::init_metrics(addr);
        }
    }

    let store = MappingStore::new(table);
    let shutdown = Shutdown::new();

    let _sighup = signals::spawn_sighup_reload(store.clone(), mappings_path.clone(), shutdown.subscribe())?;

    // Dropping the watcher stops file events, so it lives until run() returns.
    let _watcher = if config.mappings.watch {
        match MappingWatcher::new(&mappings_path, store.clone()).spawn() {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(error = %e, "Failed to start mapping watcher; SIGHUP reload still available");
                None
            }
        }
    } else {
        None
    };

    if config.admin.enabled {
        let admin = setup_admin_router(AdminState {
            store: store.clone(),
            mappings_path: mappings_path.clone(),
            api_key: Arc::from(config.admin.api_key.as_str()),
        });
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        tracing::info!(address = %listener.local_addr()?, "Admin API listening");
        let admin_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, admin)
                .with_graceful_shutdown(shutdown::wait(admin_shutdown))
                .await
            {
                tracing::error!(error = %e, "Admin API stopped with error");
            }
        });
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        timeout_ms = config.forwarding.timeout_ms,
        "Listening for webhooks"
    );

    let server = HttpServer::new(config, store)?;
    let server_shutdown = shutdown.subscribe();

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        trigger.trigger();
    });

    server.run(listener, server_shutdown).await?;
    Ok(())
}
