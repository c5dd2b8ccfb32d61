//! Webhook Relay (v1)
//!
//! Accepts platform webhooks and relays each one to the destination mapped
//! for its page/account identifier.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                  WEBHOOK RELAY                    │
//!                        │                                                   │
//!   Platform webhook     │  ┌─────────┐   ┌───────────┐   ┌──────────────┐  │
//!   ─────────────────────┼─▶│  http   │──▶│ extractor │──▶│   resolver   │  │
//!   /messenger           │  │ server  │   │ body+query│   │  + snapshot  │  │
//!   /instagram           │  └─────────┘   └───────────┘   └──────┬───────┘  │
//!                        │                                       │          │
//!                        │                                       ▼          │
//!   Mirrored response    │  ┌─────────┐   ┌───────────┐   ┌──────────────┐  │
//!   ◀────────────────────┼──│ handler │◀──│  headers  │◀──│  forwarder   │◀─┼── Destination
//!                        │  │ mirror  │   │ sanitizer │   │ (1 attempt)  │  │
//!                        │  └─────────┘   └───────────┘   └──────────────┘  │
//!                        │                                                   │
//!                        │  ┌─────────────────────────────────────────────┐ │
//!                        │  │ config · mapping reload (SIGHUP/watch/admin)│ │
//!                        │  │ logging · metrics · lifecycle               │ │
//!                        │  └─────────────────────────────────────────────┘ │
//!                        └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use webhook_relay::lifecycle::startup::{self, StartupOptions};
use webhook_relay::observability::logging;

#[derive(Parser)]
#[command(name = "webhook-relay")]
#[command(about = "Relay platform webhooks to per-page destinations", long_about = None)]
struct Cli {
    /// Relay configuration file (TOML). Defaults to ./relay.toml when present.
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Mapping table (JSON), overriding `mappings.path`.
    #[arg(short, long, env = "RELAY_MAPPINGS")]
    mappings: Option<PathBuf>,

    /// Listener address, overriding `listener.bind_address`.
    #[arg(short, long, env = "RELAY_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = startup::resolve_config(&StartupOptions {
        config_path: cli.config,
        mappings_path: cli.mappings,
        bind_address: cli.bind,
    })?;

    logging::init_logging(&config.observability);
    tracing::info!("webhook-relay v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
