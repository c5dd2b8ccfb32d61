//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! relay.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!
//! mappings.json (separate, reloadable):
//!     watcher.rs detects a change in the parent directory
//!     → MappingStore::reload_from (same path as SIGHUP and admin reload)
//!     → table swapped, or the current one kept on error
//! ```
//!
//! # Design Decisions
//! - Relay config is read once at startup; only mappings reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, ForwardingConfig, ListenerConfig, LogFormat, MappingsConfig, ObservabilityConfig,
    RelayConfig,
};
pub use watcher::MappingWatcher;
