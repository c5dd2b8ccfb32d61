//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use axum::http::HeaderName;
use serde::{Deserialize, Serialize};

/// Root configuration for the webhook relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Outbound forwarding settings.
    pub forwarding: ForwardingConfig,

    /// Mapping table source.
    pub mappings: MappingsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Outbound forwarding configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardingConfig {
    /// Deadline for the whole outbound exchange in milliseconds.
    pub timeout_ms: u64,

    /// Largest inbound body accepted, in bytes.
    pub max_body_bytes: usize,

    /// Header carrying the routing key to the destination.
    pub relay_key_header: String,
}

impl ForwardingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed routing key header, falling back to the default name.
    pub fn key_header(&self) -> HeaderName {
        HeaderName::try_from(self.relay_key_header.as_str())
            .unwrap_or_else(|_| HeaderName::from_static(DEFAULT_RELAY_KEY_HEADER))
    }
}

pub const DEFAULT_RELAY_KEY_HEADER: &str = "x-relay-key";

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
            relay_key_header: DEFAULT_RELAY_KEY_HEADER.to_string(),
        }
    }
}

/// Where the mapping table comes from.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MappingsConfig {
    /// Path to the JSON mapping document.
    pub path: PathBuf,

    /// Reload automatically when the file changes.
    pub watch: bool,
}

impl Default for MappingsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("mappings.json"),
            watch: true,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

pub const PLACEHOLDER_API_KEY: &str = "CHANGE_ME_IN_PRODUCTION";

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: PLACEHOLDER_API_KEY.to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
