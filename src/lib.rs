//! Webhook Relay Library
//!
//! Single-hop relay for platform webhooks: resolve a destination from an
//! identifier-keyed mapping table, forward the request verbatim, and mirror
//! the destination's response back to the caller.

pub mod admin;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod mapping;
pub mod observability;
pub mod relay;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use mapping::{MappingStore, MappingTable, Platform};
pub use relay::Relay;
