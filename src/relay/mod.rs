//! Relay pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound webhook (platform route)
//!     → handler.rs (collect candidates, resolve against snapshot)
//!     → headers.rs (strip hop-by-hop from caller headers)
//!     → forwarder.rs (single bounded outbound attempt)
//!     → headers.rs (strip hop-by-hop from destination headers)
//!     → handler.rs (mirror status, headers, body)
//! ```
//!
//! # Design Decisions
//! - Request body bytes are never re-encoded
//! - No retries; a failed attempt is a 502
//! - Resolution failures are 404 with a diagnostic message

pub mod error;
pub mod forwarder;
pub mod handler;
pub mod headers;

pub use error::RelayError;
pub use forwarder::{ForwardError, ForwardRequest, ForwardedResponse, Forwarder};
pub use handler::{InboundRequest, Relay};
pub use headers::{sanitize_headers, HOP_BY_HOP_HEADERS};
