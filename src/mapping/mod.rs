//! Destination mapping subsystem.
//!
//! # Data Flow
//! ```text
//! mappings.json
//!     → table.rs (parse into immutable MappingTable)
//!     → store.rs (ArcSwap, replaced wholesale on reload)
//!
//! Per request:
//!     parsed body  → extractor.rs (entry[0].id)
//!     query string → extractor.rs (id, page_id, ig_id)
//!     candidates + snapshot → resolver.rs → Resolution | ResolveError
//! ```
//!
//! # Design Decisions
//! - The table is never mutated in place; reload builds a new one
//! - Readers take one snapshot per request and never lock
//! - First matching candidate wins, then the "default" fallback

pub mod extractor;
pub mod resolver;
pub mod store;
pub mod table;

pub use extractor::{extract_identifier, query_candidates, QUERY_ID_FIELDS};
pub use resolver::{resolve, Resolution, ResolveError, RoutingKey};
pub use store::MappingStore;
pub use table::{MappingError, MappingTable, Platform, PlatformMapping, FALLBACK_KEY};
