//! Destination lookup against a mapping table snapshot.
//!
//! # Design Decisions
//! - Read-only; callers pass the snapshot taken at request start
//! - First candidate present in the platform table wins
//! - Fallback key consulted only after every candidate missed
//! - Explicit error variants rather than a silent default

use std::fmt;

use thiserror::Error;

use crate::mapping::table::{MappingTable, Platform, FALLBACK_KEY};

/// Which table entry a request was routed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingKey {
    Identifier(String),
    Fallback,
}

impl RoutingKey {
    pub fn as_str(&self) -> &str {
        match self {
            RoutingKey::Identifier(id) => id,
            RoutingKey::Fallback => FALLBACK_KEY,
        }
    }
}

impl fmt::Display for RoutingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub key: RoutingKey,
    pub destination: String,
}

/// Lookup failures. Both surface as 404 to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no mappings configured for platform '{platform}'")]
    PlatformNotConfigured { platform: Platform },

    #[error("no mapping for {platform} key '{key}'")]
    UnmappedIdentifier { platform: Platform, key: String },
}

/// Resolve the destination for a platform from ordered candidates.
pub fn resolve(
    table: &MappingTable,
    platform: Platform,
    candidates: &[String],
) -> Result<Resolution, ResolveError> {
    let routes = table
        .platform(platform)
        .ok_or(ResolveError::PlatformNotConfigured { platform })?;

    for candidate in candidates {
        if let Some(destination) = routes.get(candidate) {
            return Ok(Resolution {
                key: RoutingKey::Identifier(candidate.clone()),
                destination: destination.to_string(),
            });
        }
    }

    if let Some(destination) = routes.fallback() {
        return Ok(Resolution {
            key: RoutingKey::Fallback,
            destination: destination.to_string(),
        });
    }

    Err(ResolveError::UnmappedIdentifier {
        platform,
        key: candidates
            .first()
            .cloned()
            .unwrap_or_else(|| "none".to_string()),
    })
}
