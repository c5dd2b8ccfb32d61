//! Mapping table definitions and loading.
//!
//! The on-disk format is a JSON object keyed by platform name, each value
//! an object of routing identifier to destination URL:
//!
//! ```json
//! {
//!   "messenger": { "1234": "https://a.example/hook", "default": "https://b.example/hook" },
//!   "instagram": { "5678": "https://c.example/hook" }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Reserved sub-mapping key matched when no candidate identifier matches.
pub const FALLBACK_KEY: &str = "default";

/// Inbound webhook source. Each platform owns one relay route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Messenger,
    Instagram,
}

impl Platform {
    /// Every platform the relay serves.
    pub const ALL: [Platform; 2] = [Platform::Messenger, Platform::Instagram];

    /// Key of this platform in the mapping table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Messenger => "messenger",
            Platform::Instagram => "instagram",
        }
    }

    /// Route path serving this platform.
    pub fn path(&self) -> &'static str {
        match self {
            Platform::Messenger => "/messenger",
            Platform::Instagram => "/instagram",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while loading a mapping table.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("failed to read mapping file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse mapping file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("mapping document must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Routing identifier → destination URL for one platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PlatformMapping {
    routes: BTreeMap<String, String>,
}

impl PlatformMapping {
    /// Destination for an exact identifier.
    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.routes.get(identifier).map(String::as_str)
    }

    /// Destination registered under the fallback key, if any.
    pub fn fallback(&self) -> Option<&str> {
        self.get(FALLBACK_KEY)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Immutable snapshot of every platform's routing table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MappingTable {
    platforms: BTreeMap<String, PlatformMapping>,
}

impl MappingTable {
    /// Read and parse a mapping file.
    pub fn load(path: &Path) -> Result<Self, MappingError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, MappingError> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    /// Build a table from an already parsed document.
    ///
    /// Platform entries that are not objects and route entries that are not
    /// strings are skipped with a warning, so a single bad entry never makes
    /// the whole document unusable.
    pub fn from_value(value: Value) -> Result<Self, MappingError> {
        let root = match value {
            Value::Object(map) => map,
            other => return Err(MappingError::NotAnObject(json_kind(&other))),
        };

        let mut platforms = BTreeMap::new();
        for (platform, entries) in root {
            let entries = match entries {
                Value::Object(entries) => entries,
                other => {
                    tracing::warn!(
                        platform = %platform,
                        found = json_kind(&other),
                        "Ignoring platform mapping that is not an object"
                    );
                    continue;
                }
            };

            let mut routes = BTreeMap::new();
            for (identifier, destination) in entries {
                match destination {
                    Value::String(url) => {
                        routes.insert(identifier, url);
                    }
                    other => {
                        tracing::warn!(
                            platform = %platform,
                            identifier = %identifier,
                            found = json_kind(&other),
                            "Ignoring mapping entry whose destination is not a string"
                        );
                    }
                }
            }
            platforms.insert(platform, PlatformMapping { routes });
        }

        Ok(Self { platforms })
    }

    /// Sub-mapping for a platform, if configured.
    pub fn platform(&self, platform: Platform) -> Option<&PlatformMapping> {
        self.platforms.get(platform.as_str())
    }

    /// Names of all configured platforms.
    pub fn platform_names(&self) -> impl Iterator<Item = &str> {
        self.platforms.keys().map(String::as_str)
    }

    /// Total number of routing entries across platforms.
    pub fn entry_count(&self) -> usize {
        self.platforms.values().map(PlatformMapping::len).sum()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_platform_tables() {
        let table = MappingTable::from_value(json!({
            "messenger": { "123": "http://d/x", "default": "http://d/fallback" },
            "instagram": {}
        }))
        .unwrap();

        let messenger = table.platform(Platform::Messenger).unwrap();
        assert_eq!(messenger.get("123"), Some("http://d/x"));
        assert_eq!(messenger.fallback(), Some("http://d/fallback"));
        assert!(table.platform(Platform::Instagram).unwrap().is_empty());
        assert_eq!(table.entry_count(), 2);
    }

    #[test]
    fn skips_malformed_entries() {
        let table = MappingTable::from_value(json!({
            "messenger": ["not", "an", "object"],
            "instagram": { "1": 42, "2": "http://d/two" }
        }))
        .unwrap();

        assert!(table.platform(Platform::Messenger).is_none());
        let instagram = table.platform(Platform::Instagram).unwrap();
        assert_eq!(instagram.get("1"), None);
        assert_eq!(instagram.get("2"), Some("http://d/two"));
    }

    #[test]
    fn rejects_non_object_document() {
        let err = MappingTable::from_json_str("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, MappingError::NotAnObject("array")));

        let err = MappingTable::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, MappingError::Parse(_)));
    }

    #[test]
    fn serializes_back_to_document_shape() {
        let doc = json!({ "messenger": { "123": "http://d/x" } });
        let table = MappingTable::from_value(doc.clone()).unwrap();
        assert_eq!(serde_json::to_value(&table).unwrap(), doc);
    }
}
