//! Atomically swappable holder for the current mapping table.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::mapping::table::{MappingError, MappingTable};
use crate::observability::metrics;

/// Shared handle to the live mapping table.
///
/// Cloning is cheap; all clones observe the same table. Reload replaces the
/// whole table, so a reader sees either the old or the new one.
#[derive(Debug, Clone)]
pub struct MappingStore {
    current: Arc<ArcSwap<MappingTable>>,
}

impl MappingStore {
    pub fn new(table: MappingTable) -> Self {
        metrics::record_mapping_entries(table.entry_count());
        Self {
            current: Arc::new(ArcSwap::from_pointee(table)),
        }
    }

    /// Take a consistent snapshot for the duration of one request.
    pub fn snapshot(&self) -> Arc<MappingTable> {
        self.current.load_full()
    }

    /// Swap in a new table.
    pub fn replace(&self, table: MappingTable) {
        let entries = table.entry_count();
        self.current.store(Arc::new(table));
        metrics::record_mapping_entries(entries);
        tracing::info!(entries, "Mapping table replaced");
    }

    /// Reload from disk. On failure the current table stays in place.
    pub fn reload_from(&self, path: &Path) -> Result<usize, MappingError> {
        match MappingTable::load(path) {
            Ok(table) => {
                let entries = table.entry_count();
                self.replace(table);
                metrics::record_mapping_reload(true);
                Ok(entries)
            }
            Err(e) => {
                metrics::record_mapping_reload(false);
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "Failed to reload mappings. Keeping current table."
                );
                Err(e)
            }
        }
    }
}
