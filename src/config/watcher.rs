//! Mapping file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself: editors and
//! orchestrators replace the file by renaming a new one over it, which drops
//! a watch held on the old inode. Events are filtered on the file name and
//! each burst of events triggers one `MappingStore::reload_from`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::mapping::MappingStore;

/// Quiet period that folds one save into a single reload.
const SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Reloads the mapping store whenever the mapping file changes.
pub struct MappingWatcher {
    path: PathBuf,
    store: MappingStore,
}

impl MappingWatcher {
    pub fn new(path: &Path, store: MappingStore) -> Self {
        Self {
            path: path.to_path_buf(),
            store,
        }
    }

    /// Start watching. Must be called inside a tokio runtime.
    ///
    /// The returned watcher must be kept alive for events to be delivered;
    /// dropping it also ends the reload task.
    pub fn spawn(self) -> Result<RecommendedWatcher, notify::Error> {
        let (changed_tx, mut changed_rx) = mpsc::unbounded_channel::<()>();
        let file_name = self.path.file_name().map(|name| name.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if concerns_file(&event, file_name.as_ref()) {
                        let _ = changed_tx.send(());
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Mapping watch error"),
            },
            Config::default(),
        )?;

        let dir = watch_dir(&self.path);
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(path = %self.path.display(), dir = %dir.display(), "Mapping watcher started");

        let Self { path, store } = self;
        tokio::spawn(async move {
            while changed_rx.recv().await.is_some() {
                tokio::time::sleep(SETTLE_DELAY).await;
                while changed_rx.try_recv().is_ok() {}

                tracing::info!(path = %path.display(), "Mapping file change detected");
                // Failures are logged and counted by the store.
                if let Ok(entries) = store.reload_from(&path) {
                    tracing::info!(entries, "Mappings reloaded from file change");
                }
            }
        });

        Ok(watcher)
    }
}

/// Directory holding the mapping file.
fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Whether a directory event created or changed the mapping file.
fn concerns_file(event: &Event, file_name: Option<&OsString>) -> bool {
    if !(event.kind.is_modify() || event.kind.is_create()) {
        return false;
    }
    let Some(file_name) = file_name else {
        return false;
    };
    event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name.as_os_str()))
}
