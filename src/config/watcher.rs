//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::WatchError;

/// Kind of change that may alter what the supervised process would load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Modified,
    Created,
    Removed,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Modified => "modified",
            ChangeKind::Created => "created",
            ChangeKind::Removed => "removed",
        }
    }
}

/// Map a notify event kind to a reload trigger.
///
/// Metadata changes, renames and access events return `None`.
pub fn classify(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Modify(ModifyKind::Metadata(_)) | EventKind::Modify(ModifyKind::Name(_)) => None,
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Remove(_) => Some(ChangeKind::Removed),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}

/// Watches the configuration paths and hands every raw notification to a callback.
///
/// Keeps the ordered watch set so paths can be registered again after a removal,
/// which is how mounted config volumes swap their symlinks.
pub struct ConfigWatcher {
    watcher: RecommendedWatcher,
    paths: Vec<PathBuf>,
}

impl std::fmt::Debug for ConfigWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigWatcher").field("paths", &self.paths).finish()
    }
}

impl ConfigWatcher {
    /// Create a watcher with an empty watch set.
    pub fn new<F>(handler: F) -> Result<Self, WatchError>
    where
        F: Fn(notify::Result<Event>) + Send + 'static,
    {
        let watcher = RecommendedWatcher::new(handler, Config::default()).map_err(WatchError::Create)?;
        Ok(Self {
            watcher,
            paths: Vec::new(),
        })
    }

    /// Start watching `path`. Adding a path twice keeps a single watch.
    pub fn add(&mut self, path: &Path) -> Result<(), WatchError> {
        if self.paths.iter().any(|p| p == path) {
            let _ = self.watcher.unwatch(path);
        }
        self.watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Add {
                path: path.to_path_buf(),
                source,
            })?;

        if !self.paths.iter().any(|p| p == path) {
            self.paths.push(path.to_path_buf());
        }
        tracing::info!(path = %path.display(), "watch");
        Ok(())
    }

    /// Watched paths in registration order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Register again the watched paths named by a removal event.
    ///
    /// Falls back to the whole watch set when the event names none of them.
    /// Returns one error per path that could not be watched again.
    pub fn rewatch(&mut self, event: &Event) -> Vec<WatchError> {
        let mut targets: Vec<PathBuf> = self
            .paths
            .iter()
            .filter(|p| event.paths.iter().any(|e| e == *p))
            .cloned()
            .collect();
        if targets.is_empty() {
            targets = self.paths.clone();
        }

        targets
            .iter()
            .filter_map(|path| self.add(path).err())
            .collect()
    }
}
