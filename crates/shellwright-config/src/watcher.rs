//! External edit detection
//!
//! Watches the configuration file and drops the store's cache when it
//! changes on disk, so the next read picks up a hand edit without waiting
//! for the TTL. The watcher never writes; [`ConfigStore::set`] stays the
//! only write path.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error};

use crate::{error::Result, store::ConfigStore};

/// Invalidates a [`ConfigStore`] cache on file changes. Stops when dropped.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl ConfigWatcher {
    /// Start watching the store's file.
    ///
    /// The parent directory is watched rather than the file itself, since
    /// atomic saves replace the file and would orphan a file watch.
    pub fn new(store: Arc<ConfigStore>) -> Result<Self> {
        let path = store.path().to_path_buf();
        let dir = watch_dir(&path);
        std::fs::create_dir_all(&dir)?;

        let target = path.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: std::result::Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if is_relevant(&event, &target) {
                        debug!(path = %target.display(), "configuration changed on disk");
                        store.invalidate();
                    }
                }
                Err(e) => error!("configuration watch error: {}", e),
            },
            notify::Config::default(),
        )
        .map_err(std::io::Error::other)?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(std::io::Error::other)?;

        Ok(Self {
            _watcher: watcher,
            path,
        })
    }

    /// File being watched
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn is_relevant(event: &Event, target: &Path) -> bool {
    let changes_content = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    changes_content
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == target.file_name())
}
