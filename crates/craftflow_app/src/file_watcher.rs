// SPDX-License-Identifier: MIT OR Apache-2.0
//! File system watcher for dataset hot reload.
//!
//! Watches the directory containing each dataset file and reports debounced
//! changes to the dataset files only. The UI thread polls for events once per
//! frame.

use notify_debouncer_full::{
    new_debouncer,
    notify::{self, EventKind, RecommendedWatcher, RecursiveMode},
    DebounceEventResult, Debouncer, RecommendedCache,
};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

/// Events emitted by the dataset watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetEvent {
    /// A dataset file was created or modified
    Changed(PathBuf),
    /// A dataset file was deleted
    Removed(PathBuf),
    /// An error occurred
    Error(String),
}

/// Configuration for the dataset watcher
#[derive(Debug, Clone)]
pub struct DatasetWatcherConfig {
    /// Debounce duration for events
    pub debounce_duration: Duration,
}

impl Default for DatasetWatcherConfig {
    fn default() -> Self {
        Self {
            debounce_duration: Duration::from_millis(300),
        }
    }
}

/// Debounced watcher for dataset files
pub struct DatasetWatcher {
    /// The underlying debounced watcher
    watcher: Debouncer<RecommendedWatcher, RecommendedCache>,
    /// Receiver for dataset events
    event_rx: Receiver<DatasetEvent>,
    /// File names reported by the watcher callback
    targets: Arc<RwLock<HashSet<OsString>>>,
    /// Watched directories
    watched_dirs: HashSet<PathBuf>,
}

impl DatasetWatcher {
    /// Create a watcher that is not watching anything yet
    pub fn new(config: DatasetWatcherConfig) -> Result<Self, notify::Error> {
        let (event_tx, event_rx) = mpsc::channel();
        let targets: Arc<RwLock<HashSet<OsString>>> = Arc::default();
        let filter = Arc::clone(&targets);

        let watcher = new_debouncer(
            config.debounce_duration,
            None,
            move |result: DebounceEventResult| match result {
                Ok(events) => {
                    let targets = filter.read();
                    for event in events {
                        for path in event.paths.iter().filter(|p| is_target(p, &targets)) {
                            let dataset_event = match event.kind {
                                EventKind::Create(_) | EventKind::Modify(_) => {
                                    DatasetEvent::Changed(path.clone())
                                }
                                EventKind::Remove(_) => DatasetEvent::Removed(path.clone()),
                                EventKind::Any | EventKind::Access(_) | EventKind::Other => continue,
                            };
                            let _ = event_tx.send(dataset_event);
                        }
                    }
                }
                Err(errors) => {
                    for error in errors {
                        let _ = event_tx.send(DatasetEvent::Error(error.to_string()));
                    }
                }
            },
        )?;

        Ok(Self {
            watcher,
            event_rx,
            targets,
            watched_dirs: HashSet::new(),
        })
    }

    /// Watch a dataset file for changes
    pub fn watch(&mut self, dataset: &Path) -> Result<(), notify::Error> {
        let Some(name) = dataset.file_name() else {
            return Err(notify::Error::path_not_found().add_path(dataset.to_path_buf()));
        };
        let dir = match dataset.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        if !self.watched_dirs.contains(&dir) {
            self.watcher.watch(&dir, RecursiveMode::NonRecursive)?;
            self.watched_dirs.insert(dir.clone());
        }
        self.targets.write().insert(name.to_os_string());
        tracing::info!("Watching dataset for changes: {:?}", dataset);
        Ok(())
    }

    #[cfg(test)]
    fn is_watching(&self, dataset: &Path) -> bool {
        dataset
            .file_name()
            .is_some_and(|name| self.targets.read().contains(name))
    }

    /// Poll for pending events (non-blocking)
    pub fn poll_events(&self) -> Vec<DatasetEvent> {
        let mut events = Vec::new();
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("Dataset watcher channel disconnected");
                    break;
                }
            }
        }
        events
    }

    /// Drain pending events and report whether any dataset changed.
    /// Errors and removals are logged.
    pub fn take_changed(&self) -> bool {
        let mut changed = false;
        for event in self.poll_events() {
            match event {
                DatasetEvent::Changed(path) => {
                    tracing::debug!("Dataset changed: {:?}", path);
                    changed = true;
                }
                DatasetEvent::Removed(path) => {
                    tracing::warn!("Dataset removed, keeping the loaded one: {:?}", path);
                }
                DatasetEvent::Error(e) => tracing::warn!("Dataset watcher error: {e}"),
            }
        }
        changed
    }
}

fn is_target(path: &Path, targets: &HashSet<OsString>) -> bool {
    path.file_name().is_some_and(|name| targets.contains(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = DatasetWatcherConfig::default();
        assert_eq!(config.debounce_duration, Duration::from_millis(300));
    }

    #[test]
    fn test_only_dataset_files_are_targets() {
        let targets: HashSet<OsString> = [OsString::from("recipes.json")].into_iter().collect();
        assert!(is_target(Path::new("/data/recipes.json"), &targets));
        assert!(!is_target(Path::new("/data/recipes.json.swp"), &targets));
        assert!(!is_target(Path::new("/data"), &targets));
    }

    #[test]
    fn test_watch_registers_dataset() {
        let dir = std::env::temp_dir().join(format!("craftflow-watch-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let dataset = dir.join("recipes.json");

        let mut watcher = DatasetWatcher::new(DatasetWatcherConfig::default()).unwrap();
        watcher.watch(&dataset).unwrap();
        assert!(watcher.is_watching(&dataset));
        assert!(!watcher.is_watching(&dir.join("other.json")));
        assert!(!watcher.take_changed());

        drop(watcher);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
