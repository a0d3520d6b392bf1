use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use notify_debouncer_mini::{new_debouncer, DebouncedEvent, DebouncedEventKind, Debouncer};
use tokio::sync::mpsc;

use crate::event::Event;

/// Directory names whose changes are never reported.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    "venv",
    ".venv",
    ".mypy_cache",
    ".pytest_cache",
    "target",
];

/// More paths than this in one debounce window are reported as a change of the root.
pub const DEFAULT_FLOOD_THRESHOLD: usize = 100;

/// Watches the opened root recursively and posts [`Event::FsChange`].
///
/// Dropping the watcher stops it; [`FsWatcher::cancel`] does the same explicitly.
pub struct FsWatcher {
    root: PathBuf,
    cancelled: Arc<AtomicBool>,
    _debouncer: Debouncer<notify::RecommendedWatcher>,
}

impl FsWatcher {
    pub fn new(
        root: &Path,
        debounce: Duration,
        ignore_patterns: Vec<String>,
        flood_threshold: usize,
        event_tx: mpsc::UnboundedSender<Event>,
    ) -> notify::Result<Self> {
        let cancelled = Arc::new(AtomicBool::new(false));
        let cancelled_flag = cancelled.clone();
        let root_path = root.to_path_buf();

        let mut debouncer = new_debouncer(
            debounce,
            move |result: Result<Vec<DebouncedEvent>, notify::Error>| {
                if cancelled_flag.load(Ordering::Relaxed) {
                    return;
                }
                match result {
                    Ok(events) => {
                        let paths: Vec<PathBuf> = events
                            .into_iter()
                            .filter(|e| e.kind == DebouncedEventKind::Any)
                            .map(|e| e.path)
                            .filter(|p| !should_ignore(p, &ignore_patterns))
                            .collect();
                        if paths.is_empty() {
                            return;
                        }
                        let paths = collapse_flood(paths, &root_path, flood_threshold);
                        tracing::debug!(count = paths.len(), "filesystem change");
                        let _ = event_tx.send(Event::FsChange(paths));
                    }
                    Err(err) => {
                        tracing::warn!(%err, "watcher error");
                    }
                }
            },
        )?;

        debouncer
            .watcher()
            .watch(root, notify::RecursiveMode::Recursive)?;
        tracing::debug!(root = %root.display(), "watcher started");

        Ok(Self {
            root: root.to_path_buf(),
            cancelled,
            _debouncer: debouncer,
        })
    }

    #[cfg(test)]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stop watching. Events already in flight are dropped.
    pub fn cancel(self) {
        self.cancelled.store(true, Ordering::Relaxed);
        tracing::debug!(root = %self.root.display(), "watcher cancelled");
    }

    #[cfg(test)]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// A path is ignored if any of its components equals one of `patterns`.
pub fn should_ignore(path: &Path, patterns: &[String]) -> bool {
    path.components().any(|component| match component {
        Component::Normal(name) => {
            let name = name.to_string_lossy();
            patterns.iter().any(|p| *p == name)
        }
        _ => false,
    })
}

fn collapse_flood(paths: Vec<PathBuf>, root: &Path, threshold: usize) -> Vec<PathBuf> {
    if paths.len() > threshold {
        vec![root.to_path_buf()]
    } else {
        paths
    }
}
