//! Directory discovery: lists the immediate children of one directory.
//!
//! This is the only place that touches the filesystem on behalf of the tree.
//! The tree hands out [`DiscoveryRequest`](crate::tree::DiscoveryRequest)s and
//! gets the result back through the event loop.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::event::Event;
use crate::icons;
use crate::tree::DiscoveryRequest;

/// One directory entry as reported by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    /// Lowercase final extension, empty for directories and extensionless files.
    pub file_type: String,
    /// Symbolic icon key, resolved to a glyph by [`crate::icons`].
    pub icon: String,
}

impl PathEntry {
    /// Build an entry from a path and whether it is a directory.
    pub fn from_path(path: &Path, is_dir: bool) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        let file_type = if is_dir {
            String::new()
        } else {
            path.extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default()
        };

        let icon = if is_dir {
            icons::FOLDER.to_string()
        } else {
            icons::key_for_file_type(&file_type).to_string()
        };

        Self {
            path: path.to_path_buf(),
            name,
            is_dir,
            file_type,
            icon,
        }
    }
}

/// Discovery failed for the whole directory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DiscoveryError {
    pub message: String,
}

impl From<std::io::Error> for DiscoveryError {
    fn from(err: std::io::Error) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// List the immediate children of `path`.
///
/// Entries whose metadata cannot be read are skipped. Symlinks are followed
/// when deciding `is_dir`.
pub async fn discover_path(
    path: &Path,
    dirs_first: bool,
) -> Result<Vec<PathEntry>, DiscoveryError> {
    let mut entries = Vec::new();
    let mut dir = tokio::fs::read_dir(path).await?;

    while let Some(entry) = dir.next_entry().await? {
        let entry_path = entry.path();
        let is_dir = match tokio::fs::metadata(&entry_path).await {
            Ok(meta) => meta.is_dir(),
            Err(err) => {
                tracing::debug!(path = %entry_path.display(), %err, "skipping unreadable entry");
                continue;
            }
        };
        entries.push(PathEntry::from_path(&entry_path, is_dir));
    }

    sort_entries(&mut entries, dirs_first);
    Ok(entries)
}

/// Case-insensitive name order, optionally with directories first.
pub fn sort_entries(entries: &mut [PathEntry], dirs_first: bool) {
    entries.sort_by(|a, b| {
        let mut cmp = std::cmp::Ordering::Equal;
        if dirs_first {
            cmp = b.is_dir.cmp(&a.is_dir);
        }
        cmp.then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}

/// Run `request` on the tokio runtime and post the outcome back as
/// [`Event::Discovered`]. Fire-and-forget.
pub fn spawn(request: DiscoveryRequest, dirs_first: bool, tx: mpsc::UnboundedSender<Event>) {
    tokio::spawn(async move {
        let result = discover_path(&request.path, dirs_first).await;
        if let Err(ref err) = result {
            tracing::warn!(path = %request.path.display(), %err, "discovery failed");
        }
        let _ = tx.send(Event::Discovered {
            node: request.node,
            result,
        });
    });
}
