use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::io::collection::Collection;
use crate::model::Todo;

/// Error type for index cache resolution
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("no task found with id {0} (run `todo list` to number tasks)")]
    UnknownPosition(u32),
    #[error("task {list}/{filename} no longer exists (run `todo list` to refresh ids)")]
    Stale { list: String, filename: String },
    #[error("could not write index cache {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One row of the last listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub list: String,
    pub filename: String,
}

/// The position→task mapping written by the last `list` invocation.
///
/// This is what lets `todo done 3` in a fresh process find the exact
/// record that was printed as row 3. Entries go stale as soon as the
/// underlying records change without a new listing; resolution treats
/// that as an expected per-id failure, never as corruption.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexCache {
    #[serde(default)]
    pub entries: BTreeMap<u32, IndexEntry>,
}

impl IndexCache {
    pub fn insert(&mut self, position: u32, list: &str, filename: &str) {
        self.entries.insert(
            position,
            IndexEntry {
                list: list.to_string(),
                filename: filename.to_string(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a 1-based position to its (list name, record) pair.
    ///
    /// Distinguishes "this position was never assigned" from "the
    /// position was assigned but the record has since disappeared".
    pub fn resolve(
        &self,
        position: u32,
        collection: &Collection,
    ) -> Result<(String, Todo), IndexError> {
        let entry = self
            .entries
            .get(&position)
            .ok_or(IndexError::UnknownPosition(position))?;

        let stale = |entry: &IndexEntry| IndexError::Stale {
            list: entry.list.clone(),
            filename: entry.filename.clone(),
        };
        let store = collection.get(&entry.list).ok_or_else(|| stale(entry))?;
        let todo = store
            .get(&entry.filename)
            .cloned()
            .ok_or_else(|| stale(entry))?;
        Ok((entry.list.clone(), todo))
    }
}

/// Read the index cache. A missing or unreadable cache is simply empty:
/// every lookup against it fails with UnknownPosition.
pub fn read_index(path: &Path) -> IndexCache {
    let Ok(content) = fs::read_to_string(path) else {
        return IndexCache::default();
    };
    serde_json::from_str(&content).unwrap_or_default()
}

/// Overwrite the index cache with the rows of the listing just produced.
pub fn write_index(path: &Path, cache: &IndexCache) -> Result<(), IndexError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| IndexError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    let content = serde_json::to_string_pretty(cache).expect("index cache serializes");
    fs::write(path, content).map_err(|e| IndexError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}
