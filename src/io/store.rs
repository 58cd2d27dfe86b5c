use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ulid::Ulid;

use crate::model::Todo;

/// Error type for task storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize task: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// One list: a directory holding one task per `*.toml` file.
///
/// All records are loaded eagerly on open. There is no cross-process
/// locking; concurrent invocations against the same directory may race
/// (last write wins), which is an accepted limitation of the design.
#[derive(Debug)]
pub struct Store {
    name: String,
    dir: PathBuf,
    todos: BTreeMap<String, Todo>,
}

impl Store {
    /// Open a list directory and load every task in it.
    ///
    /// The list name is the directory's final path segment. Files that
    /// fail to parse are skipped with a warning on stderr so one
    /// corrupt record cannot hide the rest of the list.
    pub fn open(dir: &Path) -> Result<Store, StoreError> {
        if !dir.is_dir() {
            return Err(StoreError::NotADirectory(dir.to_path_buf()));
        }

        let name = dir
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());

        let mut todos = BTreeMap::new();
        let entries = fs::read_dir(dir).map_err(|e| StoreError::ReadError {
            path: dir.to_path_buf(),
            source: e,
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| StoreError::ReadError {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if path.is_dir() || path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            let filename = match path.file_name().and_then(|s| s.to_str()) {
                Some(f) => f.to_string(),
                None => continue,
            };

            let text = fs::read_to_string(&path).map_err(|e| StoreError::ReadError {
                path: path.clone(),
                source: e,
            })?;
            match toml::from_str::<Todo>(&text) {
                Ok(mut todo) => {
                    todo.filename = Some(filename.clone());
                    todos.insert(filename, todo);
                }
                Err(e) => {
                    eprintln!("warning: skipping {}: {}", path.display(), e);
                }
            }
        }

        Ok(Store {
            name,
            dir: dir.to_path_buf(),
            todos,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn todos(&self) -> impl Iterator<Item = &Todo> {
        self.todos.values()
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn get(&self, filename: &str) -> Option<&Todo> {
        self.todos.get(filename)
    }

    /// Persist a task into this list, assigning a fresh filename if the
    /// record has never been saved. Saving an already-named record
    /// overwrites its file in place.
    pub fn save(&mut self, todo: &mut Todo) -> Result<(), StoreError> {
        let filename = match &todo.filename {
            Some(f) => f.clone(),
            None => {
                let f = format!("{}.toml", Ulid::new());
                todo.filename = Some(f.clone());
                f
            }
        };

        let path = self.dir.join(&filename);
        let text = toml::to_string_pretty(&*todo)?;
        fs::write(&path, text).map_err(|e| StoreError::WriteError {
            path: path.clone(),
            source: e,
        })?;

        self.todos.insert(filename, todo.clone());
        Ok(())
    }
}
