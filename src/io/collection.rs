use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use regex::Regex;

use crate::io::store::{Store, StoreError};

/// Error type for collection discovery
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("two lists are named '{name}': {first} and {second}")]
    DuplicateName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("invalid list pattern '{0}'")]
    BadPattern(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Every discovered list, keyed by name.
///
/// Built once per invocation from the configured glob pattern and
/// discarded when the process exits.
#[derive(Debug, Default)]
pub struct Collection {
    stores: BTreeMap<String, Store>,
}

impl Collection {
    /// Expand `pattern` and open every matching directory as a list.
    ///
    /// Non-directory matches are skipped. Two directories normalizing
    /// to the same list name are a fatal configuration error.
    pub fn discover(pattern: &str) -> Result<Collection, CollectionError> {
        let mut collection = Collection::default();
        for dir in expand_glob(pattern)? {
            collection.insert(Store::open(&dir)?)?;
        }
        Ok(collection)
    }

    /// Insert a store, rejecting duplicate names.
    pub fn insert(&mut self, store: Store) -> Result<(), CollectionError> {
        let name = store.name().to_string();
        if let Some(existing) = self.stores.get(&name) {
            return Err(CollectionError::DuplicateName {
                name,
                first: existing.dir().to_path_buf(),
                second: store.dir().to_path_buf(),
            });
        }
        self.stores.insert(name, store);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Store> {
        self.stores.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Store> {
        self.stores.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stores.contains_key(name)
    }

    /// List names in display order
    pub fn names(&self) -> Vec<&str> {
        self.stores.keys().map(|s| s.as_str()).collect()
    }

    pub fn stores(&self) -> impl Iterator<Item = &Store> {
        self.stores.values()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

/// Expand a glob pattern into the directories it matches.
///
/// Supports `*` and `?` wildcards in any path segment. Hidden entries
/// are never matched by a wildcard. Segments without wildcards are
/// followed literally, so a pattern with no wildcards at all resolves
/// to at most its own path.
fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>, CollectionError> {
    let path = Path::new(pattern);
    let mut roots: Vec<PathBuf> = vec![PathBuf::new()];

    for component in path.components() {
        let segment = match component {
            Component::Normal(s) => s.to_string_lossy().into_owned(),
            Component::RootDir => {
                roots = vec![PathBuf::from("/")];
                continue;
            }
            Component::CurDir => continue,
            _ => return Err(CollectionError::BadPattern(pattern.to_string())),
        };

        if segment.contains('*') || segment.contains('?') {
            let re = segment_regex(&segment)
                .map_err(|_| CollectionError::BadPattern(pattern.to_string()))?;
            let mut next = Vec::new();
            for root in &roots {
                let Ok(entries) = fs::read_dir(root) else {
                    continue;
                };
                for entry in entries.flatten() {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if name.starts_with('.') || !re.is_match(&name) {
                        continue;
                    }
                    next.push(root.join(name));
                }
            }
            roots = next;
        } else {
            for root in &mut roots {
                root.push(&segment);
            }
        }
    }

    let mut dirs: Vec<PathBuf> = roots.into_iter().filter(|p| p.is_dir()).collect();
    dirs.sort();
    Ok(dirs)
}

/// Translate one glob segment into an anchored regex
fn segment_regex(segment: &str) -> Result<Regex, regex::Error> {
    let mut pattern = String::from("^");
    for c in segment.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            _ => pattern.push_str(&regex::escape(&c.to_string())),
        }
    }
    pattern.push('$');
    Regex::new(&pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mkdirs(root: &Path, names: &[&str]) {
        for name in names {
            fs::create_dir_all(root.join(name)).unwrap();
        }
    }

    #[test]
    fn discovers_matching_directories() {
        let tmp = TempDir::new().unwrap();
        mkdirs(tmp.path(), &["work", "home", ".hidden"]);
        fs::write(tmp.path().join("stray-file"), "x").unwrap();

        let pattern = format!("{}/*", tmp.path().display());
        let collection = Collection::discover(&pattern).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.names(), vec!["home", "work"]);
    }

    #[test]
    fn literal_pattern_matches_one_directory() {
        let tmp = TempDir::new().unwrap();
        mkdirs(tmp.path(), &["work"]);

        let pattern = format!("{}/work", tmp.path().display());
        let collection = Collection::discover(&pattern).unwrap();
        assert_eq!(collection.names(), vec!["work"]);
    }

    #[test]
    fn nonexistent_pattern_yields_empty_collection() {
        let tmp = TempDir::new().unwrap();
        let pattern = format!("{}/nothing/*", tmp.path().display());
        let collection = Collection::discover(&pattern).unwrap();
        assert!(collection.is_empty());
    }

    #[test]
    fn wildcards_in_middle_segments() {
        let tmp = TempDir::new().unwrap();
        mkdirs(tmp.path(), &["a/lists/work", "b/lists/home"]);

        let pattern = format!("{}/*/lists/*", tmp.path().display());
        let collection = Collection::discover(&pattern).unwrap();
        assert_eq!(collection.names(), vec!["home", "work"]);
    }

    #[test]
    fn duplicate_list_names_are_fatal() {
        let tmp = TempDir::new().unwrap();
        mkdirs(tmp.path(), &["a/lists/work", "b/lists/work"]);

        let pattern = format!("{}/*/lists/*", tmp.path().display());
        let err = Collection::discover(&pattern).unwrap_err();
        match err {
            CollectionError::DuplicateName { name, .. } => assert_eq!(name, "work"),
            other => panic!("expected DuplicateName, got {other:?}"),
        }
    }

    #[test]
    fn question_mark_matches_single_character() {
        let tmp = TempDir::new().unwrap();
        mkdirs(tmp.path(), &["l1", "l2", "l10"]);

        let pattern = format!("{}/l?", tmp.path().display());
        let collection = Collection::discover(&pattern).unwrap();
        assert_eq!(collection.names(), vec!["l1", "l2"]);
    }
}
