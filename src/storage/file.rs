//! File Store
//!
//! Durable tier: a JSON object on disk, loaded once at open and rewritten on
//! every mutation so it survives restarts. Batched removals rewrite it once.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{CacheError, Result};
use crate::storage::{KeyValueStore, Quota};

// == File Store ==
/// Key-value store persisted as a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    items: BTreeMap<String, String>,
    quota: Quota,
    used_bytes: usize,
    /// Number of file rewrites so far
    persists: usize,
}

impl FileStore {
    // == Open ==
    /// Opens the store at `path`, loading existing contents if the file exists.
    ///
    /// An unreadable or malformed file is treated as an empty store; the next
    /// write replaces it.
    pub fn open(path: impl AsRef<Path>, quota: Quota) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let items: BTreeMap<String, String> = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(items) => items,
                Err(e) => {
                    warn!("Ignoring malformed store file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        let used_bytes = items.iter().map(|(k, v)| k.len() + v.len()).sum();
        debug!("Opened file store {} with {} items", path.display(), items.len());

        Ok(Self {
            path,
            items,
            quota,
            used_bytes,
            persists: 0,
        })
    }

    // == Persist ==
    /// Writes the whole map to a sibling temp file, then renames it over the
    /// backing file.
    fn persist(&mut self) -> Result<()> {
        let raw = serde_json::to_string(&self.items)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        self.persists += 1;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<()> {
        let old_len = self.items.get(key).map_or(0, |v| key.len() + v.len());
        let new_len = key.len() + value.len();

        if !self.quota.admits(self.used_bytes, old_len, new_len) {
            return Err(CacheError::QuotaExceeded(format!(
                "file store {} cannot fit {} more bytes",
                self.path.display(),
                new_len
            )));
        }

        let previous = self.items.insert(key.to_string(), value);
        if let Err(e) = self.persist() {
            // Keep memory and disk in agreement
            match previous {
                Some(old) => self.items.insert(key.to_string(), old),
                None => self.items.remove(key),
            };
            return Err(e);
        }

        self.used_bytes = self.used_bytes - old_len + new_len;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> bool {
        self.remove_items(&[key.to_string()]) == 1
    }

    /// Removes `keys` with a single rewrite of the file.
    ///
    /// If the rewrite fails nothing is removed, so memory never drifts from
    /// what the next open would load.
    fn remove_items(&mut self, keys: &[String]) -> usize {
        let removed: Vec<(String, String)> = keys
            .iter()
            .filter_map(|key| self.items.remove_entry(key.as_str()))
            .collect();
        if removed.is_empty() {
            return 0;
        }

        if let Err(e) = self.persist() {
            warn!("Failed to persist removal of {} items: {}", removed.len(), e);
            self.items.extend(removed);
            return 0;
        }

        self.used_bytes -= removed.iter().map(|(k, v)| k.len() + v.len()).sum::<usize>();
        removed.len()
    }

    fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    fn contains_key(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("store.json"), Quota::unlimited()).unwrap();
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_contents_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        {
            let mut store = FileStore::open(&path, Quota::unlimited()).unwrap();
            store.set_item("a", "1".to_string()).unwrap();
            store.set_item("b", "2".to_string()).unwrap();
            assert!(store.remove_item("b"));
        }

        let store = FileStore::open(&path, Quota::unlimited()).unwrap();
        assert_eq!(store.get_item("a"), Some("1".to_string()));
        assert!(!store.contains_key("b"));
    }

    #[test]
    fn test_batched_removal_rewrites_file_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let mut store = FileStore::open(&path, Quota::unlimited()).unwrap();
        for key in ["a", "b", "c", "d"] {
            store.set_item(key, "v".to_string()).unwrap();
        }
        let before = store.persists;

        let keys = vec!["a".to_string(), "b".to_string(), "c".to_string(), "zz".to_string()];
        assert_eq!(store.remove_items(&keys), 3);
        assert_eq!(store.persists, before + 1);

        // Nothing to remove, nothing to write
        assert_eq!(store.remove_items(&keys), 0);
        assert_eq!(store.persists, before + 1);

        let reopened = FileStore::open(&path, Quota::unlimited()).unwrap();
        assert_eq!(reopened.keys(), vec!["d".to_string()]);
    }

    #[test]
    fn test_failed_removal_keeps_item() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let mut store = FileStore::open(sub.join("store.json"), Quota::bytes(64)).unwrap();
        store.set_item("k", "value".to_string()).unwrap();

        // The next rewrite has nowhere to go
        fs::remove_dir_all(&sub).unwrap();

        assert!(!store.remove_item("k"));
        assert_eq!(store.get_item("k"), Some("value".to_string()));
        assert_eq!(store.used_bytes, "k".len() + "value".len());
    }

    #[test]
    fn test_malformed_file_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{broken").unwrap();

        let mut store = FileStore::open(&path, Quota::unlimited()).unwrap();
        assert!(store.keys().is_empty());

        store.set_item("k", "v".to_string()).unwrap();
        let reopened = FileStore::open(&path, Quota::unlimited()).unwrap();
        assert_eq!(reopened.get_item("k"), Some("v".to_string()));
    }

    #[test]
    fn test_quota_exceeded_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path().join("store.json"), Quota::bytes(4)).unwrap();

        store.set_item("k", "12".to_string()).unwrap();
        let result = store.set_item("j", "345".to_string());

        assert!(matches!(result, Err(CacheError::QuotaExceeded(_))));
        assert_eq!(store.keys(), vec!["k".to_string()]);
    }
}
