//! Cache store backends.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::debug;

use super::cache_traits::CacheStore;
use crate::errors::CacheError;

/// Stores each key as `<key>.json` inside a directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous entry intact.
pub struct FileCacheStore {
    root: PathBuf,
}

impl FileCacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(self.entry_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Io(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        fs::create_dir_all(&self.root)?;
        let target = self.entry_path(key);
        let staging = self.root.join(format!("{}.json.tmp", key));
        fs::write(&staging, value)?;
        fs::rename(&staging, &target)?;
        debug!("Wrote {} bytes to cache entry {}", value.len(), target.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io(e)),
        }
    }
}

/// In-process store, optionally bounded by a byte quota per entry.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store rejecting any entry larger than `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota: Some(quota),
        }
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        if let Some(quota) = self.quota {
            if value.len() > quota {
                return Err(CacheError::QuotaExceeded {
                    needed: value.len(),
                    quota,
                });
            }
        }
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_missing_key_is_none() {
        let dir = tempdir().unwrap();
        let store = FileCacheStore::new(dir.path());
        assert_eq!(store.get("nothing").unwrap(), None);
        assert!(store.remove("nothing").is_ok());
    }

    #[test]
    fn test_file_store_creates_directory_and_overwrites() {
        let dir = tempdir().unwrap();
        let store = FileCacheStore::new(dir.path().join("nested").join("cache"));
        store.set("k", "[1]").unwrap();
        store.set("k", "[2]").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("[2]"));
        assert!(!store.root().join("k.json.tmp").exists());

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_memory_store_enforces_quota() {
        let store = MemoryCacheStore::with_quota(4);
        assert!(store.set("k", "1234").is_ok());
        assert!(matches!(
            store.set("k", "12345"),
            Err(CacheError::QuotaExceeded { needed: 5, quota: 4 })
        ));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("1234"));
    }
}
