//! # Key-Value Backend
//!
//! The storage substrate: string keys, JSON string values.
//!
//! ## Snapshot Discipline
//! Every mutation rewrites the full backend state (last-write-wins).
//! There are no partial updates, no locking and no merge logic - the
//! system is single-threaded and synchronous, and a whole snapshot of
//! a small business's records is a few hundred kilobytes at most.
//!
//! Implementations:
//! - [`FileKv`] - one JSON file holding the key→value map;
//! - [`MemoryKv`] - in-memory map for tests and embedded hosts.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Backend Trait
// =============================================================================

/// A string-keyed snapshot store. Values are JSON documents; the store
/// layer above decides what lives under which key.
pub trait KvBackend {
    /// Reads the value for a key, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// Writes a value and persists the full snapshot.
    fn set(&mut self, key: &str, value: String) -> StoreResult<()>;

    /// Removes a key and persists the full snapshot.
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

// =============================================================================
// File Backend
// =============================================================================

/// File-backed key-value map: the entire map is serialized to one JSON
/// file on every write.
pub struct FileKv {
    path: PathBuf,
    map: BTreeMap<String, String>,
}

impl FileKv {
    /// Opens (or initializes) the backing file.
    ///
    /// A missing file is an empty store, not an error - first launch
    /// starts from nothing and the first mutation creates the file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let map = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Snapshot {
                key: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = map.len(), "opened kv file");
        Ok(FileKv { path, map })
    }

    fn flush(&self) -> StoreResult<()> {
        let raw = serde_json::to_string_pretty(&self.map).map_err(|source| StoreError::Snapshot {
            key: self.path.display().to_string(),
            source,
        })?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl KvBackend for FileKv {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> StoreResult<()> {
        self.map.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        if self.map.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

// =============================================================================
// Memory Backend
// =============================================================================

/// In-memory backend for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryKv {
    map: BTreeMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        MemoryKv::default()
    }

    /// Pre-populates a key; used by tests to simulate older snapshots.
    pub fn preload(mut self, key: &str, value: impl Into<String>) -> Self {
        self.map.insert(key.to_string(), value.into());
        self
    }
}

impl KvBackend for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> StoreResult<()> {
        self.map.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.map.remove(key);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("schetovod-kv-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let kv = FileKv::open(temp_path("missing.json")).unwrap();
        assert!(kv.get("mb_companies").is_none());
    }

    #[test]
    fn test_file_roundtrip() {
        let path = temp_path("roundtrip.json");
        let _ = fs::remove_file(&path);

        let mut kv = FileKv::open(&path).unwrap();
        kv.set("mb_invoiceCounter", "4".to_string()).unwrap();
        kv.set("mb_companies", "[]".to_string()).unwrap();

        // A fresh handle sees the flushed snapshot.
        let reopened = FileKv::open(&path).unwrap();
        assert_eq!(reopened.get("mb_invoiceCounter").as_deref(), Some("4"));
        assert_eq!(reopened.get("mb_companies").as_deref(), Some("[]"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_fails_loudly() {
        let path = temp_path("corrupt.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            FileKv::open(&path),
            Err(StoreError::Snapshot { .. })
        ));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_memory_preload() {
        let kv = MemoryKv::new().preload("mb_products", "[]");
        assert_eq!(kv.get("mb_products").as_deref(), Some("[]"));
    }
}
