//! Key-value persistence behind the resume store.
//!
//! Backends only move opaque strings. Serialization and schema versioning live
//! in [`versioning`](super::versioning) so every backend gets the same format.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::store::StorageError;

/// A session-scoped key-value store holding serialized blobs.
pub trait StorageBackend: Send {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Sets an unreadable blob aside so the next write does not destroy it.
    /// Backends with nowhere to put it simply drop the key.
    fn quarantine(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for JsonFileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // Write-then-rename so a crash never leaves a half-written blob.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        debug!("Persisted {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn quarantine(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let aside = path.with_extension("json.corrupt");
        std::fs::rename(&path, &aside)?;
        warn!("Moved unreadable {} to {}", path.display(), aside.display());
        Ok(())
    }
}

/// In-process backend, mainly for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn quarantine(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonFileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.read("blob").unwrap(), None);
        storage.write("blob", "{\"a\":1}").unwrap();
        assert_eq!(storage.read("blob").unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(dir.path().join("nested").join("blob.json").exists());
        assert!(!dir.path().join("nested").join("blob.json.tmp").exists());
    }

    #[test]
    fn test_file_quarantine_keeps_blob_aside() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonFileStorage::new(dir.path());
        storage.write("blob", "{broken").unwrap();

        storage.quarantine("blob").unwrap();
        assert_eq!(storage.read("blob").unwrap(), None);
        let aside = std::fs::read_to_string(dir.path().join("blob.json.corrupt")).unwrap();
        assert_eq!(aside, "{broken");
    }

    #[test]
    fn test_memory_storage_overwrites() {
        let mut storage = MemoryStorage::new();
        storage.write("k", "one").unwrap();
        storage.write("k", "two").unwrap();
        assert_eq!(storage.get("k"), Some("two"));
    }
}
