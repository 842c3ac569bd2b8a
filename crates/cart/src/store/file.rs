//! JSON-file key/value backend.
//!
//! Stores every key in one JSON object on disk, the way a browser profile
//! keeps an origin's local storage in a single file. Writes go to a uniquely
//! named temporary file in the same directory that is then persisted over the
//! original, so a crash mid-write leaves the previous contents in place.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::warn;

use super::backend::{StorageBackend, StorageError};

/// Durable backend persisted to a single JSON file.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    quota: usize,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileBackend {
    /// Open (or lazily create) the store at `path` with a byte quota.
    ///
    /// The quota applies to the serialized file size.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, quota: usize) -> Self {
        Self {
            path: path.into(),
            quota,
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(unavailable(&e)),
        };

        // A damaged file is treated as empty storage; the next write replaces it.
        Ok(serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "storage file is corrupt, treating as empty");
            BTreeMap::new()
        }))
    }

    fn save(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let text = serde_json::to_string(map)
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        self.save_text(&text)
    }

    fn save_text(&self, text: &str) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| self.write_error(&e, text.len()))?;

        let mut temp =
            NamedTempFile::new_in(dir).map_err(|e| self.write_error(&e, text.len()))?;
        temp.write_all(text.as_bytes())
            .map_err(|e| self.write_error(&e, text.len()))?;
        temp.persist(&self.path)
            .map_err(|e| self.write_error(&e.error, text.len()))?;
        Ok(())
    }

    /// A full medium is a quota failure so the caller can purge and retry.
    fn write_error(&self, e: &std::io::Error, needed: usize) -> StorageError {
        if e.kind() == ErrorKind::StorageFull {
            warn!(path = %self.path.display(), needed, "storage medium is full");
            return StorageError::QuotaExceeded {
                needed,
                quota: self.quota,
            };
        }
        unavailable(e)
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>, StorageError> {
        self.lock
            .lock()
            .map_err(|_| StorageError::Unavailable("file storage lock poisoned".to_string()))
    }
}

fn unavailable(e: &std::io::Error) -> StorageError {
    StorageError::Unavailable(e.to_string())
}

impl StorageBackend for FileBackend {
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.guard()?;
        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_string());

        let text = serde_json::to_string(&map)
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        if text.len() > self.quota {
            return Err(StorageError::QuotaExceeded {
                needed: text.len(),
                quota: self.quota,
            });
        }
        self.save_text(&text)
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.guard()?;
        Ok(self.load()?.remove(key))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.guard()?;
        let mut map = self.load()?;
        if map.remove(key).is_some() {
            self.save(&map)?;
        }
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        let _guard = self.guard()?;
        Ok(self.load()?.into_keys().collect())
    }
}
