//! In-memory key/value backend.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::backend::{StorageBackend, StorageError};

/// In-memory key/value backend with an optional byte quota.
///
/// Plays the role of session-scoped storage: contents vanish with the
/// process. Also used as a test double for the durable medium, since the quota
/// makes it refuse writes the same way a full browser store does.
///
/// Usage is counted as the byte length of every key plus its value.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryBackend {
    /// Create an empty backend without a size limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty backend that refuses writes beyond `quota` bytes.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            quota: Some(quota),
        }
    }

    /// Number of keys currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |map| map.len())
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes currently counted against the quota.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.entries.read().map_or(0, |map| usage(&map))
    }
}

fn usage(map: &BTreeMap<String, String>) -> usize {
    map.iter().map(|(k, v)| k.len() + v.len()).sum()
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Unavailable("memory storage lock poisoned".to_string())
}

impl StorageBackend for MemoryBackend {
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.entries.write().map_err(poisoned)?;

        if let Some(quota) = self.quota {
            let replaced = map.get(key).map_or(0, |old| key.len() + old.len());
            let needed = usage(&map) - replaced + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self.entries.read().map_err(poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.entries.write().map_err(poisoned)?;
        map.remove(key);
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        let map = self.entries.read().map_err(poisoned)?;
        Ok(map.keys().cloned().collect())
    }
}
