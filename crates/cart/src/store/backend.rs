//! Storage backend contract.

use thiserror::Error;

/// Errors from a storage backend.
///
/// Backends classify every failure as one of two kinds; the tiered store
/// decides how to recover from each.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The write would exceed the medium's size limit.
    #[error("storage quota exceeded: write needs {needed} bytes, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },

    /// The medium is disabled, broken or otherwise unusable.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Key/value text storage shared by the cart and other subsystems.
///
/// Implementations must:
/// - treat keys independently; `remove` touches exactly one key
/// - report a size-limit refusal as [`StorageError::QuotaExceeded`]
/// - leave the previous value intact when `set` fails
pub trait StorageBackend: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `QuotaExceeded` when the value does not fit, `Unavailable`
    /// for any other failure.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Read the value under `key`. `Ok(None)` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// List every key currently stored.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the medium cannot be read.
    fn list_keys(&self) -> Result<Vec<String>, StorageError>;
}

/// A backend that is switched off, e.g. storage disabled by the user agent.
#[derive(Debug, Clone, Default)]
pub struct UnavailableBackend {
    reason: String,
}

impl UnavailableBackend {
    /// Create a disabled backend that reports `reason` on every call.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> StorageError {
        StorageError::Unavailable(self.reason.clone())
    }
}

impl StorageBackend for UnavailableBackend {
    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(self.error())
    }

    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(self.error())
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(self.error())
    }

    fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        Err(self.error())
    }
}
