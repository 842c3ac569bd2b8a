//! Tiered cart persistence.
//!
//! One payload (the cart snapshot) is written under one key, first to the
//! durable primary backend and, as that fails, to progressively weaker tiers.
//! The current tier only ever moves down during a session:
//!
//! | tier                | write strategy                                            | on failure          |
//! |---------------------|-----------------------------------------------------------|---------------------|
//! | `Primary`           | write; on quota, purge unrelated keys and retry once      | `PrimaryAfterPurge` |
//! | `PrimaryAfterPurge` | write; on failure, clear everything clearable and rewrite | `Secondary`         |
//! | `Secondary`         | write to the session-scoped backend                       | `MemoryOnly`        |
//! | `MemoryOnly`        | keep the payload in process memory                        | -                   |
//!
//! The primary medium is shared with other subsystems. Purges only ever remove
//! keys outside the [`AllowList`]; the cart key and retained keys such as the
//! session token are never touched by a purge.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::backend::{StorageBackend, StorageError};
use crate::config::CartConfig;

/// Where cart writes currently land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageTier {
    #[default]
    Primary,
    PrimaryAfterPurge,
    Secondary,
    MemoryOnly,
}

impl fmt::Display for StorageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::PrimaryAfterPurge => write!(f, "primary_after_purge"),
            Self::Secondary => write!(f, "secondary"),
            Self::MemoryOnly => write!(f, "memory_only"),
        }
    }
}

/// Result of one write attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Ok,
    QuotaExceeded,
    Unavailable,
}

impl From<Result<(), StorageError>> for WriteOutcome {
    fn from(result: Result<(), StorageError>) -> Self {
        match result {
            Ok(()) => Self::Ok,
            Err(StorageError::QuotaExceeded { .. }) => Self::QuotaExceeded,
            Err(StorageError::Unavailable(_)) => Self::Unavailable,
        }
    }
}

/// Keys a purge of the primary backend must leave alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    cart_key: String,
    retained: BTreeSet<String>,
}

impl AllowList {
    /// Allow-list for `cart_key` plus any keys other subsystems own.
    #[must_use]
    pub fn new<I, S>(cart_key: impl Into<String>, retained: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cart_key: cart_key.into(),
            retained: retained.into_iter().map(Into::into).collect(),
        }
    }

    /// The key the cart snapshot is stored under.
    #[must_use]
    pub fn cart_key(&self) -> &str {
        &self.cart_key
    }

    /// Returns `true` if `key` belongs to another subsystem.
    #[must_use]
    pub fn is_retained(&self, key: &str) -> bool {
        self.retained.contains(key)
    }

    /// Returns `true` if a purge must keep `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        key == self.cart_key || self.is_retained(key)
    }
}

/// Writes and reads the cart payload across the storage tiers.
pub struct TieredStore {
    primary: Arc<dyn StorageBackend>,
    secondary: Arc<dyn StorageBackend>,
    allow_list: AllowList,
    tier: StorageTier,
    memory: Option<String>,
}

impl fmt::Debug for TieredStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TieredStore")
            .field("allow_list", &self.allow_list)
            .field("tier", &self.tier)
            .field("memory", &self.memory.as_ref().map(String::len))
            .finish_non_exhaustive()
    }
}

impl TieredStore {
    /// Create a store starting at [`StorageTier::Primary`].
    #[must_use]
    pub fn new(
        primary: Arc<dyn StorageBackend>,
        secondary: Arc<dyn StorageBackend>,
        allow_list: AllowList,
    ) -> Self {
        Self {
            primary,
            secondary,
            allow_list,
            tier: StorageTier::Primary,
            memory: None,
        }
    }

    /// Create a store using the configured cart key and retained keys.
    #[must_use]
    pub fn from_config(
        primary: Arc<dyn StorageBackend>,
        secondary: Arc<dyn StorageBackend>,
        config: &CartConfig,
    ) -> Self {
        let allow_list = AllowList::new(config.cart_key.clone(), config.retained_keys.clone());
        Self::new(primary, secondary, allow_list)
    }

    /// Current tier.
    #[must_use]
    pub const fn tier(&self) -> StorageTier {
        self.tier
    }

    #[must_use]
    pub const fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// The last payload handed to [`Self::write`] in this session.
    #[must_use]
    pub fn memory_copy(&self) -> Option<&str> {
        self.memory.as_deref()
    }

    /// Persist `payload`, demoting tiers as needed. Returns the tier that
    /// accepted it. Never fails: the last tier keeps the payload in memory.
    pub fn write(&mut self, payload: &str) -> StorageTier {
        self.memory = Some(payload.to_owned());

        loop {
            let tier = self.tier;
            let outcome = match tier {
                StorageTier::Primary => self.write_primary(payload),
                StorageTier::PrimaryAfterPurge => self.write_purged_primary(payload),
                StorageTier::Secondary => self.write_secondary(payload),
                StorageTier::MemoryOnly => WriteOutcome::Ok,
            };

            if outcome == WriteOutcome::Ok {
                debug!(tier = %self.tier, bytes = payload.len(), "cart snapshot written");
                return self.tier;
            }
            if self.tier == tier {
                // Every failing strategy demotes; guard against looping regardless.
                self.transition(StorageTier::MemoryOnly);
            }
        }
    }

    /// Read the persisted payload at startup.
    ///
    /// Purges stale non-allow-listed keys from the primary backend first, then
    /// tries primary, secondary and finally this session's memory copy.
    pub fn read(&self) -> Option<String> {
        let removed = self.purge_primary();
        if removed > 0 {
            info!(removed, "purged stale keys from primary storage");
        }

        let key = self.allow_list.cart_key();
        read_key(self.primary.as_ref(), key, StorageTier::Primary)
            .or_else(|| read_key(self.secondary.as_ref(), key, StorageTier::Secondary))
            .or_else(|| self.memory.clone())
    }

    /// Remove every primary key outside the allow-list. Returns how many keys
    /// were removed.
    pub fn purge_primary(&self) -> usize {
        self.remove_primary_keys(|key| !self.allow_list.contains(key))
    }

    /// Forget this session: back to `Primary`, no memory copy, and no cart
    /// payload left in either backend. Retained keys are untouched.
    pub fn reset(&mut self) {
        let key = self.allow_list.cart_key();
        for (tier, backend) in [
            (StorageTier::Primary, &self.primary),
            (StorageTier::Secondary, &self.secondary),
        ] {
            if let Err(e) = backend.remove(key) {
                debug!(%tier, error = %e, "could not remove cart payload during reset");
            }
        }
        self.memory = None;
        self.tier = StorageTier::Primary;
    }

    // =========================================================================
    // Write strategies
    // =========================================================================

    fn set_primary(&self, payload: &str) -> WriteOutcome {
        self.primary.set(self.allow_list.cart_key(), payload).into()
    }

    fn write_primary(&mut self, payload: &str) -> WriteOutcome {
        match self.set_primary(payload) {
            WriteOutcome::Ok => WriteOutcome::Ok,
            WriteOutcome::QuotaExceeded => {
                let removed = self.purge_primary();
                warn!(removed, "primary storage quota exceeded, purged unrelated keys");
                let retry = self.set_primary(payload);
                self.transition(StorageTier::PrimaryAfterPurge);
                retry
            }
            WriteOutcome::Unavailable => {
                self.transition(StorageTier::Secondary);
                WriteOutcome::Unavailable
            }
        }
    }

    fn write_purged_primary(&mut self, payload: &str) -> WriteOutcome {
        if self.set_primary(payload) == WriteOutcome::Ok {
            return WriteOutcome::Ok;
        }

        // Last attempt on primary: drop the stale cart payload as well, keeping
        // only keys other subsystems own.
        let key = self.allow_list.cart_key().to_owned();
        let removed = self.remove_primary_keys(|k| k == key || !self.allow_list.is_retained(k));
        warn!(removed, "cleared primary storage for cart payload");

        let outcome = self.set_primary(payload);
        if outcome != WriteOutcome::Ok {
            self.transition(StorageTier::Secondary);
        }
        outcome
    }

    fn write_secondary(&mut self, payload: &str) -> WriteOutcome {
        let outcome = self
            .secondary
            .set(self.allow_list.cart_key(), payload)
            .into();
        if outcome != WriteOutcome::Ok {
            self.transition(StorageTier::MemoryOnly);
        }
        outcome
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn transition(&mut self, next: StorageTier) {
        let from = self.tier;
        self.tier = next;

        match next {
            StorageTier::Secondary => {
                // A leftover primary payload would shadow newer secondary data
                // on the next startup read.
                if let Err(e) = self.primary.remove(self.allow_list.cart_key()) {
                    debug!(error = %e, "could not remove stale cart payload from primary");
                }
                warn!(%from, to = %next, "cart persistence degraded");
            }
            StorageTier::MemoryOnly => {
                warn!(%from, to = %next, "cart persistence degraded, changes will not survive reload");
            }
            StorageTier::Primary | StorageTier::PrimaryAfterPurge => {
                info!(%from, to = %next, "cart storage tier changed");
            }
        }
    }

    fn remove_primary_keys(&self, should_remove: impl Fn(&str) -> bool) -> usize {
        let keys = match self.primary.list_keys() {
            Ok(keys) => keys,
            Err(e) => {
                debug!(error = %e, "cannot list primary storage keys");
                return 0;
            }
        };

        keys.iter()
            .filter(|key| should_remove(key.as_str()))
            .filter(|key| match self.primary.remove(key) {
                Ok(()) => true,
                Err(e) => {
                    debug!(key = %key, error = %e, "could not remove key from primary storage");
                    false
                }
            })
            .count()
    }
}

fn read_key(backend: &dyn StorageBackend, key: &str, tier: StorageTier) -> Option<String> {
    match backend.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!(%tier, error = %e, "cannot read cart payload");
            None
        }
    }
}
