//! Integration tests for persistence degradation.
//!
//! Storage can be full, disabled, or shared with other subsystems. The cart
//! must keep working in every case, and purges must never touch keys that
//! other subsystems own.

use std::sync::Arc;

use rust_decimal::Decimal;
use sepet_cart::{
    AllowList, MemoryBackend, StorageBackend, StorageError, StorageTier, TieredStore,
    UnavailableBackend,
};
use sepet_integration_tests::{cart_over, shirt};

/// Primary store that refuses every write as over quota.
struct AlwaysFull {
    inner: MemoryBackend,
}

impl StorageBackend for AlwaysFull {
    fn set(&self, _key: &str, value: &str) -> Result<(), StorageError> {
        Err(StorageError::QuotaExceeded {
            needed: value.len(),
            quota: 0,
        })
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }

    fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        self.inner.list_keys()
    }
}

fn full_primary_with(keys: &[(&str, &str)]) -> Arc<AlwaysFull> {
    let inner = MemoryBackend::new();
    for (key, value) in keys {
        assert!(inner.set(key, value).is_ok());
    }
    Arc::new(AlwaysFull { inner })
}

// =============================================================================
// Fallback resilience
// =============================================================================

#[test]
fn test_cart_works_when_every_tier_fails() {
    let mut cart = cart_over(
        full_primary_with(&[]),
        Arc::new(UnavailableBackend::new("session storage disabled")),
    );

    cart.add_item(&shirt(), Some("M"), Some("blue"), 1);
    cart.add_item(&shirt(), Some("M"), Some("blue"), 2);

    assert_eq!(cart.total(), Decimal::from(300));
    assert_eq!(cart.count(), 3);
    assert_eq!(cart.tier(), StorageTier::MemoryOnly);
}

#[test]
fn test_full_primary_falls_back_to_session_storage() {
    let secondary = Arc::new(MemoryBackend::new());
    let mut cart = cart_over(full_primary_with(&[]), secondary.clone());

    cart.add_item(&shirt(), None, None, 1);
    assert_eq!(cart.tier(), StorageTier::Secondary);

    // Reload within the same browser session finds the secondary copy.
    let reloaded = cart_over(full_primary_with(&[]), secondary);
    assert_eq!(reloaded.count(), 1);
}

#[test]
fn test_disabled_storage_everywhere() {
    let mut cart = cart_over(
        Arc::new(UnavailableBackend::new("disabled")),
        Arc::new(UnavailableBackend::new("disabled")),
    );
    assert!(cart.is_empty());

    let Some(id) = cart.add_item(&shirt(), Some("S"), None, 5) else {
        panic!("add_item should succeed without storage");
    };
    cart.update_quantity(&id, 2);
    assert_eq!(cart.total(), Decimal::from(200));
}

// =============================================================================
// Isolation
// =============================================================================

#[test]
fn test_quota_purge_keeps_allow_listed_keys() {
    let primary = full_primary_with(&[
        ("token", "eyJhbGciOi"),
        ("cart", "[]"),
        ("recently_viewed", "[\"p9\"]"),
        ("banner_dismissed", "1"),
    ]);
    let mut store = TieredStore::new(
        primary.clone(),
        Arc::new(MemoryBackend::new()),
        AllowList::new("cart", ["token"]),
    );

    store.write("[{\"i\":\"p1\",\"q\":1}]");

    let keys = primary.list_keys().unwrap_or_default();
    assert!(keys.contains(&"token".to_string()));
    assert!(!keys.contains(&"recently_viewed".to_string()));
    assert!(!keys.contains(&"banner_dismissed".to_string()));
    assert_eq!(
        primary.get("token").ok().flatten().as_deref(),
        Some("eyJhbGciOi")
    );
}

#[test]
fn test_startup_purge_keeps_allow_listed_keys() {
    let primary = Arc::new(MemoryBackend::new());
    for (key, value) in [
        ("token", "eyJhbGciOi"),
        ("consent", "all"),
        ("cart", "[]"),
        ("old_wishlist_v1", "[1,2,3]"),
    ] {
        assert!(primary.set(key, value).is_ok());
    }

    let store = TieredStore::new(
        primary.clone(),
        Arc::new(MemoryBackend::new()),
        AllowList::new("cart", ["token", "consent"]),
    );
    assert_eq!(store.read().as_deref(), Some("[]"));
    assert_eq!(
        primary.list_keys().unwrap_or_default(),
        vec!["cart", "consent", "token"]
    );
}

#[test]
fn test_session_token_survives_full_degradation() {
    let primary = full_primary_with(&[("token", "eyJhbGciOi"), ("junk", "x")]);
    let mut cart = cart_over(primary.clone(), Arc::new(UnavailableBackend::new("off")));

    cart.add_item(&shirt(), None, None, 1);
    assert_eq!(cart.tier(), StorageTier::MemoryOnly);
    assert_eq!(primary.list_keys().unwrap_or_default(), vec!["token"]);
}
