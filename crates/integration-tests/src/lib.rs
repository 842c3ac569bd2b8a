//! Integration tests for Sepet.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sepet-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_behavior` - Merge, removal, quantity floor, totals, defaulting
//! - `snapshot_compat` - Compact and legacy snapshot round-trips
//! - `storage_resilience` - Tier fallback and allow-list isolation
//!
//! This crate also provides the shared fixtures used by those tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use rust_decimal::Decimal;
use sepet_cart::{CartConfig, CartService, MemoryBackend, StorageBackend};
use sepet_core::CatalogProduct;

/// Shared fixture product: `{ id: "p1", name: "Shirt", price: 100 }`.
#[must_use]
pub fn shirt() -> CatalogProduct {
    CatalogProduct::new("p1")
        .with_name("Shirt")
        .with_price(Decimal::from(100))
}

/// A cart over fresh, unlimited in-memory backends.
#[must_use]
pub fn memory_cart() -> CartService {
    cart_over(
        Arc::new(MemoryBackend::new()),
        Arc::new(MemoryBackend::new()),
    )
}

/// A cart over the given backends with default configuration.
#[must_use]
pub fn cart_over(
    primary: Arc<dyn StorageBackend>,
    secondary: Arc<dyn StorageBackend>,
) -> CartService {
    CartService::from_config(primary, secondary, &CartConfig::default())
}
