//! Sepet Cart - Storefront cart with resilient persistence.
//!
//! The cart lives in memory and is written through to browser-like key/value
//! storage after every change. Storage is shared with other subsystems, has a
//! size quota and may be disabled entirely, so persistence degrades through
//! a fixed ladder of tiers instead of ever failing a cart operation:
//!
//! ```text
//! Primary -> PrimaryAfterPurge -> Secondary -> MemoryOnly
//! ```
//!
//! # Modules
//!
//! - [`config`] - Environment-driven settings (storage key, retained keys, defaults)
//! - [`store`] - Storage backends and the tiered store
//! - [`service`] - The cart service used by UI handlers
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use rust_decimal::Decimal;
//! use sepet_cart::{CartConfig, CartService, MemoryBackend};
//! use sepet_core::CatalogProduct;
//!
//! let config = CartConfig::default();
//! let local = Arc::new(MemoryBackend::new());
//! let session = Arc::new(MemoryBackend::new());
//! let mut cart = CartService::from_config(local, session, &config);
//!
//! let shirt = CatalogProduct::new("p1")
//!     .with_name("Shirt")
//!     .with_price(Decimal::from(100));
//! cart.add_item(&shirt, Some("M"), Some("blue"), 2);
//!
//! assert_eq!(cart.total(), Decimal::from(200));
//! assert_eq!(cart.count(), 2);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod service;
pub mod store;

pub use config::{CartConfig, ConfigError};
pub use service::CartService;
pub use store::{
    AllowList, FileBackend, MemoryBackend, StorageBackend, StorageError, StorageTier,
    TieredStore, UnavailableBackend, WriteOutcome,
};
