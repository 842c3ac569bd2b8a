//! Cart service.
//!
//! [`CartService`] owns the authoritative list of line items. Every mutating
//! call updates the list first and then runs a separate commit step that
//! encodes the list and hands it to the [`TieredStore`]. Persistence problems
//! are logged and absorbed there; no cart call ever fails because storage did.

use std::sync::Arc;

use rust_decimal::Decimal;
use sepet_core::{
    CartCodec, CartItemId, CartLineItem, CatalogProduct, CompactCodec, ProductDefaults,
    ProductId, compute_key,
};
use tracing::{debug, instrument, warn};

use crate::config::CartConfig;
use crate::store::{StorageBackend, StorageTier, TieredStore};

/// The shopping cart.
///
/// Construct once at application start and pass it to the handlers that need
/// it. Line items keep their insertion order.
#[derive(Debug)]
pub struct CartService<C = CompactCodec> {
    items: Vec<CartLineItem>,
    store: TieredStore,
    codec: C,
    defaults: ProductDefaults,
}

impl CartService<CompactCodec> {
    /// Build a cart over the given backends using `config`, seeded from any
    /// persisted snapshot.
    #[must_use]
    pub fn from_config(
        primary: Arc<dyn StorageBackend>,
        secondary: Arc<dyn StorageBackend>,
        config: &CartConfig,
    ) -> Self {
        Self::new(
            TieredStore::from_config(primary, secondary, config),
            CompactCodec::new(config.defaults.clone()),
            config.defaults.clone(),
        )
    }
}

impl<C: CartCodec> CartService<C> {
    /// Build a cart and seed it from `store`.
    ///
    /// A missing or unreadable snapshot seeds an empty cart.
    #[must_use]
    pub fn new(store: TieredStore, codec: C, defaults: ProductDefaults) -> Self {
        let items = store
            .read()
            .and_then(|text| codec.decode(&text))
            .unwrap_or_default();
        debug!(lines = items.len(), "cart seeded from storage");

        Self {
            items,
            store,
            codec,
            defaults,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` of a product with the given selections.
    ///
    /// Merges into the existing line with the same identity, otherwise appends
    /// a new line. A zero quantity is rejected and leaves the cart untouched.
    /// Returns the identity of the affected line.
    #[instrument(skip(self, product))]
    pub fn add_item(
        &mut self,
        product: &CatalogProduct,
        size: Option<&str>,
        color: Option<&str>,
        quantity: u32,
    ) -> Option<CartItemId> {
        if quantity == 0 {
            warn!("ignoring add to cart with zero quantity");
            return None;
        }

        let line = CartLineItem::from_product(product, size, color, quantity, &self.defaults);
        let id = line.cart_item_id.clone();

        match self.position(&id) {
            Some(index) => {
                if let Some(existing) = self.items.get_mut(index) {
                    existing.quantity = existing.quantity.saturating_add(quantity);
                }
            }
            None => self.items.push(line),
        }

        self.commit();
        Some(id)
    }

    /// Remove a line. Unknown IDs are ignored.
    pub fn remove_item(&mut self, id: &CartItemId) {
        self.items.retain(|line| &line.cart_item_id != id);
        self.commit();
    }

    /// Set a line's quantity exactly. Zero or negative removes the line.
    pub fn update_quantity(&mut self, id: &CartItemId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(line) = self.items.iter_mut().find(|line| &line.cart_item_id == id) {
            line.quantity = quantity;
        }
        self.commit();
    }

    /// Empty the cart, e.g. after checkout.
    pub fn clear(&mut self) {
        self.items.clear();
        self.commit();
    }

    /// Drop all state for test isolation: empty cart, persisted snapshot
    /// removed and the storage tier ladder restarted at primary.
    pub fn reset(&mut self) {
        self.items.clear();
        self.store.reset();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Sum of `unit_price * quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Find the line for a product + size + colour, if it is in the cart.
    #[must_use]
    pub fn find(
        &self,
        product_id: &ProductId,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Option<&CartLineItem> {
        self.get(&compute_key(product_id, size, color))
    }

    /// Look up a line by its identity.
    #[must_use]
    pub fn get(&self, id: &CartItemId) -> Option<&CartLineItem> {
        self.items.iter().find(|line| &line.cart_item_id == id)
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Storage tier the last commit landed in.
    #[must_use]
    pub const fn tier(&self) -> StorageTier {
        self.store.tier()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    fn position(&self, id: &CartItemId) -> Option<usize> {
        self.items.iter().position(|line| &line.cart_item_id == id)
    }

    /// Write the current lines through to storage.
    fn commit(&mut self) {
        match self.codec.encode(&self.items) {
            Ok(payload) => {
                self.store.write(&payload);
            }
            Err(e) => warn!(error = %e, "cart snapshot not persisted"),
        }
    }
}
