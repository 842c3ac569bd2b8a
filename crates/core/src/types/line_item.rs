//! Cart line items.

use rust_decimal::Decimal;

use super::id::{CartItemId, ProductId};
use super::product::{CatalogProduct, ProductDefaults};
use crate::identity::{compute_key, normalize_selection};

/// One entry in the cart: a unique product + size + colour combination.
///
/// `quantity` is always at least 1 while the line exists; the cart removes a
/// line instead of letting it reach zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineItem {
    pub product_id: ProductId,
    /// Derived from `product_id`, `selected_size` and `selected_color`.
    pub cart_item_id: CartItemId,
    pub name: String,
    pub unit_price: Decimal,
    pub image: String,
    pub quantity: u32,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
}

impl CartLineItem {
    /// Build a line item from its stored parts, deriving the identity key.
    ///
    /// Empty size/colour selections are stored as `None`.
    #[must_use]
    pub fn new(
        product_id: ProductId,
        name: String,
        unit_price: Decimal,
        image: String,
        quantity: u32,
        selected_size: Option<&str>,
        selected_color: Option<&str>,
    ) -> Self {
        let selected_size = normalize_selection(selected_size);
        let selected_color = normalize_selection(selected_color);
        Self {
            cart_item_id: compute_key(&product_id, selected_size, selected_color),
            product_id,
            name,
            unit_price: unit_price.max(Decimal::ZERO),
            image,
            quantity,
            selected_size: selected_size.map(str::to_owned),
            selected_color: selected_color.map(str::to_owned),
        }
    }

    /// Build a line item from a catalog product, resolving name, price and
    /// image through the product's defaulting chains.
    #[must_use]
    pub fn from_product(
        product: &CatalogProduct,
        selected_size: Option<&str>,
        selected_color: Option<&str>,
        quantity: u32,
        defaults: &ProductDefaults,
    ) -> Self {
        Self::new(
            product.resolve_id(),
            product.resolve_name(defaults),
            product.resolve_price(),
            product.resolve_image(defaults),
            quantity,
            selected_size,
            selected_color,
        )
    }

    /// Price of this line (`unit_price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}
