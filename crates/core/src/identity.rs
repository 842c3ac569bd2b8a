//! Composite identity for cart line items.
//!
//! A line item is identified by its product and the shopper's size and colour
//! selections. The key is a plain delimited string:
//!
//! ```text
//! {product_id}-{size}-{color}
//! ```
//!
//! where a missing or empty selection is written as [`NO_SELECTION`]. Values
//! that themselves contain `-` can in principle collide; catalog IDs and
//! option labels make that a known, accepted limitation.

use crate::types::{CartItemId, ProductId};

/// Placeholder written for an absent size or colour selection.
pub const NO_SELECTION: &str = "default";

const DELIMITER: char = '-';

/// Treat an empty selection the same as no selection.
#[must_use]
pub fn normalize_selection(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Derive the `cartItemId` for a product + size + colour triple.
///
/// Pure and total. `None` and `Some("")` produce the same key.
///
/// # Examples
///
/// ```
/// use sepet_core::{ProductId, compute_key};
///
/// let id = ProductId::new("p1");
/// assert_eq!(compute_key(&id, Some("M"), Some("blue")).as_str(), "p1-M-blue");
/// assert_eq!(compute_key(&id, None, Some("")), compute_key(&id, Some(""), None));
/// ```
#[must_use]
pub fn compute_key(product_id: &ProductId, size: Option<&str>, color: Option<&str>) -> CartItemId {
    let size = normalize_selection(size).unwrap_or(NO_SELECTION);
    let color = normalize_selection(color).unwrap_or(NO_SELECTION);

    let mut key = String::with_capacity(product_id.as_str().len() + size.len() + color.len() + 2);
    key.push_str(product_id.as_str());
    key.push(DELIMITER);
    key.push_str(size);
    key.push(DELIMITER);
    key.push_str(color);
    CartItemId::new(key)
}
