//! Catalog product input accepted by the cart.
//!
//! The catalog and UI layers hand the cart loosely shaped product documents:
//! older records use `title` instead of `name`, some prices are nested under
//! `price.newPrice`, and images live in one of several fields. Every field is
//! kept as raw JSON here and resolved through a fixed priority chain, so a
//! malformed or empty product still produces a usable line item.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::id::ProductId;
use super::price::amount_from_json;

/// Fallback values used when a product lacks a display name or image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDefaults {
    /// Display name used when neither `name` nor `title` is present.
    pub name: String,
    /// Image reference used when no image candidate is present.
    pub image: String,
}

impl ProductDefaults {
    /// Default display name for unnamed products.
    pub const NAME: &'static str = "Ürün Adı";
    /// Default placeholder asset.
    pub const IMAGE: &'static str = "/images/placeholder.png";
}

impl Default for ProductDefaults {
    fn default() -> Self {
        Self {
            name: Self::NAME.to_owned(),
            image: Self::IMAGE.to_owned(),
        }
    }
}

/// A product-like document as received from the catalog.
///
/// Deserialization never fails for a JSON object: unknown fields are ignored
/// and every known field is optional. Use the `resolve_*` methods to read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Document-store identifier, used when `id` is absent.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub document_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    /// Flat number, numeric string, or `{ "newPrice": .. }`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Value>,
    /// Gallery entries shaped `{ "url": .. }`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_image: Option<Value>,
    /// Single nested image shaped `{ "url": .. }`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<Value>,
}

impl CatalogProduct {
    /// Create a product with only an identifier set.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(Value::String(id.into())),
            ..Self::default()
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(Value::String(name.into()));
        self
    }

    /// Set a flat price.
    #[must_use]
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(Value::String(price.to_string()));
        self
    }

    /// Set the flat image reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(Value::String(image.into()));
        self
    }

    /// Build a product from an arbitrary JSON value.
    ///
    /// Non-object values produce an empty product rather than an error.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            tracing::warn!("catalog product is not a JSON object, using defaults");
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "catalog product could not be read, using defaults");
            Self::default()
        })
    }

    /// Parse a product from JSON text. Never fails; see [`Self::from_value`].
    #[must_use]
    pub fn from_json(text: &str) -> Self {
        serde_json::from_str::<Value>(text).map_or_else(
            |e| {
                tracing::warn!(error = %e, "catalog product is not valid JSON, using defaults");
                Self::default()
            },
            Self::from_value,
        )
    }

    /// Resolve the product identifier: `id`, then `_id`, then empty.
    #[must_use]
    pub fn resolve_id(&self) -> ProductId {
        [&self.id, &self.document_id]
            .into_iter()
            .flatten()
            .find_map(id_text)
            .map_or_else(|| ProductId::new(""), ProductId::new)
    }

    /// Resolve the display name: `name`, then `title`, then the default.
    #[must_use]
    pub fn resolve_name(&self, defaults: &ProductDefaults) -> String {
        [&self.name, &self.title]
            .into_iter()
            .flatten()
            .find_map(non_empty_text)
            .unwrap_or_else(|| defaults.name.clone())
    }

    /// Resolve the unit price: flat amount, then `price.newPrice`, then zero.
    #[must_use]
    pub fn resolve_price(&self) -> Decimal {
        let Some(price) = &self.price else {
            return Decimal::ZERO;
        };
        amount_from_json(price)
            .or_else(|| price.get("newPrice").and_then(amount_from_json))
            .unwrap_or(Decimal::ZERO)
    }

    /// Resolve the image reference.
    ///
    /// Priority: `image`, first `images[].url`, `mainImage`,
    /// `featuredImage.url`, then the placeholder.
    #[must_use]
    pub fn resolve_image(&self, defaults: &ProductDefaults) -> String {
        let gallery = self
            .images
            .as_ref()
            .and_then(Value::as_array)
            .and_then(|images| images.first())
            .and_then(|first| first.get("url"));
        let featured = self
            .featured_image
            .as_ref()
            .and_then(|image| image.get("url"));

        [self.image.as_ref(), gallery, self.main_image.as_ref(), featured]
            .into_iter()
            .flatten()
            .find_map(non_empty_text)
            .unwrap_or_else(|| defaults.image.clone())
    }
}

pub(crate) fn non_empty_text(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

pub(crate) fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => Some(number.to_string()),
        other => non_empty_text(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_empty_product_resolves_to_defaults() {
        let product = CatalogProduct::from_json("{}");
        let defaults = ProductDefaults::default();

        assert!(product.resolve_id().is_empty());
        assert_eq!(product.resolve_name(&defaults), "Ürün Adı");
        assert_eq!(product.resolve_price(), Decimal::ZERO);
        assert_eq!(product.resolve_image(&defaults), "/images/placeholder.png");
    }

    #[test]
    fn test_non_object_input_is_default() {
        assert_eq!(CatalogProduct::from_json("[1,2]"), CatalogProduct::default());
        assert_eq!(CatalogProduct::from_json("not json"), CatalogProduct::default());
    }

    #[test]
    fn test_id_priority() {
        let product = CatalogProduct::from_value(json!({ "_id": "abc", "id": "p1" }));
        assert_eq!(product.resolve_id().as_str(), "p1");

        let product = CatalogProduct::from_value(json!({ "_id": "abc" }));
        assert_eq!(product.resolve_id().as_str(), "abc");

        let product = CatalogProduct::from_value(json!({ "id": 42 }));
        assert_eq!(product.resolve_id().as_str(), "42");
    }

    #[test]
    fn test_name_falls_back_to_title() {
        let defaults = ProductDefaults::default();
        let product = CatalogProduct::from_value(json!({ "title": "Keten Gömlek" }));
        assert_eq!(product.resolve_name(&defaults), "Keten Gömlek");

        let product = CatalogProduct::from_value(json!({ "name": "", "title": "T" }));
        assert_eq!(product.resolve_name(&defaults), "T");
    }

    #[test]
    fn test_nested_price() {
        let product = CatalogProduct::from_value(json!({
            "price": { "oldPrice": 200, "newPrice": 149.5 }
        }));
        assert_eq!(product.resolve_price(), Decimal::new(1495, 1));
    }

    #[test]
    fn test_flat_price_wins_and_bad_price_is_zero() {
        let product = CatalogProduct::from_value(json!({ "price": 100 }));
        assert_eq!(product.resolve_price(), Decimal::from(100));

        let product = CatalogProduct::from_value(json!({ "price": { "newPrice": "n/a" } }));
        assert_eq!(product.resolve_price(), Decimal::ZERO);
    }

    #[test]
    fn test_image_priority_chain() {
        let defaults = ProductDefaults::default();

        let product = CatalogProduct::from_value(json!({
            "images": [{ "url": "/g/1.jpg" }, { "url": "/g/2.jpg" }],
            "mainImage": "/main.jpg",
        }));
        assert_eq!(product.resolve_image(&defaults), "/g/1.jpg");

        let product = CatalogProduct::from_value(json!({
            "images": [],
            "mainImage": "/main.jpg",
        }));
        assert_eq!(product.resolve_image(&defaults), "/main.jpg");

        let product = CatalogProduct::from_value(json!({
            "featuredImage": { "url": "/featured.jpg" },
        }));
        assert_eq!(product.resolve_image(&defaults), "/featured.jpg");

        let product = CatalogProduct::from_value(json!({
            "image": "/flat.jpg",
            "mainImage": "/main.jpg",
        }));
        assert_eq!(product.resolve_image(&defaults), "/flat.jpg");
    }

    #[test]
    fn test_builder() {
        let defaults = ProductDefaults::default();
        let product = CatalogProduct::new("p1")
            .with_name("Shirt")
            .with_price(Decimal::from(100))
            .with_image("/shirt.jpg");

        assert_eq!(product.resolve_id().as_str(), "p1");
        assert_eq!(product.resolve_name(&defaults), "Shirt");
        assert_eq!(product.resolve_price(), Decimal::from(100));
        assert_eq!(product.resolve_image(&defaults), "/shirt.jpg");
    }
}
