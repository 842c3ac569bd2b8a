//! Cart snapshot codec.
//!
//! A cart snapshot is a JSON array of line items. Two shapes exist:
//!
//! | meaning       | compact | legacy          |
//! |---------------|---------|-----------------|
//! | product id    | `i`     | `id`            |
//! | cart item id  | `c`     | `cartItemId`    |
//! | name          | `n`     | `name`          |
//! | unit price    | `p`     | `price`         |
//! | image         | `img`   | `image`         |
//! | quantity      | `q`     | `quantity`      |
//! | size          | `s`     | `selectedSize`  |
//! | colour        | `cl`    | `selectedColor` |
//!
//! Only the compact shape is written. Legacy snapshots from older storefront
//! releases are still read. The shape is detected from the first element (see
//! [`detect_schema`]); the whole array is then read with that shape.
//!
//! Decoding never fails outward: text that is not an array of objects decodes
//! to `None`, which callers treat as an empty cart.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::product::{id_text, non_empty_text};
use crate::types::{CartLineItem, ProductDefaults, ProductId, amount_from_json};

/// Key whose presence on the first element marks a compact snapshot.
pub const COMPACT_DISCRIMINATOR: &str = "i";

/// Snapshot shape, as detected from persisted data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    /// Empty array; shape is irrelevant.
    Empty,
    /// Short keys (`i`, `c`, `n`, ...).
    Compact,
    /// Full field names (`id`, `cartItemId`, `name`, ...).
    Legacy,
}

impl SchemaVersion {
    const fn fields(self) -> Option<&'static WireFields> {
        match self {
            Self::Empty => None,
            Self::Compact => Some(&COMPACT_FIELDS),
            Self::Legacy => Some(&LEGACY_FIELDS),
        }
    }
}

/// Detect the shape of a decoded snapshot array.
///
/// Only the first element is inspected. If it carries
/// [`COMPACT_DISCRIMINATOR`] the snapshot is compact, otherwise legacy.
/// A first element that mixes keys from both shapes is read as compact when
/// it has `i`; its legacy-named fields are then ignored.
#[must_use]
pub fn detect_schema(raw: &[Value]) -> SchemaVersion {
    match raw.first() {
        None => SchemaVersion::Empty,
        Some(first) if first.get(COMPACT_DISCRIMINATOR).is_some() => SchemaVersion::Compact,
        Some(_) => SchemaVersion::Legacy,
    }
}

struct WireFields {
    product_id: &'static str,
    cart_item_id: &'static str,
    name: &'static str,
    price: &'static str,
    image: &'static str,
    quantity: &'static str,
    size: &'static str,
    color: &'static str,
}

const COMPACT_FIELDS: WireFields = WireFields {
    product_id: "i",
    cart_item_id: "c",
    name: "n",
    price: "p",
    image: "img",
    quantity: "q",
    size: "s",
    color: "cl",
};

const LEGACY_FIELDS: WireFields = WireFields {
    product_id: "id",
    cart_item_id: "cartItemId",
    name: "name",
    price: "price",
    image: "image",
    quantity: "quantity",
    size: "selectedSize",
    color: "selectedColor",
};

/// Errors that can occur while encoding a snapshot.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode cart snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Converts the cart's line items to and from a persisted text payload.
pub trait CartCodec {
    /// Encode line items into a payload.
    ///
    /// # Errors
    ///
    /// Returns `CodecError` if the payload cannot be serialized.
    fn encode(&self, items: &[CartLineItem]) -> Result<String, CodecError>;

    /// Decode a payload. Returns `None` when the payload is unusable.
    fn decode(&self, text: &str) -> Option<Vec<CartLineItem>>;
}

/// Production codec: writes the compact shape, reads compact and legacy.
#[derive(Debug, Clone, Default)]
pub struct CompactCodec {
    defaults: ProductDefaults,
}

#[derive(Serialize)]
struct CompactLine<'a> {
    i: &'a str,
    c: &'a str,
    n: &'a str,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    p: Decimal,
    img: &'a str,
    q: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    s: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cl: Option<&'a str>,
}

impl<'a> From<&'a CartLineItem> for CompactLine<'a> {
    fn from(line: &'a CartLineItem) -> Self {
        Self {
            i: line.product_id.as_str(),
            c: line.cart_item_id.as_str(),
            n: &line.name,
            p: line.unit_price.normalize(),
            img: &line.image,
            q: line.quantity,
            s: line.selected_size.as_deref(),
            cl: line.selected_color.as_deref(),
        }
    }
}

impl CompactCodec {
    /// Create a codec that fills missing names and images from `defaults`.
    #[must_use]
    pub const fn new(defaults: ProductDefaults) -> Self {
        Self { defaults }
    }

    fn line_from_value(&self, value: &Value, fields: &WireFields) -> Option<CartLineItem> {
        let product_id = value.get(fields.product_id).and_then(id_text)?;
        let quantity = value.get(fields.quantity).and_then(quantity_from_json)?;

        let text = |key: &str| value.get(key).and_then(non_empty_text);
        let line = CartLineItem::new(
            ProductId::new(product_id),
            text(fields.name).unwrap_or_else(|| self.defaults.name.clone()),
            value
                .get(fields.price)
                .and_then(amount_from_json)
                .unwrap_or(Decimal::ZERO),
            text(fields.image).unwrap_or_else(|| self.defaults.image.clone()),
            quantity,
            value.get(fields.size).and_then(Value::as_str),
            value.get(fields.color).and_then(Value::as_str),
        );

        if let Some(stored) = value.get(fields.cart_item_id).and_then(Value::as_str)
            && stored != line.cart_item_id.as_str()
        {
            debug!(
                stored,
                derived = %line.cart_item_id,
                "stored cart item id differs from derived key, using derived key"
            );
        }

        Some(line)
    }
}

impl CartCodec for CompactCodec {
    fn encode(&self, items: &[CartLineItem]) -> Result<String, CodecError> {
        let lines: Vec<CompactLine<'_>> = items.iter().map(CompactLine::from).collect();
        Ok(serde_json::to_string(&lines)?)
    }

    fn decode(&self, text: &str) -> Option<Vec<CartLineItem>> {
        let raw = match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(raw)) => raw,
            Ok(_) => {
                warn!("cart snapshot is not a JSON array, ignoring it");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "cart snapshot is not valid JSON, ignoring it");
                return None;
            }
        };

        if raw.iter().any(|entry| !entry.is_object()) {
            warn!("cart snapshot contains non-object entries, ignoring it");
            return None;
        }

        let schema = detect_schema(&raw);
        let Some(fields) = schema.fields() else {
            return Some(Vec::new());
        };

        let mut items: Vec<CartLineItem> = Vec::with_capacity(raw.len());
        for (index, entry) in raw.iter().enumerate() {
            match self.line_from_value(entry, fields) {
                Some(line) => merge_line(&mut items, line),
                None => warn!(index, ?schema, "dropping unreadable cart snapshot entry"),
            }
        }
        debug!(?schema, lines = items.len(), "decoded cart snapshot");
        Some(items)
    }
}

/// Positive integer quantity from a number or numeric string.
fn quantity_from_json(value: &Value) -> Option<u32> {
    let quantity = match value {
        Value::Number(number) => number.as_u64()?,
        Value::String(text) => text.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    (quantity > 0).then(|| u32::try_from(quantity).unwrap_or(u32::MAX))
}

/// Keep one line per identity key; later duplicates add their quantity.
fn merge_line(items: &mut Vec<CartLineItem>, line: CartLineItem) {
    match items
        .iter_mut()
        .find(|existing| existing.cart_item_id == line.cart_item_id)
    {
        Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
        None => items.push(line),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;

    fn shirt(size: Option<&str>, color: Option<&str>, quantity: u32) -> CartLineItem {
        CartLineItem::new(
            ProductId::new("p1"),
            "Shirt".to_owned(),
            Decimal::new(9990, 2),
            "/shirt.jpg".to_owned(),
            quantity,
            size,
            color,
        )
    }

    #[test]
    fn test_detect_schema() {
        assert_eq!(detect_schema(&[]), SchemaVersion::Empty);
        assert_eq!(
            detect_schema(&[json!({ "i": "p1", "q": 1 })]),
            SchemaVersion::Compact
        );
        assert_eq!(
            detect_schema(&[json!({ "id": "p1", "quantity": 1 })]),
            SchemaVersion::Legacy
        );
    }

    #[test]
    fn test_detect_schema_only_inspects_first_element() {
        let raw = [json!({ "id": "p1" }), json!({ "i": "p2" })];
        assert_eq!(detect_schema(&raw), SchemaVersion::Legacy);
    }

    #[test]
    fn test_encode_uses_short_keys() {
        let codec = CompactCodec::default();
        let text = codec.encode(&[shirt(Some("M"), None, 2)]).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(
            value,
            json!([{
                "i": "p1",
                "c": "p1-M-default",
                "n": "Shirt",
                "p": 99.9,
                "img": "/shirt.jpg",
                "q": 2,
                "s": "M",
            }])
        );
    }

    #[test]
    fn test_round_trip() {
        let codec = CompactCodec::default();
        let items = vec![shirt(Some("M"), Some("blue"), 1), shirt(None, None, 3)];

        let decoded = codec.decode(&codec.encode(&items).unwrap()).unwrap();
        assert_eq!(decoded, items);
    }

    #[test]
    fn test_round_trip_keeps_full_price_precision() {
        let codec = CompactCodec::default();
        let mut line = shirt(None, None, 1);
        line.unit_price = "12345678901234567.89".parse().unwrap();

        let text = codec.encode(std::slice::from_ref(&line)).unwrap();
        assert!(text.contains("\"p\":12345678901234567.89"), "{text}");

        let decoded = codec.decode(&text).unwrap();
        assert_eq!(decoded[0].unit_price, line.unit_price);
    }

    #[test]
    fn test_decode_legacy_shape() {
        let codec = CompactCodec::default();
        let text = json!([{
            "id": "p1",
            "cartItemId": "p1-M-blue",
            "name": "Shirt",
            "price": 99.9,
            "image": "/shirt.jpg",
            "quantity": 1,
            "selectedSize": "M",
            "selectedColor": "blue",
        }])
        .to_string();

        let decoded = codec.decode(&text).unwrap();
        assert_eq!(decoded, vec![shirt(Some("M"), Some("blue"), 1)]);
    }

    #[test]
    fn test_decode_legacy_with_null_selections() {
        let codec = CompactCodec::default();
        let text = json!([{
            "id": 7,
            "price": "10",
            "quantity": 2,
            "selectedSize": null,
            "selectedColor": null,
        }])
        .to_string();

        let decoded = codec.decode(&text).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].cart_item_id.as_str(), "7-default-default");
        assert_eq!(decoded[0].name, ProductDefaults::NAME);
        assert_eq!(decoded[0].image, ProductDefaults::IMAGE);
        assert_eq!(decoded[0].unit_price, Decimal::from(10));
    }

    #[test]
    fn test_decode_empty_array() {
        assert_eq!(CompactCodec::default().decode("[]"), Some(Vec::new()));
    }

    #[test]
    fn test_decode_malformed_is_none() {
        let codec = CompactCodec::default();
        assert_eq!(codec.decode(""), None);
        assert_eq!(codec.decode("{not json"), None);
        assert_eq!(codec.decode("{\"i\":\"p1\"}"), None);
        assert_eq!(codec.decode("[1, 2]"), None);
        assert_eq!(codec.decode("[{\"i\":\"p1\",\"q\":1}, \"x\"]"), None);
    }

    #[test]
    fn test_decode_drops_unusable_entries() {
        let codec = CompactCodec::default();
        let text = json!([
            { "i": "p1", "q": 1 },
            { "i": "p2", "q": 0 },
            { "i": "p3", "q": -4 },
            { "q": 2 },
            { "i": "p4" },
        ])
        .to_string();

        let decoded = codec.decode(&text).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].product_id.as_str(), "p1");
    }

    #[test]
    fn test_decode_merges_duplicate_identities() {
        let codec = CompactCodec::default();
        let text = json!([
            { "i": "p1", "s": "M", "q": 1 },
            { "i": "p2", "q": 1 },
            { "i": "p1", "s": "M", "q": 4 },
        ])
        .to_string();

        let decoded = codec.decode(&text).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].quantity, 5);
        assert_eq!(decoded[1].product_id.as_str(), "p2");
    }

    #[test]
    fn test_decode_rederives_stale_identity() {
        let codec = CompactCodec::default();
        let text = json!([{ "i": "p1", "c": "p1-undefined-undefined", "q": 1 }]).to_string();

        let decoded = codec.decode(&text).unwrap();
        assert_eq!(decoded[0].cart_item_id.as_str(), "p1-default-default");
    }
}
