//! Price parsing using decimal arithmetic.
//!
//! Catalog payloads and older cart snapshots carry prices as JSON numbers or
//! as numeric strings. Everything is normalized to a non-negative [`Decimal`]
//! at ingestion so the cart never does float arithmetic on money.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

/// Parse a JSON value into a non-negative decimal amount.
///
/// Accepts JSON numbers (including exponent notation) and strings holding a
/// number. Negative amounts clamp to zero. Anything else yields `None`.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use sepet_core::amount_from_json;
///
/// assert_eq!(amount_from_json(&serde_json::json!(100)), Some(Decimal::from(100)));
/// assert_eq!(amount_from_json(&serde_json::json!("19.90")), Some(Decimal::new(1990, 2)));
/// assert_eq!(amount_from_json(&serde_json::json!(-5)), Some(Decimal::ZERO));
/// assert_eq!(amount_from_json(&serde_json::json!({"newPrice": 5})), None);
/// ```
#[must_use]
pub fn amount_from_json(value: &Value) -> Option<Decimal> {
    let amount = match value {
        Value::Number(number) => parse_decimal(&number.to_string())?,
        Value::String(text) => parse_decimal(text.trim())?,
        _ => return None,
    };
    Some(amount.max(Decimal::ZERO))
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_integer_and_fraction() {
        assert_eq!(amount_from_json(&json!(250)), Some(Decimal::from(250)));
        assert_eq!(amount_from_json(&json!(99.9)), Some(Decimal::new(999, 1)));
    }

    #[test]
    fn test_numeric_string() {
        assert_eq!(amount_from_json(&json!(" 42.50 ")), Some(Decimal::new(4250, 2)));
        assert_eq!(amount_from_json(&json!("")), None);
        assert_eq!(amount_from_json(&json!("free")), None);
    }

    #[test]
    fn test_exponent_notation() {
        assert_eq!(amount_from_json(&json!(1e3)), Some(Decimal::from(1000)));
    }

    #[test]
    fn test_negative_clamps_to_zero() {
        assert_eq!(amount_from_json(&json!(-0.01)), Some(Decimal::ZERO));
    }

    #[test]
    fn test_non_numeric_values() {
        assert_eq!(amount_from_json(&json!(null)), None);
        assert_eq!(amount_from_json(&json!(true)), None);
        assert_eq!(amount_from_json(&json!([1])), None);
    }
}
