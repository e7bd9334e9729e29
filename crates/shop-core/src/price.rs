//! # Price Extraction
//!
//! Normalizes the price shapes found in backend records (numbers, numeric
//! strings, currency-prefixed strings, missing values) into a base-currency
//! amount.
//!
//! Parsing is lenient: anything that does not contain a number becomes `0`.
//! A malformed price therefore renders as free instead of failing the view.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// ASCII digits only; `\d` is Unicode-aware and matches Thai/Lao numerals.
static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("decimal pattern is valid"));

/// Raw price as it arrives from record data
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    /// Numeric field
    Number(f64),
    /// Text field, possibly with a currency prefix (e.g. "$19.99")
    Text(String),
    /// Null or absent field
    #[default]
    Missing,
}

impl PriceInput {
    /// Normalize into a numeric base-currency amount
    pub fn amount(&self) -> f64 {
        extract_price(self)
    }

    /// True for null/absent values and blank text
    pub fn is_missing(&self) -> bool {
        match self {
            PriceInput::Missing => true,
            PriceInput::Text(text) => text.trim().is_empty(),
            PriceInput::Number(_) => false,
        }
    }
}

impl From<f64> for PriceInput {
    fn from(value: f64) -> Self {
        PriceInput::Number(value)
    }
}

impl From<&str> for PriceInput {
    fn from(value: &str) -> Self {
        PriceInput::Text(value.to_string())
    }
}

impl From<String> for PriceInput {
    fn from(value: String) -> Self {
        PriceInput::Text(value)
    }
}

impl<T: Into<PriceInput>> From<Option<T>> for PriceInput {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PriceInput::Missing)
    }
}

impl From<&serde_json::Value> for PriceInput {
    /// Non-numeric, non-string JSON values are treated as missing.
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map_or(PriceInput::Missing, PriceInput::Number),
            serde_json::Value::String(s) => PriceInput::Text(s.clone()),
            _ => PriceInput::Missing,
        }
    }
}

/// Extract a base-currency amount from a raw price.
///
/// - numbers are returned unchanged (sign is not clamped)
/// - text yields the first unsigned decimal it contains, or `0`
/// - missing values yield `0`
pub fn extract_price(input: &PriceInput) -> f64 {
    match input {
        PriceInput::Number(value) => *value,
        PriceInput::Text(text) => extract_from_text(text),
        PriceInput::Missing => 0.0,
    }
}

/// Extract the first unsigned decimal number from a string, or `0`
pub fn extract_from_text(text: &str) -> f64 {
    DECIMAL
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_empty_are_zero() {
        assert_eq!(extract_price(&PriceInput::Missing), 0.0);
        assert_eq!(extract_price(&PriceInput::from("")), 0.0);
        assert_eq!(extract_price(&PriceInput::from(None::<f64>)), 0.0);
    }

    #[test]
    fn test_is_missing() {
        assert!(PriceInput::Missing.is_missing());
        assert!(PriceInput::from("  ").is_missing());
        assert!(!PriceInput::from("abc").is_missing());
        assert!(!PriceInput::from(0.0).is_missing());
    }

    #[test]
    fn test_numbers_pass_through() {
        assert_eq!(extract_price(&PriceInput::from(42.0)), 42.0);
        assert_eq!(extract_price(&PriceInput::from(-3.5)), -3.5);
    }

    #[test]
    fn test_text_prices() {
        assert_eq!(extract_from_text("$19.99"), 19.99);
        assert_eq!(extract_from_text("12"), 12.0);
        assert_eq!(extract_from_text("USD 7.50 each"), 7.5);
        assert_eq!(extract_from_text("abc"), 0.0);
    }

    #[test]
    fn test_lenient_boundaries() {
        // sign is not part of the match
        assert_eq!(extract_from_text("-5"), 5.0);
        // grouping separators end the match
        assert_eq!(extract_from_text("1,299.00"), 1.0);
        // a trailing dot without digits is not a fraction
        assert_eq!(extract_from_text("8."), 8.0);
        // first number wins
        assert_eq!(extract_from_text("2 for 15"), 2.0);
    }

    #[test]
    fn test_native_digits_are_skipped() {
        assert_eq!(extract_from_text("๑๒๐ บาท / $12"), 12.0);
        assert_eq!(extract_from_text("1๒"), 1.0);
        assert_eq!(extract_from_text("ລາຄາ ໑໐ / 10"), 10.0);
        assert_eq!(extract_from_text("๑๒๐"), 0.0);
    }

    #[test]
    fn test_deserialize_untagged() {
        let values: Vec<PriceInput> = serde_json::from_str(r#"[19.5, "$3", null]"#).unwrap();
        assert_eq!(
            values,
            vec![
                PriceInput::Number(19.5),
                PriceInput::Text("$3".into()),
                PriceInput::Missing
            ]
        );
        assert_eq!(values.iter().map(PriceInput::amount).sum::<f64>(), 22.5);
    }

    #[test]
    fn test_from_json_value() {
        assert_eq!(PriceInput::from(&serde_json::json!(4)), PriceInput::Number(4.0));
        assert_eq!(PriceInput::from(&serde_json::json!(true)), PriceInput::Missing);
        assert_eq!(
            PriceInput::from(&serde_json::json!("฿120")).amount(),
            120.0
        );
    }
}
