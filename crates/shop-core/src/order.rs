//! # Order Totals
//!
//! Aggregates cart or order line items into subtotal, shipping and total in
//! the base currency, and renders those aggregates for a display currency.
//!
//! ```text
//! raw line items ──► PriceInput::amount ──► compute_totals (base currency)
//!                                                 │
//!                     Converter::convert_totals ◄─┘
//!                                 │
//!                     Formatter ──► DisplayTotals
//! ```

use crate::convert::Converter;
use crate::currency::{CurrencyCode, CurrencyRegistry};
use crate::error::{ShopError, ShopResult};
use crate::format::{Formatter, Locale};
use crate::price::PriceInput;
use serde::{Deserialize, Serialize};

/// A priced entry in a cart or order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Unit price in base currency
    pub price: f64,
    /// Quantity (signed so upstream mistakes stay visible in the arithmetic)
    pub quantity: i64,
}

impl LineItem {
    pub fn new(price: f64, quantity: i64) -> Self {
        Self { price, quantity }
    }

    /// Build from a raw record price, applying lenient extraction
    pub fn from_raw(price: &PriceInput, quantity: i64) -> Self {
        Self::new(price.amount(), quantity)
    }

    /// Price × quantity
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// Line item with its price still in raw record form
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawLineItem {
    #[serde(default)]
    pub price: PriceInput,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

impl From<&RawLineItem> for LineItem {
    fn from(raw: &RawLineItem) -> Self {
        LineItem::from_raw(&raw.price, raw.quantity)
    }
}

/// Aggregates for one cart or order, all in base currency
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: f64,
    pub shipping_fee: f64,
    pub total: f64,
}

impl OrderTotals {
    /// Convert and format for a display currency
    pub fn to_display(
        &self,
        registry: &CurrencyRegistry,
        currency: CurrencyCode,
        locale: Locale,
    ) -> DisplayTotals {
        let amounts = Converter::new(registry).convert_totals(self, currency);
        let formatter = Formatter::new(locale);
        DisplayTotals {
            currency,
            symbol: registry.lookup(currency).symbol.clone(),
            subtotal: formatter.format_with_code(amounts.subtotal, currency),
            shipping_fee: formatter.format_with_code(amounts.shipping_fee, currency),
            total: formatter.format_with_code(amounts.total, currency),
            amounts,
        }
    }
}

/// Totals converted into a display currency, with rendered strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayTotals {
    pub currency: CurrencyCode,
    pub symbol: String,
    /// Unrounded converted amounts
    pub amounts: OrderTotals,
    pub subtotal: String,
    pub shipping_fee: String,
    pub total: String,
}

/// How the calculator treats out-of-range line items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemPolicy {
    /// Trust upstream validation; negative values flow through the arithmetic
    #[default]
    PassThrough,
    /// Reject negative or non-finite prices and quantities below 1
    Strict,
}

/// Order calculator with an explicit line-item policy
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderCalculator {
    pub policy: LineItemPolicy,
}

impl OrderCalculator {
    pub fn new(policy: LineItemPolicy) -> Self {
        Self { policy }
    }

    pub fn strict() -> Self {
        Self::new(LineItemPolicy::Strict)
    }

    /// Compute totals, validating items first under the strict policy
    pub fn compute(&self, items: &[LineItem], shipping_fee: f64) -> ShopResult<OrderTotals> {
        if self.policy == LineItemPolicy::Strict {
            validate_items(items)?;
            validate_shipping_fee(shipping_fee)?;
        }
        Ok(compute_totals(items, shipping_fee))
    }
}

/// Check every item against the strict policy
pub fn validate_items(items: &[LineItem]) -> ShopResult<()> {
    for (index, item) in items.iter().enumerate() {
        let reason = if !item.price.is_finite() {
            "price must be a finite number"
        } else if item.price < 0.0 {
            "price must not be negative"
        } else if item.quantity < 1 {
            "quantity must be at least 1"
        } else {
            continue;
        };
        return Err(ShopError::InvalidLineItem {
            index,
            reason: reason.to_string(),
        });
    }
    Ok(())
}

/// Shipping fees must be finite and non-negative under the strict policy
pub fn validate_shipping_fee(shipping_fee: f64) -> ShopResult<()> {
    if shipping_fee.is_finite() && shipping_fee >= 0.0 {
        Ok(())
    } else {
        Err(ShopError::InvalidRequest(format!(
            "shipping fee must be a non-negative number, got {}",
            shipping_fee
        )))
    }
}

/// Sum line items into base-currency totals.
///
/// Pure: the same inputs always produce the same totals.
pub fn compute_totals(items: &[LineItem], shipping_fee: f64) -> OrderTotals {
    let subtotal: f64 = items.iter().map(LineItem::line_total).sum();
    OrderTotals {
        subtotal,
        shipping_fee,
        total: subtotal + shipping_fee,
    }
}

/// Total number of units across all items
pub fn item_count(items: &[LineItem]) -> i64 {
    items.iter().map(|i| i.quantity).sum()
}
