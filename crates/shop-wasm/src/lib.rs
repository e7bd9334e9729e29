//! # shop-wasm
//!
//! WebAssembly bindings for the storefront currency engine.
//!
//! The browser storefront keeps every price in base currency and renders
//! through a `Storefront` object, which owns the currency registry and the
//! user's selected display currency.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { Storefront } from 'shop-wasm';
//!
//! await init();
//!
//! const shop = new Storefront();
//! shop.set_currency('THB');
//!
//! const totals = shop.cart_totals([
//!   { price: '$10', quantity: 2 },
//!   { price: 5 },
//! ], 0);
//!
//! console.log(totals.total); // "875 BATH"
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build crates/shop-wasm --target web
//! ```

use serde::Serialize;
use shop_core::{
    extract_from_text, format_amount_in, Converter, CurrencyCode, CurrencyRegistry, DisplayState,
    DisplayTotals, LineItem, Locale, OrderCalculator, RawLineItem, ShopError, ShopResult,
};
use wasm_bindgen::prelude::*;

fn to_js(err: ShopError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Registry row handed to the currency picker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyRow {
    pub code: CurrencyCode,
    pub symbol: String,
    pub rate: f64,
    pub selected: bool,
}

/// Currency engine instance for one storefront page
#[wasm_bindgen]
pub struct Storefront {
    registry: CurrencyRegistry,
    display: DisplayState,
    locale: Locale,
}

impl Storefront {
    /// Build from a `[[currencies]]` TOML table
    pub fn try_from_toml(toml_str: &str) -> ShopResult<Self> {
        Ok(Self::with_registry(CurrencyRegistry::from_toml(toml_str)?))
    }

    pub fn with_registry(registry: CurrencyRegistry) -> Self {
        Self {
            registry,
            display: DisplayState::default(),
            locale: Locale::default(),
        }
    }

    /// Select a display currency by code or alias
    pub fn try_set_currency(&self, code: &str) -> ShopResult<CurrencyCode> {
        let (code, _) = self.registry.lookup_str(code)?;
        self.display.set(code);
        Ok(code)
    }

    /// Totals of raw line items in the display currency
    pub fn totals_for(&self, items: &[RawLineItem], shipping_fee: f64) -> ShopResult<DisplayTotals> {
        let items: Vec<LineItem> = items.iter().map(LineItem::from).collect();
        let totals = OrderCalculator::default().compute(&items, shipping_fee)?;
        Ok(totals.to_display(&self.registry, self.display.current(), self.locale))
    }

    pub fn rows(&self) -> Vec<CurrencyRow> {
        let current = self.display.current();
        self.registry
            .iter()
            .map(|(code, info)| CurrencyRow {
                code,
                symbol: info.symbol.clone(),
                rate: info.rate,
                selected: code == current,
            })
            .collect()
    }
}

impl Default for Storefront {
    fn default() -> Self {
        Self::with_registry(CurrencyRegistry::builtin())
    }
}

#[wasm_bindgen]
impl Storefront {
    /// Storefront over the built-in currency table
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storefront over a TOML currency table
    #[wasm_bindgen]
    pub fn from_toml(toml_str: &str) -> Result<Storefront, JsValue> {
        Self::try_from_toml(toml_str).map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn set_currency(&self, code: &str) -> Result<String, JsValue> {
        self.try_set_currency(code)
            .map(|code| code.to_string())
            .map_err(to_js)
    }

    /// Back to the initial display currency
    #[wasm_bindgen]
    pub fn reset_currency(&self) {
        self.display.reset();
    }

    #[wasm_bindgen(getter)]
    pub fn currency(&self) -> String {
        self.display.current().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn symbol(&self) -> String {
        self.registry.lookup(self.display.current()).symbol.clone()
    }

    #[wasm_bindgen]
    pub fn set_locale(&mut self, tag: &str) -> Result<(), JsValue> {
        self.locale = tag.parse().map_err(to_js)?;
        Ok(())
    }

    /// Base amount in the display currency, unrounded
    #[wasm_bindgen]
    pub fn convert(&self, base_amount: f64) -> f64 {
        Converter::new(&self.registry).convert(base_amount, self.display.current())
    }

    /// Convert a base amount and render it as "amount CODE"
    #[wasm_bindgen]
    pub fn format_amount(&self, base_amount: f64) -> String {
        let currency = self.display.current();
        let amount = self.convert(base_amount);
        format!("{} {}", format_amount_in(amount, self.locale), currency)
    }

    /// Totals for an array of `{ price, quantity }`, prices parsed leniently
    #[wasm_bindgen]
    pub fn cart_totals(&self, items: JsValue, shipping_fee: f64) -> Result<JsValue, JsValue> {
        let items: Vec<RawLineItem> = serde_wasm_bindgen::from_value(items)
            .map_err(|e| JsValue::from_str(&format!("Invalid cart items: {}", e)))?;
        let totals = self.totals_for(&items, shipping_fee).map_err(to_js)?;
        serde_wasm_bindgen::to_value(&totals).map_err(JsValue::from)
    }

    /// Registry rows for a currency picker
    #[wasm_bindgen]
    pub fn currencies(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.rows()).map_err(JsValue::from)
    }
}

/// Lenient price extraction for text scraped from the page
#[wasm_bindgen]
pub fn extract_price_text(text: &str) -> f64 {
    extract_from_text(text)
}

/// Group an amount for a locale; unknown locales fall back to en-US
#[wasm_bindgen]
pub fn format_amount(amount: f64, locale: &str) -> String {
    format_amount_in(amount, Locale::parse_lossy(locale))
}

/// Log to browser console
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_core::PriceInput;

    fn raw(price: impl Into<PriceInput>, quantity: i64) -> RawLineItem {
        RawLineItem {
            price: price.into(),
            quantity,
        }
    }

    #[test]
    fn test_default_currency_is_usd() {
        let shop = Storefront::new();
        assert_eq!(shop.currency(), "USD");
        assert_eq!(shop.symbol(), "$");
        assert_eq!(shop.convert(12.5), 12.5);
    }

    #[test]
    fn test_switch_and_reset_currency() {
        let shop = Storefront::new();
        assert_eq!(shop.try_set_currency("thb").unwrap(), CurrencyCode::BATH);
        assert_eq!(shop.convert(10.0), 350.0);
        assert_eq!(shop.format_amount(10.0), "350 BATH");

        assert!(shop.try_set_currency("EUR").is_err());
        assert_eq!(shop.currency(), "BATH");

        shop.reset_currency();
        assert_eq!(shop.currency(), "USD");
    }

    #[test]
    fn test_totals_for_cart() {
        let shop = Storefront::new();
        shop.try_set_currency("KIP").unwrap();
        let totals = shop
            .totals_for(&[raw("$10", 2), raw(5.0, 1), raw(None::<f64>, 3)], 0.5)
            .unwrap();
        assert_eq!(totals.amounts.total, 25.5 * 21000.0);
        assert_eq!(totals.total, "535,500 KIP");
        assert_eq!(totals.symbol, "₭");
    }

    #[test]
    fn test_from_toml_registry() {
        let shop = Storefront::try_from_toml(
            r#"
                [[currencies]]
                code = "USD"
                symbol = "$"
                rate = 1.0

                [[currencies]]
                code = "KIP"
                symbol = "₭"
                rate = 20000.0

                [[currencies]]
                code = "BATH"
                symbol = "฿"
                rate = 36.0
            "#,
        )
        .unwrap();
        shop.try_set_currency("LAK").unwrap();
        assert_eq!(shop.convert(1.5), 30000.0);
        assert!(Storefront::try_from_toml("currencies = []").is_err());
    }

    #[test]
    fn test_rows_mark_selection() {
        let shop = Storefront::new();
        shop.try_set_currency("BATH").unwrap();
        let rows = shop.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows.iter().filter(|r| r.selected).map(|r| r.code).collect::<Vec<_>>(),
            vec![CurrencyCode::BATH]
        );
    }

    #[test]
    fn test_free_functions() {
        assert_eq!(extract_price_text("฿120.50"), 120.5);
        assert_eq!(extract_price_text("free"), 0.0);
        assert_eq!(format_amount(1234567.0, "en-US"), "1,234,567");
        assert_eq!(format_amount(1234.5, "xx-YY"), "1,234.50");
        assert!(!version().is_empty());
    }
}
