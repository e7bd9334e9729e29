//! # shop-core
//!
//! Currency, pricing and order-total engine for the storefront.
//!
//! This crate provides:
//! - `CurrencyCode` and `CurrencyRegistry` for the fixed currency table
//! - `PriceInput` and `extract_price` for lenient price normalization
//! - `Converter` for base-to-display currency conversion
//! - `Formatter` and `Locale` for grouped amount rendering
//! - `LineItem`, `OrderTotals` and `OrderCalculator` for cart/order totals
//! - `DisplayState` for the user's selected display currency
//! - `ProductCatalog` search and `Pagination` math for listings
//! - `ShopError` for typed error handling
//!
//! No I/O happens here; every operation is a synchronous computation.
//!
//! ## Example
//!
//! ```rust
//! use shop_core::{compute_totals, CurrencyCode, CurrencyRegistry, LineItem, Locale, PriceInput};
//!
//! let registry = CurrencyRegistry::builtin();
//! let items = [
//!     LineItem::from_raw(&PriceInput::from("$10"), 2),
//!     LineItem::new(5.0, 1),
//! ];
//!
//! let totals = compute_totals(&items, 0.0);
//! assert_eq!(totals.total, 25.0);
//!
//! let display = totals.to_display(&registry, CurrencyCode::BATH, Locale::EnUs);
//! assert_eq!(display.total, "875 BATH");
//! ```

pub mod convert;
pub mod currency;
pub mod display;
pub mod error;
pub mod format;
pub mod order;
pub mod pagination;
pub mod price;
pub mod product;

// Re-exports for convenience
pub use convert::{convert, Converter};
pub use currency::{CurrencyCode, CurrencyEntry, CurrencyInfo, CurrencyRegistry, RegistryConfig};
pub use display::DisplayState;
pub use error::{ShopError, ShopResult};
pub use format::{format_amount, format_amount_for, format_amount_in, Formatter, Locale};
pub use order::{
    compute_totals, item_count, validate_items, validate_shipping_fee, DisplayTotals, LineItem,
    LineItemPolicy, OrderCalculator, OrderTotals, RawLineItem,
};
pub use pagination::{PageLink, Pagination};
pub use price::{extract_from_text, extract_price, PriceInput};
pub use product::{Product, ProductCatalog, ProductQuery, ProductSort};
