//! # shop-records
//!
//! Backend record-store adapter for the storefront.
//!
//! The storefront keeps its data (carts, orders, products) in a managed
//! backend-as-a-service that exposes generic record collections. This crate
//! provides:
//!
//! 1. **RecordStore** - async trait over list/get/create/update/delete
//! 2. **PocketBaseStore** - HTTP implementation of the trait
//! 3. **CartService** - cart loading and order submission
//! 4. **OrderHistory** - past orders with per-currency prices
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_records::{CartService, CheckoutRequest, PocketBaseStore};
//! use shop_core::{CurrencyCode, CurrencyRegistry};
//! use std::sync::Arc;
//!
//! let store = PocketBaseStore::from_env()?;
//! let collections = store.config().collections.clone();
//! let carts = CartService::new(Arc::new(store), collections);
//!
//! let lines = carts.load_lines("user_123").await?;
//! let request = CheckoutRequest::new("user_123")
//!     .with_shipping_fee(5.0)
//!     .with_currency(CurrencyCode::BATH);
//! // Retries reuse `request`, so its idempotency key finds the stored order.
//! let receipt = carts
//!     .submit_order(&request, &lines, &CurrencyRegistry::builtin())
//!     .await?;
//! ```

pub mod cart;
pub mod client;
pub mod config;
pub mod history;
pub mod store;

// Re-exports
pub use cart::{CartLine, CartService, CheckoutRequest, OrderReceipt};
pub use client::PocketBaseStore;
pub use config::{BackendConfig, Collections};
pub use history::{HistoryEntry, HistoryItem, OrderHistory};
pub use store::{BoxedRecordStore, ListQuery, Record, RecordPage, RecordStore};
