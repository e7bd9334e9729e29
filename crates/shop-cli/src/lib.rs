//! # shop-cli
//!
//! Command-line storefront: currency listing, cart quotes, catalog search,
//! and cart/checkout/history against the record backend.

pub mod commands;
pub mod state;

pub use state::{AppConfig, AppState};
