//! # Application State
//!
//! Composition root for the storefront: configuration, the currency registry,
//! the shared display-currency cell, the product catalog and the optional
//! backend connection.

use anyhow::Context;
use shop_core::{
    CurrencyCode, CurrencyRegistry, DisplayState, Formatter, Locale, ProductCatalog,
};
use shop_records::{
    BackendConfig, BoxedRecordStore, CartService, Collections, OrderHistory, PocketBaseStore,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

const CONFIG_DIRS: [&str; 3] = ["config", "../config", "../../config"];

/// Parse a shipping fee: a finite, non-negative base-currency amount.
///
/// Shared by `STOREFRONT_SHIPPING_FEE` and the `--shipping` flag.
pub fn parse_shipping_fee(raw: &str) -> Result<f64, String> {
    let fee: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{raw:?} is not a number"))?;
    shop_core::validate_shipping_fee(fee).map_err(|e| e.to_string())?;
    Ok(fee)
}

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Initial display currency
    pub currency: CurrencyCode,
    /// Locale for amount formatting
    pub locale: Locale,
    /// Default shipping fee in base currency
    pub shipping_fee: f64,
    /// Emit JSON log lines
    pub log_json: bool,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let currency = match lookup("STOREFRONT_CURRENCY") {
            Some(raw) => raw.parse().context("Invalid STOREFRONT_CURRENCY")?,
            None => CurrencyCode::default(),
        };

        let locale = match lookup("STOREFRONT_LOCALE") {
            Some(raw) => raw.parse().context("Invalid STOREFRONT_LOCALE")?,
            None => Locale::default(),
        };

        let shipping_fee = match lookup("STOREFRONT_SHIPPING_FEE") {
            Some(raw) => parse_shipping_fee(&raw)
                .map_err(anyhow::Error::msg)
                .context("Invalid STOREFRONT_SHIPPING_FEE")?,
            None => 0.0,
        };

        let log_json = lookup("STOREFRONT_LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));

        Ok(Self {
            currency,
            locale,
            shipping_fee,
            log_json,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::default(),
            locale: Locale::default(),
            shipping_fee: 0.0,
            log_json: false,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub registry: Arc<CurrencyRegistry>,
    /// Selected display currency, shared with every rendering path
    pub display: Arc<DisplayState>,
    pub catalog: ProductCatalog,
    store: Option<BoxedRecordStore>,
    collections: Collections,
}

impl AppState {
    /// Load registry and catalog from `config/`, and connect to the backend
    /// when `STOREFRONT_BACKEND_URL` is set.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let registry = load_registry()?;
        let catalog = load_product_catalog()?;

        let (store, collections) = if std::env::var_os("STOREFRONT_BACKEND_URL").is_some() {
            let backend = BackendConfig::from_env()?;
            info!("Record store: {}", backend.base_url);
            let collections = backend.collections.clone();
            let store: BoxedRecordStore = Arc::new(PocketBaseStore::new(backend)?);
            (Some(store), collections)
        } else {
            info!("STOREFRONT_BACKEND_URL not set, running offline");
            (None, Collections::default())
        };

        Ok(Self::from_parts(config, registry, catalog, store, collections))
    }

    /// Assemble state from already-loaded parts
    pub fn from_parts(
        config: AppConfig,
        registry: CurrencyRegistry,
        catalog: ProductCatalog,
        store: Option<BoxedRecordStore>,
        collections: Collections,
    ) -> Self {
        let display = Arc::new(DisplayState::new(config.currency));
        Self {
            config,
            registry: Arc::new(registry),
            display,
            catalog,
            store,
            collections,
        }
    }

    pub fn formatter(&self) -> Formatter {
        Formatter::new(self.config.locale)
    }

    fn store(&self) -> anyhow::Result<BoxedRecordStore> {
        self.store
            .clone()
            .context("No backend configured (set STOREFRONT_BACKEND_URL)")
    }

    /// Cart service over the configured backend
    pub fn carts(&self) -> anyhow::Result<CartService> {
        Ok(CartService::new(self.store()?, self.collections.clone()))
    }

    /// Order history over the configured backend
    pub fn history(&self) -> anyhow::Result<OrderHistory> {
        Ok(OrderHistory::new(self.store()?, self.collections.clone()))
    }
}

fn find_config(file: &str) -> Option<(String, String)> {
    CONFIG_DIRS.iter().find_map(|dir| {
        let path = Path::new(dir).join(file);
        std::fs::read_to_string(&path)
            .ok()
            .map(|content| (path.display().to_string(), content))
    })
}

/// Load the currency registry from `config/currencies.toml`
fn load_registry() -> anyhow::Result<CurrencyRegistry> {
    match find_config("currencies.toml") {
        Some((path, content)) => {
            let registry = CurrencyRegistry::from_toml(&content)
                .with_context(|| format!("Failed to load {}", path))?;
            info!("Loaded currency registry from {}", path);
            Ok(registry)
        }
        None => {
            warn!("No currency registry found, using built-in rates");
            Ok(CurrencyRegistry::builtin())
        }
    }
}

/// Load product catalog from `config/products.toml`
fn load_product_catalog() -> anyhow::Result<ProductCatalog> {
    match find_config("products.toml") {
        Some((path, content)) => {
            let catalog = ProductCatalog::from_toml(&content)
                .with_context(|| format!("Failed to parse {}", path))?;
            info!("Loaded {} products from {}", catalog.products.len(), path);
            Ok(catalog)
        }
        None => {
            warn!("No product catalog found, using empty catalog");
            Ok(ProductCatalog::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.currency, CurrencyCode::USD);
        assert_eq!(config.locale, Locale::EnUs);
    }

    #[test]
    fn test_app_config_from_values() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("STOREFRONT_CURRENCY", "thb"),
            ("STOREFRONT_LOCALE", "de-DE"),
            ("STOREFRONT_SHIPPING_FEE", "4.5"),
            ("STOREFRONT_LOG_FORMAT", "JSON"),
        ]))
        .unwrap();
        assert_eq!(config.currency, CurrencyCode::BATH);
        assert_eq!(config.locale, Locale::DeDe);
        assert_eq!(config.shipping_fee, 4.5);
        assert!(config.log_json);
    }

    #[test]
    fn test_app_config_rejects_bad_values() {
        assert!(AppConfig::from_lookup(lookup_from(&[("STOREFRONT_CURRENCY", "EUR")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("STOREFRONT_SHIPPING_FEE", "-1")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("STOREFRONT_LOCALE", "tlh")])).is_err());
    }

    #[test]
    fn test_parse_shipping_fee() {
        assert_eq!(parse_shipping_fee(" 4.5 "), Ok(4.5));
        assert_eq!(parse_shipping_fee("0"), Ok(0.0));
        assert!(parse_shipping_fee("-1").is_err());
        assert!(parse_shipping_fee("NaN").is_err());
        assert!(parse_shipping_fee("inf").is_err());
        assert!(parse_shipping_fee("free").is_err());
    }

    #[test]
    fn test_bundled_config_files_parse() {
        let registry = CurrencyRegistry::from_toml(include_str!("../../../config/currencies.toml")).unwrap();
        assert_eq!(registry, CurrencyRegistry::builtin());

        let catalog = ProductCatalog::from_toml(include_str!("../../../config/products.toml")).unwrap();
        assert_eq!(catalog.products.len(), 7);
        assert_eq!(catalog.active_products().count(), 6);
        assert_eq!(catalog.get("tea-oolong").map(|p| p.base_price()), Some(18.0));
    }

    #[test]
    fn test_offline_state_has_no_backend() {
        let state = AppState::from_parts(
            AppConfig::default(),
            CurrencyRegistry::builtin(),
            ProductCatalog::new(),
            None,
            Collections::default(),
        );
        assert!(state.carts().is_err());
        assert!(state.history().is_err());
        assert_eq!(state.display.current(), CurrencyCode::USD);
    }
}
