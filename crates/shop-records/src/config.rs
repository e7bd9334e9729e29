//! # Backend Configuration
//!
//! Connection settings for the record-store backend.
//! Secrets are loaded from environment variables (or a `.env` file).

use shop_core::{ShopError, ShopResult};

/// Collection names used by the storefront
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    pub carts: String,
    pub orders: String,
    pub products: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            carts: "carts".to_string(),
            orders: "orders".to_string(),
            products: "products".to_string(),
        }
    }
}

/// Record-store backend configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL without trailing slash (e.g. "https://shop.pockethost.io")
    pub base_url: String,

    /// Auth token sent as the `Authorization` header, if any
    pub auth_token: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Collection names
    pub collections: Collections,
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STOREFRONT_BACKEND_URL`
    ///
    /// Optional:
    /// - `STOREFRONT_BACKEND_TOKEN`
    /// - `STOREFRONT_BACKEND_TIMEOUT_SECS` (default 10)
    pub fn from_env() -> ShopResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ShopResult<Self> {
        let base_url = lookup("STOREFRONT_BACKEND_URL").ok_or_else(|| {
            ShopError::Configuration("STOREFRONT_BACKEND_URL not set".to_string())
        })?;

        let mut config = Self::new(base_url)?;

        config.auth_token = lookup("STOREFRONT_BACKEND_TOKEN").filter(|t| !t.trim().is_empty());

        if let Some(raw) = lookup("STOREFRONT_BACKEND_TIMEOUT_SECS") {
            config.timeout_secs = raw.trim().parse().map_err(|_| {
                ShopError::Configuration(format!(
                    "STOREFRONT_BACKEND_TIMEOUT_SECS must be a whole number of seconds, got {raw:?}"
                ))
            })?;
        }

        Ok(config)
    }

    /// Create config for a base URL with default settings
    pub fn new(base_url: impl Into<String>) -> ShopResult<Self> {
        let base_url: String = base_url.into();
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ShopError::Configuration(
                "STOREFRONT_BACKEND_URL must start with http:// or https://".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            auth_token: None,
            timeout_secs: 10,
            collections: Collections::default(),
        })
    }

    /// Builder: set auth token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Builder: set collection names
    pub fn with_collections(mut self, collections: Collections) -> Self {
        self.collections = collections;
        self
    }

    /// Records endpoint of a collection
    pub fn records_url(&self, collection: &str) -> String {
        format!("{}/api/collections/{}/records", self.base_url, collection)
    }

    /// Single-record endpoint
    pub fn record_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.records_url(collection), id)
    }
}
