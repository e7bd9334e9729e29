//! # Storefront Error Types
//!
//! Typed error handling shared by every storefront crate.
//! Engine operations and backend calls both return `Result<T, ShopError>`.

use thiserror::Error;

/// Core error type for storefront operations
#[derive(Debug, Error)]
pub enum ShopError {
    /// Currency tag outside the closed set (corrupted state or bad input)
    #[error("Unknown currency: {code}")]
    UnknownCurrency { code: String },

    /// Line item rejected by the strict calculator policy
    #[error("Invalid line item at index {index}: {reason}")]
    InvalidLineItem { index: usize, reason: String },

    /// Currency registry table violates its invariants
    #[error("Invalid currency registry: {0}")]
    InvalidRegistry(String),

    /// Locale tag the formatter has no conventions for
    #[error("Unsupported locale: {locale}")]
    UnsupportedLocale { locale: String },

    /// Invalid request data (e.g. checking out an empty cart)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration errors (missing keys, invalid values)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Record missing from a backend collection
    #[error("Record not found: {collection}/{id}")]
    RecordNotFound { collection: String, id: String },

    /// Backend answered with a non-success status
    #[error("Backend error [{status}]: {message}")]
    Backend { status: u16, message: String },

    /// Network/HTTP error communicating with the backend
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Rate limited by the backend
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ShopError {
    /// Returns true if this error is transient and the call may be retried.
    ///
    /// Engine errors are deterministic and never retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            ShopError::NetworkError(_) | ShopError::RateLimited { .. } => true,
            ShopError::Backend { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Shorthand for an unknown currency error
    pub fn unknown_currency(code: impl Into<String>) -> Self {
        ShopError::UnknownCurrency { code: code.into() }
    }
}

impl From<serde_json::Error> for ShopError {
    fn from(err: serde_json::Error) -> Self {
        ShopError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ShopError {
    fn from(err: toml::de::Error) -> Self {
        ShopError::Configuration(err.to_string())
    }
}

/// Result type alias for storefront operations
pub type ShopResult<T> = Result<T, ShopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ShopError::NetworkError("timeout".into()).is_retryable());
        assert!(ShopError::RateLimited {
            retry_after_secs: 30
        }
        .is_retryable());
        assert!(ShopError::Backend {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());
        assert!(!ShopError::Backend {
            status: 400,
            message: "bad filter".into()
        }
        .is_retryable());
        assert!(!ShopError::unknown_currency("EUR").is_retryable());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ShopError::unknown_currency("EUR").to_string(),
            "Unknown currency: EUR"
        );
        assert_eq!(
            ShopError::InvalidLineItem {
                index: 2,
                reason: "quantity must be at least 1".into()
            }
            .to_string(),
            "Invalid line item at index 2: quantity must be at least 1"
        );
    }
}
