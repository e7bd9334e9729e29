//! # Currency Registry
//!
//! The closed set of storefront currencies and the static table mapping each
//! one to its display symbol and conversion rate from the base currency.
//! The table is loaded once (from `config/currencies.toml` or the built-in
//! defaults) and is immutable afterwards.

use crate::error::{ShopError, ShopResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Storefront currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    /// US dollar (base currency)
    USD,
    /// Lao kip
    KIP,
    /// Thai baht
    BATH,
}

impl CurrencyCode {
    /// Every currency, in registry order
    pub const ALL: [CurrencyCode; 3] = [CurrencyCode::USD, CurrencyCode::KIP, CurrencyCode::BATH];

    /// Currency canonical prices are stored in
    pub const BASE: CurrencyCode = CurrencyCode::USD;

    /// Returns the storefront tag
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyCode::USD => "USD",
            CurrencyCode::KIP => "KIP",
            CurrencyCode::BATH => "BATH",
        }
    }

    /// Returns the ISO 4217 code
    pub fn iso_code(&self) -> &'static str {
        match self {
            CurrencyCode::USD => "USD",
            CurrencyCode::KIP => "LAK",
            CurrencyCode::BATH => "THB",
        }
    }

    fn index(self) -> usize {
        match self {
            CurrencyCode::USD => 0,
            CurrencyCode::KIP => 1,
            CurrencyCode::BATH => 2,
        }
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        CurrencyCode::BASE
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = ShopError;

    /// Accepts storefront tags and ISO aliases, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(CurrencyCode::USD),
            "KIP" | "LAK" => Ok(CurrencyCode::KIP),
            "BATH" | "THB" => Ok(CurrencyCode::BATH),
            _ => Err(ShopError::unknown_currency(s)),
        }
    }
}

/// Display symbol and conversion rate for one currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    /// Display glyph (e.g. "$", "₭")
    pub symbol: String,
    /// Multiplier from the base currency into this currency
    pub rate: f64,
}

impl CurrencyInfo {
    pub fn new(symbol: impl Into<String>, rate: f64) -> Self {
        Self {
            symbol: symbol.into(),
            rate,
        }
    }
}

/// One row of the registry configuration table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyEntry {
    pub code: CurrencyCode,
    pub symbol: String,
    pub rate: f64,
}

/// Registry configuration file (`[[currencies]]` array)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub currencies: Vec<CurrencyEntry>,
}

/// Immutable mapping from every `CurrencyCode` to its `CurrencyInfo`.
///
/// Construction validates the table, so lookups by `CurrencyCode` cannot fail.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyRegistry {
    entries: [CurrencyInfo; 3],
}

impl CurrencyRegistry {
    /// Built-in table used when no configuration file is present
    pub fn builtin() -> Self {
        Self {
            entries: [
                CurrencyInfo::new("$", 1.0),
                CurrencyInfo::new("₭", 21_000.0),
                CurrencyInfo::new("฿", 35.0),
            ],
        }
    }

    /// Build a registry from `(code, info)` pairs.
    ///
    /// Every code must appear exactly once, every rate must be finite and
    /// positive, and the base currency rate must be exactly 1.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (CurrencyCode, CurrencyInfo)>,
    ) -> ShopResult<Self> {
        let mut slots: [Option<CurrencyInfo>; 3] = [None, None, None];

        for (code, info) in entries {
            if !info.rate.is_finite() || info.rate <= 0.0 {
                return Err(ShopError::InvalidRegistry(format!(
                    "rate for {} must be a positive number, got {}",
                    code, info.rate
                )));
            }
            if code == CurrencyCode::BASE && info.rate != 1.0 {
                return Err(ShopError::InvalidRegistry(format!(
                    "base currency {} must have rate 1, got {}",
                    code, info.rate
                )));
            }
            let slot = &mut slots[code.index()];
            if slot.is_some() {
                return Err(ShopError::InvalidRegistry(format!(
                    "duplicate entry for {}",
                    code
                )));
            }
            *slot = Some(info);
        }

        let [usd, kip, bath] = slots;
        match (usd, kip, bath) {
            (Some(usd), Some(kip), Some(bath)) => Ok(Self {
                entries: [usd, kip, bath],
            }),
            (usd, kip, bath) => {
                let missing: Vec<&str> = [usd.is_none(), kip.is_none(), bath.is_none()]
                    .iter()
                    .zip(CurrencyCode::ALL)
                    .filter(|(absent, _)| **absent)
                    .map(|(_, code)| code.as_str())
                    .collect();
                Err(ShopError::InvalidRegistry(format!(
                    "missing entries for {}",
                    missing.join(", ")
                )))
            }
        }
    }

    /// Build a registry from a parsed configuration table
    pub fn from_config(config: RegistryConfig) -> ShopResult<Self> {
        Self::from_entries(
            config
                .currencies
                .into_iter()
                .map(|e| (e.code, CurrencyInfo::new(e.symbol, e.rate))),
        )
    }

    /// Load registry from TOML string
    pub fn from_toml(toml_str: &str) -> ShopResult<Self> {
        let config: RegistryConfig = toml::from_str(toml_str)?;
        Self::from_config(config)
    }

    /// Look up a currency's symbol and rate
    pub fn lookup(&self, code: CurrencyCode) -> &CurrencyInfo {
        &self.entries[code.index()]
    }

    /// Look up a currency by its textual tag.
    ///
    /// Fails with `UnknownCurrency` rather than defaulting.
    pub fn lookup_str(&self, code: &str) -> ShopResult<(CurrencyCode, &CurrencyInfo)> {
        let code: CurrencyCode = code.parse()?;
        Ok((code, self.lookup(code)))
    }

    /// Iterate over all entries in registry order
    pub fn iter(&self) -> impl Iterator<Item = (CurrencyCode, &CurrencyInfo)> {
        CurrencyCode::ALL.into_iter().zip(self.entries.iter())
    }

    /// Export the table back into its configuration form
    pub fn to_config(&self) -> RegistryConfig {
        RegistryConfig {
            currencies: self
                .iter()
                .map(|(code, info)| CurrencyEntry {
                    code,
                    symbol: info.symbol.clone(),
                    rate: info.rate,
                })
                .collect(),
        }
    }
}

impl Default for CurrencyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_invariants() {
        let registry = CurrencyRegistry::builtin();
        assert_eq!(registry.lookup(CurrencyCode::BASE).rate, 1.0);
        assert!(registry.iter().all(|(_, info)| info.rate > 0.0));
        assert_eq!(registry.iter().count(), CurrencyCode::ALL.len());
        assert_eq!(registry.lookup(CurrencyCode::KIP).symbol, "₭");
    }

    #[test]
    fn test_currency_code_parsing() {
        assert_eq!("usd".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert_eq!("LAK".parse::<CurrencyCode>().unwrap(), CurrencyCode::KIP);
        assert_eq!(" thb ".parse::<CurrencyCode>().unwrap(), CurrencyCode::BATH);
        assert_eq!("Bath".parse::<CurrencyCode>().unwrap(), CurrencyCode::BATH);

        let err = "EUR".parse::<CurrencyCode>().unwrap_err();
        assert!(matches!(err, ShopError::UnknownCurrency { ref code } if code == "EUR"));
    }

    #[test]
    fn test_lookup_str_does_not_default() {
        let registry = CurrencyRegistry::builtin();
        let (code, info) = registry.lookup_str("kip").unwrap();
        assert_eq!(code, CurrencyCode::KIP);
        assert_eq!(info.rate, 21_000.0);

        assert!(registry.lookup_str("").is_err());
        assert!(registry.lookup_str("GBP").is_err());
    }

    #[test]
    fn test_from_toml() {
        let registry = CurrencyRegistry::from_toml(
            r#"
            [[currencies]]
            code = "USD"
            symbol = "$"
            rate = 1.0

            [[currencies]]
            code = "KIP"
            symbol = "₭"
            rate = 0.0001

            [[currencies]]
            code = "BATH"
            symbol = "฿"
            rate = 36.5
            "#,
        )
        .unwrap();

        assert_eq!(registry.lookup(CurrencyCode::KIP).rate, 0.0001);
        assert_eq!(registry.lookup(CurrencyCode::BATH).symbol, "฿");
    }

    #[test]
    fn test_rejects_invalid_tables() {
        let usd = (CurrencyCode::USD, CurrencyInfo::new("$", 1.0));
        let kip = (CurrencyCode::KIP, CurrencyInfo::new("₭", 21_000.0));
        let bath = (CurrencyCode::BATH, CurrencyInfo::new("฿", 35.0));

        // missing entry
        let err = CurrencyRegistry::from_entries([usd.clone(), kip.clone()]).unwrap_err();
        assert!(err.to_string().contains("BATH"));

        // duplicate entry
        assert!(CurrencyRegistry::from_entries([
            usd.clone(),
            kip.clone(),
            bath.clone(),
            kip.clone()
        ])
        .is_err());

        // non-positive rate
        assert!(CurrencyRegistry::from_entries([
            usd.clone(),
            (CurrencyCode::KIP, CurrencyInfo::new("₭", 0.0)),
            bath.clone()
        ])
        .is_err());

        // base rate must be 1
        assert!(CurrencyRegistry::from_entries([
            (CurrencyCode::USD, CurrencyInfo::new("$", 2.0)),
            kip,
            bath
        ])
        .is_err());
    }

    #[test]
    fn test_unknown_code_in_toml_is_rejected() {
        let result = CurrencyRegistry::from_toml(
            r#"
            [[currencies]]
            code = "EUR"
            symbol = "€"
            rate = 0.9
            "#,
        );
        assert!(matches!(result, Err(ShopError::Configuration(_))));
    }

    #[test]
    fn test_config_round_trip() {
        let registry = CurrencyRegistry::builtin();
        let rebuilt = CurrencyRegistry::from_config(registry.to_config()).unwrap();
        assert_eq!(registry, rebuilt);
    }
}
