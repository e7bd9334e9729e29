//! # Currency Conversion
//!
//! Maps base-currency amounts into a display currency. Results are left
//! unrounded so they can feed further calculations; rounding happens only in
//! the formatter.

use crate::currency::{CurrencyCode, CurrencyRegistry};
use crate::order::OrderTotals;

/// Converter bound to a registry
#[derive(Debug, Clone, Copy)]
pub struct Converter<'a> {
    registry: &'a CurrencyRegistry,
}

impl<'a> Converter<'a> {
    pub fn new(registry: &'a CurrencyRegistry) -> Self {
        Self { registry }
    }

    /// Convert a base-currency amount into `target`.
    ///
    /// `base_amount` must be finite; NaN and infinities propagate unchanged.
    pub fn convert(&self, base_amount: f64, target: CurrencyCode) -> f64 {
        base_amount * self.registry.lookup(target).rate
    }

    /// Convert an amount in `from` back into the base currency
    pub fn to_base(&self, amount: f64, from: CurrencyCode) -> f64 {
        amount / self.registry.lookup(from).rate
    }

    /// Convert every aggregate of an order into `target`
    pub fn convert_totals(&self, totals: &OrderTotals, target: CurrencyCode) -> OrderTotals {
        OrderTotals {
            subtotal: self.convert(totals.subtotal, target),
            shipping_fee: self.convert(totals.shipping_fee, target),
            total: self.convert(totals.total, target),
        }
    }

    pub fn registry(&self) -> &'a CurrencyRegistry {
        self.registry
    }
}

/// Convert using a registry without holding a `Converter`
pub fn convert(registry: &CurrencyRegistry, base_amount: f64, target: CurrencyCode) -> f64 {
    Converter::new(registry).convert(base_amount, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_currency_is_identity() {
        let registry = CurrencyRegistry::builtin();
        assert_eq!(convert(&registry, 19.99, CurrencyCode::USD), 19.99);
    }

    #[test]
    fn test_convert_uses_rate() {
        let registry = CurrencyRegistry::builtin();
        let converter = Converter::new(&registry);
        assert_eq!(converter.convert(2.0, CurrencyCode::KIP), 42_000.0);
        assert_eq!(converter.convert(10.0, CurrencyCode::BATH), 350.0);
    }

    #[test]
    fn test_result_is_not_rounded() {
        let registry = CurrencyRegistry::builtin();
        let converted = convert(&registry, 0.333, CurrencyCode::BATH);
        assert!((converted - 11.655).abs() < 1e-9);
    }

    #[test]
    fn test_to_base_inverts_convert() {
        let registry = CurrencyRegistry::builtin();
        let converter = Converter::new(&registry);
        for code in CurrencyCode::ALL {
            let back = converter.to_base(converter.convert(123.45, code), code);
            assert!((back - 123.45).abs() < 1e-9, "{code}");
        }
    }

    #[test]
    fn test_convert_totals() {
        let registry = CurrencyRegistry::builtin();
        let totals = OrderTotals {
            subtotal: 20.0,
            shipping_fee: 5.0,
            total: 25.0,
        };
        let converted = Converter::new(&registry).convert_totals(&totals, CurrencyCode::BATH);
        assert_eq!(converted.subtotal, 700.0);
        assert_eq!(converted.shipping_fee, 175.0);
        assert_eq!(converted.total, 875.0);
    }
}
