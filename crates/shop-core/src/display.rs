//! # Display Currency State
//!
//! Holds the user's selected display currency. One instance is created by the
//! composition root and shared (`Arc<DisplayState>`) with every view that
//! renders prices; only the currency selector writes to it.
//!
//! The selected currency affects rendering only. Stored and computed base
//! amounts never change with it.

use crate::currency::CurrencyCode;
use std::sync::{PoisonError, RwLock};

/// Shared, mutable display-currency cell
#[derive(Debug)]
pub struct DisplayState {
    currency: RwLock<CurrencyCode>,
    initial: CurrencyCode,
}

impl DisplayState {
    /// Create with an initial currency, which `reset` returns to
    pub fn new(initial: CurrencyCode) -> Self {
        Self {
            currency: RwLock::new(initial),
            initial,
        }
    }

    /// Currently selected display currency
    pub fn current(&self) -> CurrencyCode {
        *self.currency.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Select a new display currency, returning the previous one
    pub fn set(&self, code: CurrencyCode) -> CurrencyCode {
        let mut guard = self.currency.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, code)
    }

    /// Restore the initial currency (session end)
    pub fn reset(&self) {
        self.set(self.initial);
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new(CurrencyCode::default())
    }
}
