//! # Order History
//!
//! Past orders store a price per currency for each item (`price_usd`,
//! `price_thb`, `price_lak`). The display price for a currency uses the
//! stored field when present and otherwise converts `price_usd` with the
//! current registry, so older orders without precomputed prices still render.

use crate::config::Collections;
use crate::store::{BoxedRecordStore, ListQuery, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use shop_core::{
    compute_totals, Converter, CurrencyCode, LineItem, OrderTotals, PriceInput, ShopResult,
};
use tracing::{debug, instrument, warn};

/// An item of a past order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryItem {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub price_usd: PriceInput,
    #[serde(default)]
    pub price_thb: PriceInput,
    #[serde(default)]
    pub price_lak: PriceInput,
}

fn default_quantity() -> i64 {
    1
}

impl HistoryItem {
    fn stored_price(&self, currency: CurrencyCode) -> &PriceInput {
        match currency {
            CurrencyCode::USD => &self.price_usd,
            CurrencyCode::BATH => &self.price_thb,
            CurrencyCode::KIP => &self.price_lak,
        }
    }

    /// Unit price in `currency`: stored value first, converted base price otherwise
    pub fn price_in(&self, currency: CurrencyCode, converter: &Converter<'_>) -> f64 {
        let stored = self.stored_price(currency);
        if stored.is_missing() {
            converter.convert(self.price_usd.amount(), currency)
        } else {
            stored.amount()
        }
    }
}

/// A past order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: String,
    /// Display currency chosen at checkout
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
    /// Shipping fee in base currency
    #[serde(default)]
    pub shipping_fee: PriceInput,
    #[serde(default)]
    pub items: Vec<HistoryItem>,
}

/// Accept RFC 3339 and the backend's space-separated timestamps; anything
/// else (including empty strings) becomes `None`.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse::<DateTime<Utc>>().ok()))
}

impl HistoryEntry {
    /// Parse a record from the orders collection
    pub fn from_record(record: &Record) -> ShopResult<Self> {
        Ok(serde_json::from_value(record.to_value())?)
    }

    /// Totals in `currency`.
    ///
    /// Item prices resolve per currency; the shipping fee is converted from
    /// base currency.
    pub fn totals_in(&self, currency: CurrencyCode, converter: &Converter<'_>) -> OrderTotals {
        let items: Vec<LineItem> = self
            .items
            .iter()
            .map(|item| LineItem::new(item.price_in(currency, converter), item.quantity))
            .collect();
        let shipping_fee = converter.convert(self.shipping_fee.amount(), currency);
        compute_totals(&items, shipping_fee)
    }
}

/// Read access to a user's past orders
#[derive(Clone)]
pub struct OrderHistory {
    store: BoxedRecordStore,
    collections: Collections,
}

impl OrderHistory {
    pub fn new(store: BoxedRecordStore, collections: Collections) -> Self {
        Self { store, collections }
    }

    /// All orders of a user, newest first. Records that fail to parse are
    /// skipped with a warning.
    #[instrument(skip(self))]
    pub async fn fetch(&self, user_id: &str) -> ShopResult<Vec<HistoryEntry>> {
        let query = ListQuery::new().filter("user", user_id).sort("-created");
        let records = self.store.list_all(&self.collections.orders, &query).await?;

        let mut entries = Vec::with_capacity(records.len());
        for record in &records {
            match HistoryEntry::from_record(record) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping unreadable order {}: {}", record.id, e),
            }
        }
        debug!("Loaded {} of {} orders", entries.len(), records.len());
        Ok(entries)
    }

    /// A single order
    pub async fn get(&self, order_id: &str) -> ShopResult<HistoryEntry> {
        let record = self.store.get(&self.collections.orders, order_id).await?;
        HistoryEntry::from_record(&record)
    }
}
