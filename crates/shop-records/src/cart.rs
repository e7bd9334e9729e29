//! # Cart & Checkout
//!
//! Loads a user's cart records into priced lines and submits orders.
//!
//! ## Checkout Flow
//! ```text
//! carts (user = id) ──► CartLine[] ──► OrderCalculator (strict)
//!                                              │
//!      orders (user, idempotency_key) ◄────────┘
//!           │ none stored            │ found
//!      orders.create(totals, ...)    reuse order
//!           └──────────┬─────────────┘
//!      carts.delete(each consumed line)
//! ```

use crate::config::Collections;
use crate::store::{BoxedRecordStore, ListQuery, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shop_core::{
    Converter, CurrencyCode, CurrencyRegistry, DisplayTotals, LineItem, Locale, OrderCalculator,
    OrderTotals, PriceInput, ShopError, ShopResult,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// One priced line of a user's cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Cart record ID
    pub record_id: String,
    /// Related product ID
    pub product_id: Option<String>,
    /// Product name (denormalized for display)
    pub name: String,
    /// Unit price in base currency, after lenient extraction
    pub price: f64,
    pub quantity: i64,
}

impl CartLine {
    /// Map a cart record, reading the price and name from the record itself
    /// or from its expanded `product` relation.
    pub fn from_record(record: &Record) -> Self {
        let price = record
            .field("price")
            .or_else(|| record.expanded("product", "price"))
            .map(PriceInput::from)
            .unwrap_or_default();

        let name = record
            .str_field("name")
            .or_else(|| record.expanded("product", "name").and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();

        Self {
            record_id: record.id.clone(),
            product_id: record.str_field("product").map(String::from),
            name,
            price: price.amount(),
            quantity: read_quantity(record.field("quantity")),
        }
    }

    pub fn line_item(&self) -> LineItem {
        LineItem::new(self.price, self.quantity)
    }
}

/// Quantity from a number or numeric string; anything else counts as one
fn read_quantity(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(1),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(1),
        _ => 1,
    }
}

/// One checkout attempt.
///
/// Retries of the same checkout must reuse `idempotency_key`: a submission
/// whose key is already stored returns the existing order instead of
/// creating a second one.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub user_id: String,
    /// Shipping fee in base currency
    pub shipping_fee: f64,
    /// Display currency chosen by the user
    pub currency: CurrencyCode,
    /// Locale for the receipt's rendered totals
    pub locale: Locale,
    pub idempotency_key: String,
}

impl CheckoutRequest {
    /// Request with no shipping, base currency, default locale and a fresh key
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            shipping_fee: 0.0,
            currency: CurrencyCode::default(),
            locale: Locale::default(),
            idempotency_key: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_shipping_fee(mut self, shipping_fee: f64) -> Self {
        self.shipping_fee = shipping_fee;
        self
    }

    pub fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Builder: reuse the key of an earlier attempt
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = key.into();
        self
    }
}

/// Result of a submitted order
#[derive(Debug, Clone, Serialize)]
pub struct OrderReceipt {
    pub order_id: String,
    pub idempotency_key: String,
    /// Base-currency totals sent to the backend
    pub totals: OrderTotals,
    /// Totals rendered in the request's currency and locale
    pub display: DisplayTotals,
    pub created_at: DateTime<Utc>,
    /// True when the key matched an order stored by an earlier attempt
    pub replayed: bool,
    /// Cart records removed after the order was stored
    pub cleared_lines: usize,
}

/// Backend field suffix for per-currency amounts (`total_usd`, `price_thb`, ...)
pub fn currency_field(prefix: &str, code: CurrencyCode) -> String {
    format!("{}_{}", prefix, code.iso_code().to_lowercase())
}

/// Cart operations over a record store
#[derive(Clone)]
pub struct CartService {
    store: BoxedRecordStore,
    collections: Collections,
    calculator: OrderCalculator,
}

impl CartService {
    /// Create a service; checkout validates lines strictly
    pub fn new(store: BoxedRecordStore, collections: Collections) -> Self {
        Self {
            store,
            collections,
            calculator: OrderCalculator::strict(),
        }
    }

    /// Builder: override the checkout calculator
    pub fn with_calculator(mut self, calculator: OrderCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    /// Load all cart lines belonging to a user
    #[instrument(skip(self))]
    pub async fn load_lines(&self, user_id: &str) -> ShopResult<Vec<CartLine>> {
        let query = ListQuery::new()
            .filter("user", user_id)
            .expand("product")
            .sort("created");
        let records = self.store.list_all(&self.collections.carts, &query).await?;
        Ok(records.iter().map(CartLine::from_record).collect())
    }

    /// Create an order record from cart lines, then clear those lines.
    ///
    /// Totals are stored in the base currency, alongside a precomputed total
    /// for every registry currency and the user's display currency. Lines and
    /// the shipping fee are validated by the service's calculator.
    #[instrument(
        skip(self, request, lines, registry),
        fields(user = %request.user_id, key = %request.idempotency_key, lines = lines.len())
    )]
    pub async fn submit_order(
        &self,
        request: &CheckoutRequest,
        lines: &[CartLine],
        registry: &CurrencyRegistry,
    ) -> ShopResult<OrderReceipt> {
        if lines.is_empty() {
            return Err(ShopError::InvalidRequest("Cart has no items".to_string()));
        }

        let items: Vec<LineItem> = lines.iter().map(CartLine::line_item).collect();
        let totals = self.calculator.compute(&items, request.shipping_fee)?;

        let (record, created_at, replayed) = match self.find_order(request).await? {
            Some(existing) => {
                info!(
                    "Order {} already placed with key {}",
                    existing.id, request.idempotency_key
                );
                let placed_at = existing
                    .str_field("placed_at")
                    .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
                    .map_or_else(Utc::now, |t| t.with_timezone(&Utc));
                (existing, placed_at, true)
            }
            None => {
                let created_at = Utc::now();
                let body = order_body(request, lines, &totals, &Converter::new(registry), created_at);
                let record = self.store.create(&self.collections.orders, &body).await?;
                info!(
                    "Created order {} for user {}: total={} {}",
                    record.id,
                    request.user_id,
                    totals.total,
                    CurrencyCode::BASE
                );
                (record, created_at, false)
            }
        };

        let mut cleared_lines = 0;
        for line in lines {
            // The order already exists; a stale cart line must not fail checkout.
            match self.store.delete(&self.collections.carts, &line.record_id).await {
                Ok(()) => cleared_lines += 1,
                Err(e) => warn!("Failed to clear cart line {}: {}", line.record_id, e),
            }
        }

        Ok(OrderReceipt {
            order_id: record.id,
            idempotency_key: request.idempotency_key.clone(),
            display: totals.to_display(registry, request.currency, request.locale),
            totals,
            created_at,
            replayed,
            cleared_lines,
        })
    }

    /// Order stored by an earlier attempt with the same key
    async fn find_order(&self, request: &CheckoutRequest) -> ShopResult<Option<Record>> {
        let query = ListQuery::new()
            .filter("user", request.user_id.as_str())
            .filter("idempotency_key", request.idempotency_key.as_str())
            .page(1, 1);
        let page = self.store.list(&self.collections.orders, &query).await?;
        Ok(page.items.into_iter().next())
    }
}

fn order_body(
    request: &CheckoutRequest,
    lines: &[CartLine],
    totals: &OrderTotals,
    converter: &Converter<'_>,
    created_at: DateTime<Utc>,
) -> Value {
    let items: Vec<Value> = lines
        .iter()
        .map(|line| {
            let mut item = json!({
                "product": line.product_id,
                "name": line.name,
                "quantity": line.quantity,
            });
            for code in CurrencyCode::ALL {
                item[currency_field("price", code)] = json!(converter.convert(line.price, code));
            }
            item
        })
        .collect();

    let mut body = json!({
        "user": request.user_id,
        "items": items,
        "subtotal": totals.subtotal,
        "shipping_fee": totals.shipping_fee,
        "total": totals.total,
        "currency": request.currency,
        "status": "pending",
        "idempotency_key": request.idempotency_key,
        "placed_at": created_at.to_rfc3339(),
    });
    for code in CurrencyCode::ALL {
        body[currency_field("total", code)] = json!(converter.convert(totals.total, code));
    }
    body
}
