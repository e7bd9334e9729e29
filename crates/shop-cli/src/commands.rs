//! # Commands
//!
//! Each subcommand renders its result into a `String`; `main` prints it.
//! Amounts are stored in base currency and only converted here, for the
//! currency currently held in `AppState::display`.

use crate::state::AppState;
use anyhow::{bail, Context};
use serde::Deserialize;
use shop_core::{
    item_count, Converter, LineItem, OrderCalculator, PageLink, Pagination, PriceInput,
    ProductQuery, RawLineItem,
};
use shop_records::CheckoutRequest;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Number of page links shown on each side of the current page
const PAGE_RADIUS: usize = 2;

/// Cart file accepted by `quote`
#[derive(Debug, Deserialize)]
pub struct QuoteFile {
    #[serde(default)]
    pub items: Vec<RawLineItem>,
    /// Overrides the configured shipping fee
    #[serde(default)]
    pub shipping_fee: Option<PriceInput>,
}

impl QuoteFile {
    /// Parse JSON or TOML, chosen by file extension
    pub fn parse(path: &Path, content: &str) -> anyhow::Result<Self> {
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let file = if is_toml {
            toml::from_str(content).with_context(|| format!("Invalid TOML in {}", path.display()))?
        } else {
            serde_json::from_str(content)
                .with_context(|| format!("Invalid JSON in {}", path.display()))?
        };
        Ok(file)
    }
}

/// List the currency registry, marking the active display currency
pub fn currencies(state: &AppState) -> String {
    let current = state.display.current();
    let mut out = String::new();
    for (code, info) in state.registry.iter() {
        let marker = if code == current { "*" } else { " " };
        let _ = writeln!(
            out,
            "{} {:<5} {:<4} {:<3} rate {}",
            marker,
            code,
            code.iso_code(),
            info.symbol,
            info.rate
        );
    }
    out
}

/// Totals for a cart file, in the display currency
pub fn quote(state: &AppState, path: &Path, shipping_override: Option<f64>) -> anyhow::Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file = QuoteFile::parse(path, &content)?;

    let items: Vec<LineItem> = file.items.iter().map(LineItem::from).collect();
    let shipping_fee = shipping_override
        .or_else(|| file.shipping_fee.as_ref().map(PriceInput::amount))
        .unwrap_or(state.config.shipping_fee);
    debug!("Quoting {} items, shipping {}", items.len(), shipping_fee);

    let totals = OrderCalculator::default().compute(&items, shipping_fee)?;
    let currency = state.display.current();
    let display = totals.to_display(&state.registry, currency, state.config.locale);
    let converter = Converter::new(&state.registry);
    let formatter = state.formatter();

    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {} x {} = {}",
            i + 1,
            item.quantity,
            formatter.format_with_code(converter.convert(item.price, currency), currency),
            formatter.format_with_code(converter.convert(item.line_total(), currency), currency),
        );
    }
    let _ = writeln!(out, "Items:    {}", item_count(&items));
    let _ = writeln!(out, "Subtotal: {}", display.subtotal);
    let _ = writeln!(out, "Shipping: {}", display.shipping_fee);
    let _ = writeln!(out, "Total:    {}", display.total);
    Ok(out)
}

/// Search the catalog and render one page of results
pub fn products(
    state: &AppState,
    query: &ProductQuery,
    page: usize,
    per_page: usize,
) -> String {
    let matches = state.catalog.search(query);
    let pagination = Pagination::new(page, per_page, matches.len());
    let currency = state.display.current();
    let converter = Converter::new(&state.registry);
    let formatter = state.formatter();

    let mut out = String::new();
    if matches.is_empty() {
        out.push_str("No products found\n");
    } else {
        let _ = writeln!(
            out,
            "Showing {}-{} of {}",
            pagination.first_item(),
            pagination.last_item(),
            pagination.total_items
        );
        for product in pagination.slice(&matches) {
            let price = converter.convert(product.base_price(), currency);
            let _ = writeln!(
                out,
                "{:<12} {:<32} {:>16}",
                product.id,
                product.name,
                formatter.format_with_code(price, currency)
            );
        }
    }

    if pagination.total_pages > 1 {
        let links: Vec<String> = pagination
            .window(PAGE_RADIUS)
            .into_iter()
            .map(|link| match link {
                PageLink::Page(n) if n == pagination.page => format!("[{}]", n),
                PageLink::Page(n) => n.to_string(),
                PageLink::Gap => "...".to_string(),
            })
            .collect();
        let _ = writeln!(out, "Pages: {}", links.join(" "));
    }
    out
}

/// Current cart of a user, in the display currency
#[instrument(skip(state))]
pub async fn cart(state: &AppState, user_id: &str, shipping_override: Option<f64>) -> anyhow::Result<String> {
    let carts = state.carts()?;
    let lines = carts.load_lines(user_id).await?;
    if lines.is_empty() {
        return Ok(format!("Cart of {} is empty\n", user_id));
    }

    let items: Vec<LineItem> = lines.iter().map(|line| line.line_item()).collect();
    let shipping_fee = shipping_override.unwrap_or(state.config.shipping_fee);
    let totals = OrderCalculator::default().compute(&items, shipping_fee)?;

    let currency = state.display.current();
    let converter = Converter::new(&state.registry);
    let formatter = state.formatter();
    let display = totals.to_display(&state.registry, currency, state.config.locale);

    let mut out = String::new();
    for line in &lines {
        let _ = writeln!(
            out,
            "{:<32} {:>3} x {}",
            line.name,
            line.quantity,
            formatter.format_with_code(converter.convert(line.price, currency), currency)
        );
    }
    let _ = writeln!(out, "Subtotal: {}", display.subtotal);
    let _ = writeln!(out, "Shipping: {}", display.shipping_fee);
    let _ = writeln!(out, "Total:    {}", display.total);
    Ok(out)
}

/// Submit the user's cart as an order.
///
/// Passing the key printed by an earlier attempt makes a retry return that
/// order instead of placing a second one.
#[instrument(skip(state))]
pub async fn checkout(
    state: &AppState,
    user_id: &str,
    shipping_override: Option<f64>,
    idempotency_key: Option<String>,
) -> anyhow::Result<String> {
    let carts = state.carts()?;
    let lines = carts.load_lines(user_id).await?;
    if lines.is_empty() {
        bail!("Cart of {} is empty, nothing to check out", user_id);
    }

    let mut request = CheckoutRequest::new(user_id)
        .with_shipping_fee(shipping_override.unwrap_or(state.config.shipping_fee))
        .with_currency(state.display.current())
        .with_locale(state.config.locale);
    if let Some(key) = idempotency_key {
        request = request.with_idempotency_key(key);
    }

    let receipt = carts.submit_order(&request, &lines, &state.registry).await?;
    info!("Checkout complete: order {}", receipt.order_id);

    let mut out = String::new();
    if receipt.replayed {
        let _ = writeln!(out, "Order {} was already placed", receipt.order_id);
    } else {
        let _ = writeln!(out, "Order {} placed", receipt.order_id);
    }
    let _ = writeln!(out, "Total: {}", receipt.display.total);
    let _ = writeln!(out, "Idempotency key: {}", receipt.idempotency_key);
    if receipt.cleared_lines < lines.len() {
        let _ = writeln!(
            out,
            "Warning: {} cart line(s) could not be cleared",
            lines.len() - receipt.cleared_lines
        );
    }
    Ok(out)
}

/// Past orders of a user, priced in the display currency
#[instrument(skip(state))]
pub async fn history(state: &AppState, user_id: &str) -> anyhow::Result<String> {
    let entries = state.history()?.fetch(user_id).await?;
    if entries.is_empty() {
        return Ok(format!("No orders for {}\n", user_id));
    }

    let currency = state.display.current();
    let converter = Converter::new(&state.registry);
    let formatter = state.formatter();

    let mut out = String::new();
    for entry in &entries {
        let placed = entry
            .created
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let totals = entry.totals_in(currency, &converter);
        let _ = writeln!(
            out,
            "{}  {}  {:<10} {}",
            entry.id,
            placed,
            entry.status,
            formatter.format_with_code(totals.total, currency)
        );
        for item in &entry.items {
            let _ = writeln!(
                out,
                "    {} x {} @ {}",
                item.quantity,
                item.name,
                formatter.format_with_code(item.price_in(currency, &converter), currency)
            );
        }
    }
    Ok(out)
}
