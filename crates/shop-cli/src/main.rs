//! # storefront
//!
//! Command-line storefront over the currency & order-total engine.
//!
//! ## Usage
//!
//! ```bash
//! # Optional backend for cart/checkout/history
//! export STOREFRONT_BACKEND_URL=http://127.0.0.1:8090
//!
//! storefront currencies
//! storefront --currency KIP quote --file cart.json
//! storefront --currency BATH products --query tea --sort price-asc --page 2
//! storefront --currency THB checkout --user u_123
//! storefront checkout --user u_123 --idempotency-key 6f1c...   # retry
//! ```

use clap::{Parser, Subcommand};
use shop_cli::state::parse_shipping_fee;
use shop_cli::{commands, AppConfig, AppState};
use shop_core::{CurrencyCode, Locale, ProductQuery, ProductSort};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "storefront", version, about = "Storefront currency & order-total engine")]
struct Cli {
    /// Display currency (USD, KIP/LAK, BATH/THB); defaults to STOREFRONT_CURRENCY
    #[arg(long, global = true)]
    currency: Option<CurrencyCode>,

    /// Locale for amount formatting (e.g. en-US, th-TH)
    #[arg(long, global = true)]
    locale: Option<Locale>,

    /// Shipping fee in base currency
    #[arg(long, global = true, value_parser = parse_shipping_fee)]
    shipping: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List supported currencies and rates
    Currencies,
    /// Compute totals for a cart file (JSON or TOML)
    Quote {
        #[arg(long, short)]
        file: PathBuf,
    },
    /// Show a user's cart
    Cart {
        #[arg(long, short)]
        user: String,
    },
    /// Place an order from a user's cart
    Checkout {
        #[arg(long, short)]
        user: String,
        /// Key printed by an earlier attempt; retrying with it never places a second order
        #[arg(long)]
        idempotency_key: Option<String>,
    },
    /// List a user's past orders
    History {
        #[arg(long, short)]
        user: String,
    },
    /// Search the product catalog
    Products {
        /// Text matched against name and description
        #[arg(long, short)]
        query: Option<String>,
        #[arg(long, short)]
        category: Option<String>,
        /// featured, price-asc, price-desc, name-asc, name-desc, newest
        #[arg(long, short, default_value = "featured")]
        sort: ProductSort,
        /// Minimum base price
        #[arg(long)]
        min: Option<f64>,
        /// Maximum base price
        #[arg(long)]
        max: Option<f64>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 12)]
        per_page: usize,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    // Logs go to stderr so command output stays pipeable.
    let (plain, structured) = if json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (Some(fmt::layer().with_writer(std::io::stderr)), None)
    };

    tracing_subscriber::registry()
        .with(plain)
        .with(structured)
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = AppConfig::from_env()?;
    let cli = Cli::parse();

    init_tracing(config.log_json);

    if let Some(locale) = cli.locale {
        config.locale = locale;
    }

    let state = AppState::new(config)?;
    if let Some(currency) = cli.currency {
        let previous = state.display.set(currency);
        debug!("Display currency switched from {}", previous);
    }
    debug!(
        "Display currency {}, locale {}",
        state.display.current(),
        state.config.locale
    );

    let output = match cli.command {
        Command::Currencies => commands::currencies(&state),
        Command::Quote { file } => commands::quote(&state, &file, cli.shipping)?,
        Command::Cart { user } => commands::cart(&state, &user, cli.shipping).await?,
        Command::Checkout {
            user,
            idempotency_key,
        } => commands::checkout(&state, &user, cli.shipping, idempotency_key).await?,
        Command::History { user } => commands::history(&state, &user).await?,
        Command::Products {
            query,
            category,
            sort,
            min,
            max,
            page,
            per_page,
        } => {
            let mut search = ProductQuery::default().sort(sort).price_range(min, max);
            if let Some(text) = query {
                search = search.text(text);
            }
            if let Some(category) = category {
                search = search.category(category);
            }
            commands::products(&state, &search, page, per_page)
        }
    };

    print!("{}", output);
    Ok(())
}
