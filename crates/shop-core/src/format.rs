//! # Amount Formatting
//!
//! Renders amounts as locale-grouped decimal strings. Whole amounts get no
//! decimals, anything with a fractional part gets exactly two. The currency
//! symbol or code is never embedded; callers append it.

use crate::currency::{CurrencyCode, CurrencyInfo};
use crate::error::{ShopError, ShopResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Locales the storefront renders amounts for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "th-TH")]
    ThTh,
    #[serde(rename = "lo-LA")]
    LoLa,
    #[serde(rename = "de-DE")]
    DeDe,
    #[serde(rename = "fr-FR")]
    FrFr,
}

impl Locale {
    /// BCP 47 tag
    pub fn tag(&self) -> &'static str {
        match self {
            Locale::EnUs => "en-US",
            Locale::ThTh => "th-TH",
            Locale::LoLa => "lo-LA",
            Locale::DeDe => "de-DE",
            Locale::FrFr => "fr-FR",
        }
    }

    /// Thousands separator
    pub fn group_separator(&self) -> &'static str {
        match self {
            Locale::EnUs | Locale::ThTh => ",",
            Locale::LoLa | Locale::DeDe => ".",
            Locale::FrFr => "\u{202f}",
        }
    }

    pub fn decimal_separator(&self) -> &'static str {
        match self {
            Locale::EnUs | Locale::ThTh => ".",
            Locale::LoLa | Locale::DeDe | Locale::FrFr => ",",
        }
    }

    /// Parse a tag, falling back to `en-US` for anything unsupported
    pub fn parse_lossy(tag: &str) -> Self {
        tag.parse().unwrap_or_default()
    }
}

impl FromStr for Locale {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('_', "-").to_ascii_lowercase().as_str() {
            "en-us" | "en" => Ok(Locale::EnUs),
            "th-th" | "th" => Ok(Locale::ThTh),
            "lo-la" | "lo" => Ok(Locale::LoLa),
            "de-de" | "de" => Ok(Locale::DeDe),
            "fr-fr" | "fr" => Ok(Locale::FrFr),
            _ => Err(ShopError::UnsupportedLocale {
                locale: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Format an amount with `en-US` conventions
pub fn format_amount(amount: f64) -> String {
    format_amount_in(amount, Locale::EnUs)
}

/// Format an amount for a locale tag.
///
/// Fails with `UnsupportedLocale` for tags without known conventions.
pub fn format_amount_for(amount: f64, locale: &str) -> ShopResult<String> {
    Ok(format_amount_in(amount, locale.parse()?))
}

/// Format an amount with the given locale's separators
pub fn format_amount_in(amount: f64, locale: Locale) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }

    let decimals = if amount.fract() != 0.0 { 2 } else { 0 };
    let rendered = format!("{:.*}", decimals, amount.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rendered.as_str(), None),
    };

    let mut out = String::with_capacity(rendered.len() + rendered.len() / 3 + 1);
    if amount < 0.0 {
        out.push('-');
    }
    out.push_str(&group_digits(int_part, locale.group_separator()));
    if let Some(frac_part) = frac_part {
        out.push_str(locale.decimal_separator());
        out.push_str(frac_part);
    }
    out
}

fn group_digits(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(ch);
    }
    grouped
}

/// Formatter bound to a locale, composing amounts with currency labels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Formatter {
    pub locale: Locale,
}

impl Formatter {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn format(&self, amount: f64) -> String {
        format_amount_in(amount, self.locale)
    }

    /// `"<amount> <code>"`, e.g. "1,250 KIP"
    pub fn format_with_code(&self, amount: f64, code: CurrencyCode) -> String {
        format!("{} {}", self.format(amount), code)
    }

    /// `"<amount> <symbol>"`, e.g. "1,250 ₭"
    pub fn format_with_symbol(&self, amount: f64, info: &CurrencyInfo) -> String {
        format!("{} {}", self.format(amount), info.symbol)
    }
}
