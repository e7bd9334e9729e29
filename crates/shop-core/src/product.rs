//! # Product Catalog
//!
//! Product listing types and in-memory search for the storefront.
//! Products come from the backend's product collection or from
//! `config/products.toml`.

use crate::error::ShopError;
use crate::price::PriceInput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Category slug (e.g. "tea", "ceramics")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Price as stored by the backend (number or text)
    #[serde(default)]
    pub price: PriceInput,

    /// Whether this product is listed
    #[serde(default = "default_true")]
    pub active: bool,

    /// Optional image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Creation time, used by the "newest" sort
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: impl Into<PriceInput>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: None,
            price: price.into(),
            active: true,
            image_url: None,
            created: None,
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Builder: set category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Builder: set creation time
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// Base-currency price after lenient extraction
    pub fn base_price(&self) -> f64 {
        self.price.amount()
    }

    fn matches_text(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.description.to_lowercase().contains(needle)
    }

    fn in_category(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(category))
    }
}

/// Sort order for product listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    /// Catalog order
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
    /// Most recently created first; undated products last
    Newest,
}

impl std::str::FromStr for ProductSort {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "featured" => Ok(ProductSort::Featured),
            "price_asc" => Ok(ProductSort::PriceAsc),
            "price_desc" => Ok(ProductSort::PriceDesc),
            "name_asc" => Ok(ProductSort::NameAsc),
            "name_desc" => Ok(ProductSort::NameDesc),
            "newest" => Ok(ProductSort::Newest),
            _ => Err(ShopError::InvalidRequest(format!("unknown sort order: {s}"))),
        }
    }
}

/// Search, filter and sort parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Case-insensitive substring matched against name and description
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Inclusive lower bound on base price
    #[serde(default)]
    pub min_price: Option<f64>,
    /// Inclusive upper bound on base price
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub sort: ProductSort,
}

impl ProductQuery {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn sort(mut self, sort: ProductSort) -> Self {
        self.sort = sort;
        self
    }

    fn accepts(&self, product: &Product, needle: Option<&str>) -> bool {
        if !product.active {
            return false;
        }
        if let Some(needle) = needle {
            if !product.matches_text(needle) {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref() {
            if !product.in_category(category) {
                return false;
            }
        }
        let price = product.base_price();
        self.min_price.map_or(true, |min| price >= min) && self.max_price.map_or(true, |max| price <= max)
    }
}

/// Product catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    #[serde(default)]
    pub products: Vec<Product>,
}

impl ProductCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
        }
    }

    /// Add a product to the catalog
    pub fn add(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Find a product by ID
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Get all active products
    pub fn active_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.active)
    }

    /// Distinct categories of active products, in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for category in self.active_products().filter_map(|p| p.category.as_deref()) {
            if !seen.iter().any(|c| c.eq_ignore_ascii_case(category)) {
                seen.push(category);
            }
        }
        seen
    }

    /// Filter and sort active products
    pub fn search(&self, query: &ProductQuery) -> Vec<&Product> {
        let needle = query
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        let mut results: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| query.accepts(p, needle.as_deref()))
            .collect();

        sort_products(&mut results, query.sort);
        results
    }

    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

/// Stable in-place sort of a product listing
pub fn sort_products(products: &mut [&Product], sort: ProductSort) {
    match sort {
        ProductSort::Featured => {}
        ProductSort::PriceAsc => products.sort_by(|a, b| cmp_price(a, b)),
        ProductSort::PriceDesc => products.sort_by(|a, b| cmp_price(b, a)),
        ProductSort::NameAsc => products.sort_by(|a, b| cmp_name(a, b)),
        ProductSort::NameDesc => products.sort_by(|a, b| cmp_name(b, a)),
        ProductSort::Newest => products.sort_by(|a, b| b.created.cmp(&a.created)),
    }
}

fn cmp_price(a: &Product, b: &Product) -> Ordering {
    a.base_price().total_cmp(&b.base_price())
}

fn cmp_name(a: &Product, b: &Product) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn catalog() -> ProductCatalog {
        let mut catalog = ProductCatalog::new();
        catalog.add(
            Product::new("jasmine", "Jasmine Green Tea", "$12.50")
                .with_category("tea")
                .with_description("Fragrant loose-leaf green tea")
                .with_created(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
        );
        catalog.add(
            Product::new("teapot", "Celadon Teapot", 48.0)
                .with_category("ceramics")
                .with_created(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
        );
        catalog.add(Product::new("oolong", "Oolong", 18.0).with_category("Tea"));
        let mut hidden = Product::new("retired", "Retired Tea Sampler", 5.0).with_category("tea");
        hidden.active = false;
        catalog.add(hidden);
        catalog
    }

    #[test]
    fn test_text_search_is_case_insensitive() {
        let catalog = catalog();
        let results = catalog.search(&ProductQuery::default().text("TEA"));
        let ids: Vec<_> = results.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["jasmine", "teapot"]);
    }

    #[test]
    fn test_description_matches() {
        let catalog = catalog();
        let results = catalog.search(&ProductQuery::default().text("loose-leaf"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "jasmine");
    }

    #[test]
    fn test_category_and_price_filters() {
        let catalog = catalog();
        let results = catalog.search(
            &ProductQuery::default()
                .category("tea")
                .price_range(Some(12.5), Some(18.0))
                .sort(ProductSort::PriceDesc),
        );
        let ids: Vec<_> = results.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["oolong", "jasmine"]);
    }

    #[test]
    fn test_inactive_products_hidden() {
        let catalog = catalog();
        assert!(catalog.search(&ProductQuery::default()).iter().all(|p| p.active));
        assert_eq!(catalog.active_products().count(), 3);
        assert!(catalog.get("retired").is_some());
    }

    #[test]
    fn test_sorting() {
        let catalog = catalog();
        let by_name: Vec<_> = catalog
            .search(&ProductQuery::default().sort(ProductSort::NameAsc))
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(by_name, vec!["teapot", "jasmine", "oolong"]);

        let newest: Vec<_> = catalog
            .search(&ProductQuery::default().sort(ProductSort::Newest))
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(newest, vec!["teapot", "jasmine", "oolong"]);

        let cheapest = catalog.search(&ProductQuery::default().sort(ProductSort::PriceAsc));
        assert_eq!(cheapest[0].id, "jasmine");
    }

    #[test]
    fn test_categories() {
        assert_eq!(catalog().categories(), vec!["tea", "ceramics"]);
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("price-asc".parse::<ProductSort>().unwrap(), ProductSort::PriceAsc);
        assert_eq!("NEWEST".parse::<ProductSort>().unwrap(), ProductSort::Newest);
        let err = "cheapest".parse::<ProductSort>().unwrap_err();
        assert!(matches!(err, ShopError::InvalidRequest(ref msg) if msg.contains("cheapest")));
    }

    #[test]
    fn test_from_toml() {
        let catalog = ProductCatalog::from_toml(
            r#"
            [[products]]
            id = "matcha"
            name = "Ceremonial Matcha"
            price = "$32.00"
            category = "tea"

            [[products]]
            id = "whisk"
            name = "Bamboo Whisk"
            price = 14
            "#,
        )
        .unwrap();
        assert_eq!(catalog.products.len(), 2);
        assert_eq!(catalog.get("matcha").unwrap().base_price(), 32.0);
        assert_eq!(catalog.get("whisk").unwrap().base_price(), 14.0);
        assert!(catalog.get("whisk").unwrap().active);
    }
}
