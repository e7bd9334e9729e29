//! # Record Store Trait
//!
//! The storefront talks to its backend-as-a-service through this trait.
//! The backend is a generic record store: collections of JSON records with
//! list/get/create/update/delete and field filters.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              RecordStore (trait)             │
//! │  ├── list() / list_all()                     │
//! │  ├── get() / create() / update() / delete()  │
//! │  └── backend_name()                          │
//! └──────────────────────────────────────────────┘
//!                        ▲
//!            ┌───────────┴───────────┐
//!    ┌───────┴────────┐     ┌────────┴───────┐
//!    │ PocketBaseStore│     │  test doubles  │
//!    └────────────────┘     └────────────────┘
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shop_core::ShopResult;
use std::sync::Arc;

/// A record returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Record ID
    pub id: String,

    /// All other fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder: set a field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Field as a string slice, if it is a string
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }

    /// Field of an expanded relation (`expand.<relation>.<key>`)
    pub fn expanded(&self, relation: &str, key: &str) -> Option<&Value> {
        self.field("expand")
            .and_then(|e| e.get(relation))
            .and_then(|r| r.get(key))
    }

    /// Whole record as a JSON object, including `id`
    pub fn to_value(&self) -> Value {
        let mut map = self.fields.clone();
        map.insert("id".to_string(), Value::String(self.id.clone()));
        Value::Object(map)
    }
}

/// One page of a list call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPage {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub items: Vec<Record>,
}

/// List parameters: paging, equality filters, sort and relation expansion
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    pub filters: Vec<(String, Value)>,
    /// Sort expression (e.g. "-created")
    pub sort: Option<String>,
    /// Relations to expand (e.g. "product")
    pub expand: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 30,
            filters: Vec::new(),
            sort: None,
            expand: None,
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: require `field == value`
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn expand(mut self, expand: impl Into<String>) -> Self {
        self.expand = Some(expand.into());
        self
    }

    pub fn page(mut self, page: u32, per_page: u32) -> Self {
        self.page = page.max(1);
        self.per_page = per_page.max(1);
        self
    }

    /// Filter expression in the backend's syntax: `a = "x" && b = 2`.
    ///
    /// String values are double-quoted with embedded quotes and backslashes
    /// escaped.
    pub fn filter_expression(&self) -> Option<String> {
        if self.filters.is_empty() {
            return None;
        }
        let clauses: Vec<String> = self
            .filters
            .iter()
            .map(|(field, value)| format!("{} = {}", field, filter_literal(value)))
            .collect();
        Some(clauses.join(" && "))
    }

    /// Query-string parameters for a list request
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("perPage", self.per_page.to_string()),
        ];
        if let Some(filter) = self.filter_expression() {
            params.push(("filter", filter));
        }
        if let Some(sort) = &self.sort {
            params.push(("sort", sort.clone()));
        }
        if let Some(expand) = &self.expand {
            params.push(("expand", expand.clone()));
        }
        params
    }
}

fn filter_literal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Core trait for record-store backends.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List one page of records from a collection
    async fn list(&self, collection: &str, query: &ListQuery) -> ShopResult<RecordPage>;

    /// Fetch a single record
    async fn get(&self, collection: &str, id: &str) -> ShopResult<Record>;

    /// Create a record from a JSON object
    async fn create(&self, collection: &str, body: &Value) -> ShopResult<Record>;

    /// Patch fields of an existing record
    async fn update(&self, collection: &str, id: &str, body: &Value) -> ShopResult<Record>;

    /// Delete a record
    async fn delete(&self, collection: &str, id: &str) -> ShopResult<()>;

    /// Backend name (for logging)
    fn backend_name(&self) -> &'static str;

    /// List every matching record, following pages from `query.page`
    async fn list_all(&self, collection: &str, query: &ListQuery) -> ShopResult<Vec<Record>> {
        let mut query = query.clone();
        let mut records = Vec::new();
        loop {
            let page = self.list(collection, &query).await?;
            let done = page.items.is_empty() || page.page >= page.total_pages;
            records.extend(page.items);
            if done {
                return Ok(records);
            }
            query.page = page.page + 1;
        }
    }
}

/// Type alias for a shared record store (dynamic dispatch)
pub type BoxedRecordStore = Arc<dyn RecordStore>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_expression() {
        let query = ListQuery::new()
            .filter("user", "u_1")
            .filter("quantity", 2)
            .filter("active", true);
        assert_eq!(
            query.filter_expression().unwrap(),
            r#"user = "u_1" && quantity = 2 && active = true"#
        );
        assert_eq!(ListQuery::new().filter_expression(), None);
    }

    #[test]
    fn test_filter_escapes_quotes() {
        let query = ListQuery::new().filter("name", r#"say "hi" \o/"#);
        assert_eq!(
            query.filter_expression().unwrap(),
            r#"name = "say \"hi\" \\o/""#
        );
    }

    #[test]
    fn test_params() {
        let params = ListQuery::new()
            .page(2, 50)
            .filter("user", "u_1")
            .sort("-created")
            .expand("product")
            .to_params();
        assert_eq!(
            params,
            vec![
                ("page", "2".to_string()),
                ("perPage", "50".to_string()),
                ("filter", r#"user = "u_1""#.to_string()),
                ("sort", "-created".to_string()),
                ("expand", "product".to_string()),
            ]
        );
    }

    #[test]
    fn test_record_round_trip_shape() {
        let record: Record = serde_json::from_value(json!({
            "id": "r1",
            "price": "$4",
            "expand": { "product": { "name": "Mug" } }
        }))
        .unwrap();

        assert_eq!(record.id, "r1");
        assert_eq!(record.str_field("price"), Some("$4"));
        assert_eq!(record.expanded("product", "name"), Some(&json!("Mug")));
        assert_eq!(record.to_value()["id"], "r1");
    }
}
