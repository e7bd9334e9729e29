//! # PocketBase Record Store
//!
//! HTTP implementation of `RecordStore` against a PocketBase-style REST API
//! (`/api/collections/{collection}/records`).

use crate::config::BackendConfig;
use crate::store::{ListQuery, Record, RecordPage, RecordStore};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use shop_core::{ShopError, ShopResult};
use tracing::{debug, error, instrument, warn};

/// Record store backed by a PocketBase server
pub struct PocketBaseStore {
    config: BackendConfig,
    client: Client,
}

/// Error body returned by the backend
#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    #[serde(default)]
    message: String,
}

impl PocketBaseStore {
    /// Create a store with its own HTTP client
    pub fn new(config: BackendConfig) -> ShopResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ShopError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> ShopResult<Self> {
        Self::new(BackendConfig::from_env()?)
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.header("Authorization", token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> ShopResult<Response> {
        self.authorize(request)
            .send()
            .await
            .map_err(|e| ShopError::NetworkError(e.to_string()))
    }

    /// Map a non-success response onto `ShopError`
    async fn check(
        response: Response,
        collection: &str,
        id: Option<&str>,
    ) -> ShopResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(ShopError::RecordNotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                });
            }
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(1);
            warn!("Backend rate limited, retry after {}s", retry_after_secs);
            return Err(ShopError::RateLimited { retry_after_secs });
        }

        let body = response.text().await.unwrap_or_default();
        error!("Backend error: status={}, body={}", status, body);

        let message = serde_json::from_str::<BackendErrorBody>(&body)
            .ok()
            .map(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or(body);

        Err(ShopError::Backend {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> ShopResult<T> {
        let body = response
            .text()
            .await
            .map_err(|e| ShopError::NetworkError(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| {
            ShopError::Serialization(format!("Failed to parse backend response: {}", e))
        })
    }
}

#[async_trait]
impl RecordStore for PocketBaseStore {
    #[instrument(skip(self, query), fields(page = query.page))]
    async fn list(&self, collection: &str, query: &ListQuery) -> ShopResult<RecordPage> {
        let url = self.config.records_url(collection);
        let request = self.client.get(&url).query(&query.to_params());
        let response = Self::check(self.send(request).await?, collection, None).await?;
        let page: RecordPage = Self::parse(response).await?;

        debug!(
            "Listed {} records ({} total) from {}",
            page.items.len(),
            page.total_items,
            collection
        );
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn get(&self, collection: &str, id: &str) -> ShopResult<Record> {
        let url = self.config.record_url(collection, id);
        let response = Self::check(self.send(self.client.get(&url)).await?, collection, Some(id)).await?;
        Self::parse(response).await
    }

    #[instrument(skip(self, body))]
    async fn create(&self, collection: &str, body: &Value) -> ShopResult<Record> {
        let url = self.config.records_url(collection);
        let request = self.client.post(&url).json(body);
        let response = Self::check(self.send(request).await?, collection, None).await?;
        let record: Record = Self::parse(response).await?;

        debug!("Created record {}/{}", collection, record.id);
        Ok(record)
    }

    #[instrument(skip(self, body))]
    async fn update(&self, collection: &str, id: &str, body: &Value) -> ShopResult<Record> {
        let url = self.config.record_url(collection, id);
        let request = self.client.patch(&url).json(body);
        let response = Self::check(self.send(request).await?, collection, Some(id)).await?;
        Self::parse(response).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> ShopResult<()> {
        let url = self.config.record_url(collection, id);
        Self::check(self.send(self.client.delete(&url)).await?, collection, Some(id)).await?;
        debug!("Deleted record {}/{}", collection, id);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "pocketbase"
    }
}
