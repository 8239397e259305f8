//! REST client for the hosted backend.
//!
//! Speaks the backend's PostgREST-style interface: tables are addressed as
//! `/rest/v1/{table}` with filter/order query parameters, and writes ask for
//! the inserted representation back. Catalog reads are cached for 5 minutes;
//! order operations always hit the backend.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use kurohana_core::{DeviceId, NewOrder, Order, OrderId, OrderStatus};

use crate::backend::BackendError;
use crate::backend::types::{OrderRow, ProductRow};
use crate::config::BackendConfig;

/// How long catalog reads stay cached.
const CATALOG_TTL: Duration = Duration::from_secs(300);

/// Network timeout on every backend call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const PRODUCTS_CACHE_KEY: &str = "products";

/// Client for the hosted backend's REST interface.
///
/// Cheaply cloneable; the HTTP connection pool and catalog cache are shared.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    rest_base: String,
    api_key: String,
    catalog_cache: Cache<&'static str, Arc<Vec<ProductRow>>>,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let catalog_cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(CATALOG_TTL)
            .build();

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let rest_base = format!("{}/rest/v1", config.url.as_str().trim_end_matches('/'));

        Self {
            inner: Arc::new(BackendClientInner {
                client,
                rest_base,
                api_key: config.anon_key.expose_secret().to_string(),
                catalog_cache,
            }),
        }
    }

    /// Execute a GET against a table path and parse the JSON response.
    async fn fetch<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, BackendError> {
        let url = format!("{}/{path_and_query}", self.inner.rest_base);
        let response = self
            .inner
            .client
            .get(&url)
            .header("apikey", &self.inner.api_key)
            .bearer_auth(&self.inner.api_key)
            .send()
            .await?;

        Self::parse(response).await
    }

    /// Parse a response, folding non-success statuses into [`BackendError::Api`].
    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// The full product list, cached for [`CATALOG_TTL`].
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the backend cannot be reached on a cache
    /// miss.
    #[instrument(skip(self))]
    pub async fn catalog(&self) -> Result<Arc<Vec<ProductRow>>, BackendError> {
        if let Some(cached) = self.inner.catalog_cache.get(PRODUCTS_CACHE_KEY).await {
            debug!("catalog cache hit");
            return Ok(cached);
        }

        let rows: Vec<ProductRow> = self.fetch("products?select=*&order=created_at.asc").await?;
        let rows = Arc::new(rows);
        self.inner
            .catalog_cache
            .insert(PRODUCTS_CACHE_KEY, rows.clone())
            .await;
        Ok(rows)
    }

    /// Look up one catalog product by id.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the catalog cannot be read; a missing id
    /// is `Ok(None)`.
    pub async fn catalog_product(&self, id: &str) -> Result<Option<ProductRow>, BackendError> {
        let rows = self.catalog().await?;
        Ok(rows.iter().find(|p| p.id == id).cloned())
    }

    /// Persist a new order and return the stored representation.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network failure or backend rejection.
    #[instrument(skip(self, order), fields(device = %order.device_id))]
    pub async fn insert_order(&self, order: &NewOrder) -> Result<Order, BackendError> {
        let url = format!("{}/orders", self.inner.rest_base);
        let response = self
            .inner
            .client
            .post(&url)
            .header("apikey", &self.inner.api_key)
            .bearer_auth(&self.inner.api_key)
            .header("Prefer", "return=representation")
            .json(&[order])
            .send()
            .await?;

        let rows: Vec<OrderRow> = Self::parse(response).await?;
        rows.into_iter()
            .next()
            .map(Order::from)
            .ok_or(BackendError::EmptyResponse)
    }

    /// Orders placed from one device, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the backend cannot be reached.
    #[instrument(skip(self))]
    pub async fn orders_by_device(&self, device: &DeviceId) -> Result<Vec<Order>, BackendError> {
        let rows: Vec<OrderRow> = self
            .fetch(&format!(
                "orders?select=*&device_id=eq.{device}&order=created_at.desc"
            ))
            .await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the backend cannot be reached.
    #[instrument(skip(self))]
    pub async fn list_all_orders(&self) -> Result<Vec<Order>, BackendError> {
        let rows: Vec<OrderRow> = self.fetch("orders?select=*&order=created_at.desc").await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Update one order's status and return the stored representation.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network failure or backend rejection.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, BackendError> {
        let url = format!("{}/orders?id=eq.{id}", self.inner.rest_base);
        let response = self
            .inner
            .client
            .patch(&url)
            .header("apikey", &self.inner.api_key)
            .bearer_auth(&self.inner.api_key)
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "status": status.as_str() }))
            .send()
            .await?;

        let rows: Vec<OrderRow> = Self::parse(response).await?;
        rows.into_iter()
            .next()
            .map(Order::from)
            .ok_or(BackendError::EmptyResponse)
    }
}
