//! Hosted backend client (REST CRUD + object storage).
//!
//! The backend is an opaque external platform: a PostgREST-style CRUD API
//! under `/rest/v1/<table>` and an object store under
//! `/storage/v1/object/<bucket>/<path>`. The core issues exactly one insert
//! (order submission) and one upload (payment proof); both are behind
//! traits so checkout can be tested against fakes.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::checkout::Order;
use crate::config::BackendConfig;

/// Request timeout applied to every backend call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// External object storage: upload a file, get back a public URL.
pub trait ObjectStorage {
    /// Upload `bytes` to `bucket` at `path` and return the public URL.
    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<String, BackendError>>;
}

/// External order table: one insert per submission.
pub trait OrderApi {
    /// Insert a composed order and return the created row.
    fn insert_order(&self, order: &Order) -> impl Future<Output = Result<Order, BackendError>>;
}

/// Client for the hosted backend's REST and storage endpoints.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
    orders_table: String,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();

        let key = config.anon_key.expose_secret();
        headers.insert(
            "apikey",
            HeaderValue::from_str(key)
                .map_err(|e| BackendError::Parse(format!("invalid API key format: {e}")))?,
        );
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| BackendError::Parse(format!("invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            orders_table: config.orders_table.clone(),
        })
    }
}

/// Public download URL for an object in a public bucket.
fn public_object_url(base_url: &str, bucket: &str, path: &str) -> String {
    format!("{base_url}/storage/v1/object/public/{bucket}/{path}")
}

impl ObjectStorage for BackendClient {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError> {
        let url = format!("{}/storage/v1/object/{bucket}/{path}", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!(bucket, path, "uploaded object");
        Ok(public_object_url(&self.base_url, bucket, path))
    }
}

impl OrderApi for BackendClient {
    #[instrument(skip(self, order), fields(order_number = %order.order_number))]
    async fn insert_order(&self, order: &Order) -> Result<Order, BackendError> {
        let url = format!("{}/rest/v1/{}", self.base_url, self.orders_table);

        let response = self
            .client
            .post(&url)
            // Ask the backend to echo the created row back
            .header("Prefer", "return=representation")
            .json(&[order])
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let mut created: Vec<Order> = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        created
            .pop()
            .ok_or_else(|| BackendError::Parse("insert returned no rows".to_string()))
    }
}
