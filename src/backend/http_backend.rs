//! HTTP backend client implementation

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

use crate::backend::traits::{BackendResponse, KvBackend, StoreEntry};
use crate::config::Settings;
use crate::error::{AppError, Result};

/// Key-value backend reached over HTTP
pub struct HttpKvBackend {
    base_url: Url,
    client: Client,
    probe_timeout: Duration,
}

impl HttpKvBackend {
    /// Create a new HTTP backend.
    ///
    /// `request_timeout` bounds every forwarded call, `probe_timeout` only the startup probe.
    pub fn new(base_url: Url, request_timeout: Duration, probe_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            client,
            probe_timeout,
        })
    }

    /// Create a backend client from validated settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.backend_url()?,
            settings.request_timeout(),
            settings.startup_timeout(),
        )
    }

    /// URL of a single key, with the key percent-encoded as one path segment
    fn key_url(&self, key: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Internal(format!("'{}' cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push(key);
        Ok(url)
    }

    async fn relay(response: reqwest::Response) -> Result<BackendResponse> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        Ok(BackendResponse {
            status,
            content_type,
            body,
        })
    }
}

#[async_trait]
impl KvBackend for HttpKvBackend {
    fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    async fn probe(&self) -> Result<u16> {
        let response = self
            .client
            .get(self.base_url.clone())
            .timeout(self.probe_timeout)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(AppError::BackendError(format!("Backend returned {}", status)));
        }

        debug!(url = %self.base_url, status = %status, "Probe succeeded");
        Ok(status.as_u16())
    }

    async fn write(&self, entry: &StoreEntry) -> Result<BackendResponse> {
        debug!(url = %self.base_url, "Forwarding write");
        let response = self
            .client
            .post(self.base_url.clone())
            .json(entry)
            .send()
            .await?;
        Self::relay(response).await
    }

    async fn read(&self, key: &str) -> Result<BackendResponse> {
        let url = self.key_url(key)?;
        debug!(url = %url, "Forwarding read");
        let response = self.client.get(url).send().await?;
        Self::relay(response).await
    }

    async fn read_all(&self) -> Result<BackendResponse> {
        debug!(url = %self.base_url, "Forwarding read-all");
        let response = self.client.get(self.base_url.clone()).send().await?;
        Self::relay(response).await
    }
}
