//! Common traits and types for key-value backends

use async_trait::async_trait;
use axum::body::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Key/value pair supplied by a caller on write.
///
/// Uniqueness and ordering rules belong to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEntry {
    pub key: String,
    pub value: String,
}

impl StoreEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Raw answer from the backend, relayed verbatim to the caller
#[derive(Debug, Clone)]
pub struct BackendResponse {
    /// HTTP status code returned by the backend
    pub status: u16,

    /// Content type header, when the backend sent one
    pub content_type: Option<String>,

    /// Body bytes, possibly empty
    pub body: Bytes,
}

/// Trait for the key-value backend the front end relays to
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Base URL every call is made against
    fn base_url(&self) -> &str;

    /// Probe the base URL once; succeeds on any status below 400
    async fn probe(&self) -> Result<u16>;

    /// POST the entry as JSON to the base URL
    async fn write(&self, entry: &StoreEntry) -> Result<BackendResponse>;

    /// GET `<base>/<key>`
    async fn read(&self, key: &str) -> Result<BackendResponse>;

    /// GET the base URL
    async fn read_all(&self) -> Result<BackendResponse>;
}
