//! Common error types for the key-value front end

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message returned to callers for any failure on the backend side
pub const BACKEND_ERROR_MESSAGE: &str = "Backend error";

/// Message returned to callers when a write payload is incomplete
pub const MISSING_FIELDS_MESSAGE: &str = "Missing key or value";

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a configuration validation failure
    pub fn config(message: impl Into<String>) -> Self {
        AppError::Config(config::ConfigError::Message(message.into()))
    }

    /// Status code and fixed message exposed to the caller.
    ///
    /// The underlying error detail is only ever written to the logs.
    pub fn public_parts(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, MISSING_FIELDS_MESSAGE),
            AppError::HttpClient(_) | AppError::BackendError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, BACKEND_ERROR_MESSAGE)
            }
            AppError::Config(_) | AppError::Io(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            }
        }
    }
}

/// Error body returned to callers
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.public_parts();
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
