//! Request handlers for the store routes, index page, and metrics

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::backend::{BackendResponse, StoreEntry};
use crate::error::{AppError, Result};
use crate::observability::{Event, Operation, Outcome};
use crate::AppState;

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

/// GET / - index page
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_index(&state.settings.backend_api_url))
}

/// POST /store - validate and forward a write
#[instrument(name = "store.write", skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn write_entry(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let entry = match parse_entry(&body) {
        Ok(entry) => entry,
        Err(e) => {
            warn!(error = %e, "Rejected write request");
            state.observer.record(
                &Event::new(Operation::Write, Outcome::Rejected).with_detail(e.to_string()),
            );
            return e.into_response();
        }
    };

    forward(&state, Operation::Write, state.backend.write(&entry)).await
}

/// GET /store/:key - forward a single-key read
#[instrument(name = "store.read", skip_all, fields(request_id = %Uuid::new_v4(), key = %key))]
pub async fn read_entry(State(state): State<Arc<AppState>>, Path(key): Path<String>) -> Response {
    forward(&state, Operation::Read, state.backend.read(&key)).await
}

/// GET /store - forward a read of every entry
#[instrument(name = "store.read_all", skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn read_all(State(state): State<Arc<AppState>>) -> Response {
    forward(&state, Operation::ReadAll, state.backend.read_all()).await
}

/// GET /metrics - counter exposition
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(body) => ([(header::CONTENT_TYPE, state.metrics.content_type())], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encode error").into_response()
        }
    }
}

/// Await the single backend call and translate its result for the caller
async fn forward<F>(state: &AppState, operation: Operation, call: F) -> Response
where
    F: Future<Output = Result<BackendResponse>>,
{
    match call.await {
        Ok(response) => {
            info!(operation = %operation, status = response.status, "Backend responded");
            state
                .observer
                .record(&Event::new(operation, Outcome::Success));
            relay(response)
        }
        Err(e) => {
            error!(operation = %operation, error = %e, "Backend call failed");
            state
                .observer
                .record(&Event::new(operation, Outcome::Failure).with_detail(e.to_string()));
            e.into_response()
        }
    }
}

/// Backend status and body, unchanged
fn relay(response: BackendResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = response
        .content_type
        .unwrap_or_else(|| "application/json".to_string());

    (status, [(header::CONTENT_TYPE, content_type)], response.body).into_response()
}

/// Extract `key` and `value` from a write payload.
///
/// A field counts as missing unless it is a non-empty JSON string.
pub fn parse_entry(body: &[u8]) -> Result<StoreEntry> {
    let payload: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::InvalidRequest(format!("body is not valid JSON: {}", e)))?;

    let key = present(&payload, "key")
        .ok_or_else(|| AppError::InvalidRequest("missing key".to_string()))?;
    let value = present(&payload, "value")
        .ok_or_else(|| AppError::InvalidRequest("missing value".to_string()))?;

    Ok(StoreEntry { key, value })
}

fn present(payload: &Value, field: &str) -> Option<String> {
    match payload.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Index page with the backend URL filled in
pub fn render_index(backend_api_url: &str) -> String {
    INDEX_TEMPLATE.replace("{{ backend_api_url }}", &escape_html(backend_api_url))
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
