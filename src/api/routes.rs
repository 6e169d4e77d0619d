//! Router construction

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::handlers;
use crate::AppState;

/// Build the HTTP surface around shared application state
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/store", get(handlers::read_all).post(handlers::write_entry))
        .route("/store/:key", get(handlers::read_entry))
        .route("/metrics", get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
