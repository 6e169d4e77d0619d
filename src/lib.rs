//! Key-Value Store Front End
//!
//! A thin web front end that relays key-value store requests to a backend
//! API, gated on a one-shot backend connectivity check and reporting logs,
//! counters, and spans about its own traffic.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod gateway;
pub mod observability;

pub use error::{AppError, Result};

use std::sync::Arc;

use crate::backend::KvBackend;
use crate::config::Settings;
use crate::observability::{Metrics, Observer};

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<Settings>,
    pub backend: Arc<dyn KvBackend>,
    pub metrics: Arc<Metrics>,
    pub observer: Arc<dyn Observer>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        backend: Arc<dyn KvBackend>,
        metrics: Arc<Metrics>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            backend,
            metrics,
            observer,
        }
    }
}
