//! Observability module - Logging, metrics, log shipping, and span export

pub mod logging;
pub mod loki;
pub mod metrics;
pub mod observer;
pub mod traces;

pub use loki::LokiObserver;
pub use metrics::Metrics;
pub use observer::{Event, Fanout, NoopObserver, Observer, Operation, Outcome};
pub use traces::TraceExport;

use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::error::Result;

/// Service name attached to shipped logs
pub const SERVICE_NAME: &str = env!("CARGO_PKG_NAME");

/// Build the observer chain described by the settings.
///
/// Metrics are always recorded; Loki shipping is added when `loki_url` is set.
pub fn build_observer(settings: &Settings, metrics: Arc<Metrics>) -> Result<Arc<dyn Observer>> {
    let mut fanout = Fanout::new().with(metrics);

    if let Some(loki_url) = &settings.loki_url {
        let loki = LokiObserver::new(loki_url, SERVICE_NAME)?;
        info!(push_url = %loki.push_url(), "Shipping logs to Loki");
        fanout = fanout.with(Arc::new(loki));
    }

    Ok(Arc::new(fanout))
}
