//! Span export to the trace collector over OTLP

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{Tracer, TracerProvider};
use opentelemetry_sdk::{runtime, Resource};
use std::time::Duration;
use tracing::debug;

use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::observability::SERVICE_NAME;

/// Owns the tracer provider for the life of the process.
///
/// Spans are batched on a background task; a missing collector only costs
/// dropped batches, never a failed request.
pub struct TraceExport {
    provider: TracerProvider,
}

impl TraceExport {
    /// Build a batching OTLP gRPC exporter aimed at the configured collector.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn install(settings: &Settings) -> Result<Self> {
        let endpoint = settings.trace_collector_endpoint();
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .with_timeout(Duration::from_secs(3))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build span exporter: {}", e)))?;

        let provider = TracerProvider::builder()
            .with_batch_exporter(exporter, runtime::Tokio)
            .with_resource(Resource::new(vec![KeyValue::new(
                "service.name",
                SERVICE_NAME,
            )]))
            .build();

        Ok(Self::from_provider(provider))
    }

    /// Wrap an already configured provider
    pub fn from_provider(provider: TracerProvider) -> Self {
        Self { provider }
    }

    pub fn tracer(&self) -> Tracer {
        self.provider.tracer(SERVICE_NAME)
    }

    /// Flush pending spans; export errors are logged and swallowed
    pub fn shutdown(&self) {
        if let Err(e) = self.provider.shutdown() {
            debug!(error = %e, "Span exporter shutdown failed");
        }
    }
}
