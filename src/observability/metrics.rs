//! Prometheus counters for probes and forwarded requests

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::{AppError, Result};
use crate::observability::observer::{Event, Observer, Operation, Outcome};

/// Counters owned by one server instance.
///
/// Each instance carries its own registry so several servers (or tests) can
/// live in one process without clashing on metric names.
pub struct Metrics {
    registry: Registry,
    backend_checks: IntCounterVec,
    requests: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let backend_checks = IntCounterVec::new(
            Opts::new(
                "kv_frontend_backend_checks_total",
                "Startup connectivity checks against the backend API",
            ),
            &["outcome"],
        )
        .map_err(metrics_error)?;

        let requests = IntCounterVec::new(
            Opts::new(
                "kv_frontend_requests_total",
                "Store requests handled, by operation and outcome",
            ),
            &["operation", "outcome"],
        )
        .map_err(metrics_error)?;

        registry
            .register(Box::new(backend_checks.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(requests.clone()))
            .map_err(metrics_error)?;

        Ok(Self {
            registry,
            backend_checks,
            requests,
        })
    }

    /// Content type of [`Metrics::render`] output
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Render all counters in the Prometheus text exposition format
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(metrics_error)?;
        String::from_utf8(buffer).map_err(|e| AppError::Internal(format!("metrics not utf-8: {}", e)))
    }

    pub fn backend_checks(&self, outcome: Outcome) -> u64 {
        self.backend_checks.with_label_values(&[outcome.as_str()]).get()
    }

    pub fn requests(&self, operation: Operation, outcome: Outcome) -> u64 {
        self.requests
            .with_label_values(&[operation.as_str(), outcome.as_str()])
            .get()
    }
}

impl Observer for Metrics {
    fn record(&self, event: &Event) {
        match event.operation {
            Operation::StartupProbe => self
                .backend_checks
                .with_label_values(&[event.outcome.as_str()])
                .inc(),
            op => self
                .requests
                .with_label_values(&[op.as_str(), event.outcome.as_str()])
                .inc(),
        }
    }
}

fn metrics_error(e: prometheus::Error) -> AppError {
    AppError::Internal(format!("metrics error: {}", e))
}
