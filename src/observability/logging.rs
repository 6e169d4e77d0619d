//! Log subscriber setup

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{AppError, Result};
use crate::observability::traces::TraceExport;

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. When `traces` is
/// given, every span is also handed to its OpenTelemetry tracer.
pub fn init(config: &LoggingConfig, traces: Option<&TraceExport>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| AppError::config(format!("Invalid log level '{}': {}", config.level, e)))?;

    let (json, pretty) = match config.format {
        LogFormat::Json => (Some(fmt::layer().json()), None),
        LogFormat::Pretty => (None, Some(fmt::layer().pretty())),
    };

    let otel = traces.map(|t| tracing_opentelemetry::layer().with_tracer(t.tracer()));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .with(otel)
        .try_init()
        .map_err(|e| AppError::Internal(format!("Failed to install log subscriber: {}", e)))
}
