//! Main entry point for the key-value store front end

use kv_frontend::{
    backend::{HttpKvBackend, KvBackend},
    config::Settings,
    gateway::{self, StartupOutcome},
    observability::{self, Metrics, TraceExport},
    AppState,
};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::load()?;
    settings.validate()?;

    let traces = TraceExport::install(&settings)?;
    observability::logging::init(&settings.logging, Some(&traces))?;

    info!("Starting key-value store front end");
    info!(
        backend_api_url = %settings.backend_api_url,
        host = %settings.host,
        port = settings.port,
        "Loaded configuration"
    );
    info!(endpoint = %settings.trace_collector_endpoint(), "Exporting spans to trace collector");

    let metrics = Arc::new(Metrics::new()?);
    let observer = observability::build_observer(&settings, metrics.clone())?;
    let backend: Arc<dyn KvBackend> = Arc::new(HttpKvBackend::from_settings(&settings)?);

    let state = Arc::new(AppState::new(settings, backend, metrics, observer));

    let outcome = gateway::start(state).await?;
    let exit_code = outcome.exit_code();
    let server = match outcome {
        StartupOutcome::Ready(server) => server,
        StartupOutcome::Fatal(reason) => {
            error!(reason = %reason, "Backend unreachable, refusing to start");
            std::process::exit(exit_code);
        }
    };

    server.serve(shutdown_signal()).await?;

    info!("Server stopped");
    traces.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C"),
        () = terminate => info!("Received SIGTERM"),
    }
}
