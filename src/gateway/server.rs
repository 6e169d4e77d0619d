//! Server startup: health gate, listener binding, and serving

use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::api;
use crate::error::Result;
use crate::gateway::health_check::{check_backend, StartupOutcome};
use crate::AppState;

/// A bound, not yet serving, HTTP server
pub struct Server {
    listener: TcpListener,
    router: Router,
}

impl Server {
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the shutdown future resolves
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(addr = %self.local_addr()?, "Server listening");
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

/// Run the backend gate, then bind the configured address.
///
/// The listener is only bound once the gate reports ready.
pub async fn start(state: Arc<AppState>) -> Result<StartupOutcome<Server>> {
    let outcome = check_backend(state.backend.as_ref(), state.observer.as_ref()).await;
    if let StartupOutcome::Fatal(reason) = outcome {
        return Ok(StartupOutcome::Fatal(reason));
    }

    let addr = state.settings.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;
    let router = api::routes::create_router(state);

    Ok(StartupOutcome::Ready(Server { listener, router }))
}
