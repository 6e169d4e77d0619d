//! One-shot backend connectivity gate run before the listener binds

use tracing::{error, info, instrument};

use crate::backend::KvBackend;
use crate::observability::{Event, Observer, Operation, Outcome};

/// Result of the startup gate.
///
/// `T` is whatever the caller gets once the gate passes: nothing for the
/// bare check, a bound [`Server`](crate::gateway::Server) for [`start`](crate::gateway::start).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupOutcome<T = ()> {
    /// Backend answered; the server may start listening
    Ready(T),
    /// Backend unreachable; the process must not serve
    Fatal(String),
}

impl<T> StartupOutcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, StartupOutcome::Ready(_))
    }

    /// Process exit status matching this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            StartupOutcome::Ready(_) => 0,
            StartupOutcome::Fatal(_) => 1,
        }
    }
}

/// Probe the backend base URL once.
///
/// Never retries and never exits the process itself; the entry point acts on
/// the returned outcome.
#[instrument(name = "backend.check", skip_all, fields(url = %backend.base_url()))]
pub async fn check_backend(backend: &dyn KvBackend, observer: &dyn Observer) -> StartupOutcome {
    match backend.probe().await {
        Ok(status) => {
            info!(status = status, "Connected successfully to backend API");
            observer.record(&Event::new(Operation::StartupProbe, Outcome::Success));
            StartupOutcome::Ready(())
        }
        Err(e) => {
            let reason = format!("Failed to connect to backend API at {}: {}", backend.base_url(), e);
            error!(error = %e, "Failed to connect to backend API");
            observer.record(
                &Event::new(Operation::StartupProbe, Outcome::Failure).with_detail(reason.clone()),
            );
            StartupOutcome::Fatal(reason)
        }
    }
}
