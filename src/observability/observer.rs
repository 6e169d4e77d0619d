//! Observer interface for best-effort side channels

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::debug;

/// Operation an event is reported for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// One-shot backend probe before the listener binds
    StartupProbe,
    Write,
    Read,
    ReadAll,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::StartupProbe => "startup_probe",
            Operation::Write => "write",
            Operation::Read => "read",
            Operation::ReadAll => "read_all",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The backend answered
    Success,
    /// The backend could not be reached or the probe was refused
    Failure,
    /// The request was turned away before any backend call
    Rejected,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single observation handed to the sinks
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub operation: Operation,
    pub outcome: Outcome,
    pub detail: Option<String>,
}

impl Event {
    pub fn new(operation: Operation, outcome: Outcome) -> Self {
        Self {
            operation,
            outcome,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Receiver of operational events.
///
/// Implementations must not block and must not fail the caller; anything
/// that can go wrong is handled inside `record`.
pub trait Observer: Send + Sync {
    fn record(&self, event: &Event);
}

/// Observer that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn record(&self, _event: &Event) {}
}

/// Fans events out to several sinks, isolating each one
#[derive(Default, Clone)]
pub struct Fanout {
    sinks: Vec<Arc<dyn Observer>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn Observer>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl Observer for Fanout {
    fn record(&self, event: &Event) {
        for sink in &self.sinks {
            // A misbehaving sink must not take the request down with it
            if catch_unwind(AssertUnwindSafe(|| sink.record(event))).is_err() {
                debug!(operation = %event.operation, "Observer panicked, event dropped");
            }
        }
    }
}
