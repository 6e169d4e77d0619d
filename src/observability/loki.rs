//! Log shipping to a Loki push endpoint

use reqwest::{Client, Url};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::observability::observer::{Event, Observer, Outcome};

const PUSH_PATH: &str = "loki/api/v1/push";

/// Pushes waiting for the worker before new events are dropped
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Observer that pushes every event to Loki as a JSON log line.
///
/// Events go through a bounded queue drained by a single worker task, so a
/// slow or unavailable Loki never delays the caller. When the queue is full,
/// or no runtime was available to run the worker, events are dropped.
pub struct LokiObserver {
    push_url: Url,
    service: String,
    queue: mpsc::Sender<Value>,
}

impl LokiObserver {
    pub fn new(loki_url: &str, service: impl Into<String>) -> Result<Self> {
        Self::with_capacity(loki_url, service, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(loki_url: &str, service: impl Into<String>, capacity: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create Loki client: {}", e)))?;
        let push_url = push_url(loki_url)?;

        let (queue, pending) = mpsc::channel(capacity.max(1));
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(push_worker(client, push_url.clone(), pending));
            }
            Err(_) => debug!("No runtime available, Loki shipping disabled"),
        }

        Ok(Self {
            push_url,
            service: service.into(),
            queue,
        })
    }

    pub fn push_url(&self) -> &Url {
        &self.push_url
    }

    /// Push API body for a single event
    pub fn payload(&self, event: &Event, timestamp_ns: i64) -> Value {
        let level = match event.outcome {
            Outcome::Success => "info",
            Outcome::Rejected => "warning",
            Outcome::Failure => "error",
        };
        let line = json!({
            "operation": event.operation.as_str(),
            "outcome": event.outcome.as_str(),
            "detail": event.detail,
        });

        json!({
            "streams": [{
                "stream": {
                    "service": self.service,
                    "operation": event.operation.as_str(),
                    "level": level,
                },
                "values": [[timestamp_ns.to_string(), line.to_string()]],
            }]
        })
    }
}

impl Observer for LokiObserver {
    fn record(&self, event: &Event) {
        let timestamp_ns = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        if let Err(e) = self.queue.try_send(self.payload(event, timestamp_ns)) {
            debug!(error = %e, "Loki event dropped");
        }
    }
}

/// Sends queued pushes one at a time until every sender is gone
async fn push_worker(client: Client, push_url: Url, mut pending: mpsc::Receiver<Value>) {
    while let Some(body) = pending.recv().await {
        match client.post(push_url.clone()).json(&body).send().await {
            Ok(response) if !response.status().is_success() => {
                debug!(status = %response.status(), "Loki rejected log push");
            }
            Ok(_) => {}
            Err(e) => debug!(error = %e, "Loki push failed"),
        }
    }
}

/// Accepts either the Loki base URL or the full push URL
fn push_url(loki_url: &str) -> Result<Url> {
    let mut url = Url::parse(loki_url)
        .map_err(|e| AppError::config(format!("Invalid loki_url '{}': {}", loki_url, e)))?;

    if url.path().trim_end_matches('/').ends_with(PUSH_PATH) {
        return Ok(url);
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.join(PUSH_PATH)
        .map_err(|e| AppError::config(format!("Invalid loki_url '{}': {}", loki_url, e)))
}
