//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/default.yaml";

/// Environment variable naming an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "KV_FRONTEND_CONFIG";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Base URL of the key-value backend API
    pub backend_api_url: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Timeout for the one-shot startup probe
    #[serde(default = "default_startup_timeout")]
    pub startup_timeout_secs: u64,
    /// Timeout for every forwarded request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Loki push endpoint; log shipping is disabled when absent
    #[serde(default)]
    pub loki_url: Option<String>,
    /// Trace collector (Jaeger OTLP gRPC receiver)
    #[serde(default = "default_jaeger_host")]
    pub jaeger_host: String,
    #[serde(default = "default_jaeger_port")]
    pub jaeger_port: u16,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_startup_timeout() -> u64 {
    3
}

fn default_request_timeout() -> u64 {
    30
}

fn default_jaeger_host() -> String {
    "localhost".to_string()
}

fn default_jaeger_port() -> u16 {
    4317
}

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Json
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Settings {
    /// Load settings from the configuration file and environment variables
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_path(path)
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = Config::builder()
            .set_default("host", default_host())?
            .set_default("port", i64::from(default_port()))?
            // Missing file is fine, the environment may carry everything
            .add_source(File::from(path).required(false))
            // Override with environment variables (prefixed with KV_FRONTEND_)
            .add_source(
                Environment::with_prefix("KV_FRONTEND")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.backend_url()?;

        if self.port == 0 {
            return Err(AppError::config("Server port cannot be 0"));
        }

        if self.startup_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(AppError::config("Timeouts must be at least one second"));
        }

        if self.jaeger_host.trim().is_empty() || self.jaeger_port == 0 {
            return Err(AppError::config("jaeger_host and jaeger_port must name a collector"));
        }

        if let Some(loki_url) = &self.loki_url {
            Url::parse(loki_url)
                .map_err(|e| AppError::config(format!("Invalid loki_url '{}': {}", loki_url, e)))?;
        }

        Ok(())
    }

    /// Parsed backend base URL.
    ///
    /// Only absolute `http`/`https` URLs that can carry a key path segment are accepted.
    pub fn backend_url(&self) -> Result<Url> {
        if self.backend_api_url.trim().is_empty() {
            return Err(AppError::config("backend_api_url cannot be empty"));
        }

        let url = Url::parse(&self.backend_api_url).map_err(|e| {
            AppError::config(format!("Invalid backend_api_url '{}': {}", self.backend_api_url, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::config(format!(
                "backend_api_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if url.cannot_be_a_base() {
            return Err(AppError::config("backend_api_url cannot be used as a base URL"));
        }

        Ok(url)
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::config(format!("Invalid bind address: {}", e)))
    }

    /// OTLP endpoint spans are exported to
    pub fn trace_collector_endpoint(&self) -> String {
        format!("http://{}:{}", self.jaeger_host, self.jaeger_port)
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Settings pointing at the given backend with every other key defaulted
    pub fn with_backend(backend_api_url: impl Into<String>) -> Self {
        Self {
            backend_api_url: backend_api_url.into(),
            host: default_host(),
            port: default_port(),
            startup_timeout_secs: default_startup_timeout(),
            request_timeout_secs: default_request_timeout(),
            loki_url: None,
            jaeger_host: default_jaeger_host(),
            jaeger_port: default_jaeger_port(),
            logging: LoggingConfig::default(),
        }
    }
}
