//! Configuration module - Settings loading and validation

pub mod settings;

pub use settings::{LogFormat, LoggingConfig, Settings};
