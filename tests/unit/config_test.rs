//! Unit tests for settings loading

use kv_frontend::config::{LogFormat, Settings};
use std::io::Write;
use tempfile::NamedTempFile;
use tokio_test::{assert_err, assert_ok};

fn config_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_yaml_with_flat_keys() {
    let file = config_file(
        ".yaml",
        "backend_api_url: http://backend:8000/store\n\
         port: 5050\n\
         loki_url: http://loki:3100\n\
         jaeger_host: jaeger\n\
         jaeger_port: 6832\n",
    );

    let settings = Settings::load_from_path(file.path()).unwrap();

    assert_eq!(settings.backend_api_url, "http://backend:8000/store");
    assert_eq!(settings.port, 5050);
    assert_eq!(settings.loki_url.as_deref(), Some("http://loki:3100"));
    assert_eq!(settings.jaeger_host, "jaeger");
    assert_eq!(settings.jaeger_port, 6832);
    assert_ok!(settings.validate());
}

#[test]
fn test_optional_keys_default() {
    let file = config_file(".yaml", "backend_api_url: http://backend:8000\n");

    let settings = Settings::load_from_path(file.path()).unwrap();

    assert_eq!(settings.host, "0.0.0.0");
    assert_eq!(settings.request_timeout_secs, 30);
    assert_eq!(settings.jaeger_port, 4317);
    assert_eq!(settings.logging.format, LogFormat::Json);
}

#[test]
fn test_load_toml() {
    let file = config_file(
        ".toml",
        "backend_api_url = \"https://kv.example.com/v1\"\n\
         request_timeout_secs = 10\n\
         [logging]\n\
         format = \"pretty\"\n",
    );

    let settings = Settings::load_from_path(file.path()).unwrap();

    assert_eq!(settings.request_timeout_secs, 10);
    assert_eq!(settings.logging.format, LogFormat::Pretty);
    assert_eq!(settings.backend_url().unwrap().host_str(), Some("kv.example.com"));
}

#[test]
fn test_missing_backend_url_is_an_error() {
    let file = config_file(".yaml", "port: 5000\n");
    assert_err!(Settings::load_from_path(file.path()));
}

#[test]
fn test_invalid_backend_url_fails_validation() {
    let file = config_file(".yaml", "backend_api_url: not a url\n");
    let settings = Settings::load_from_path(file.path()).unwrap();
    assert_err!(settings.validate());
}

#[test]
fn test_environment_overrides_file() {
    let file = config_file(
        ".yaml",
        "backend_api_url: http://backend:8000\nstartup_timeout_secs: 3\n",
    );
    std::env::set_var("KV_FRONTEND_STARTUP_TIMEOUT_SECS", "7");
    std::env::set_var("KV_FRONTEND_LOGGING__LEVEL", "debug");

    let settings = Settings::load_from_path(file.path());

    std::env::remove_var("KV_FRONTEND_STARTUP_TIMEOUT_SECS");
    std::env::remove_var("KV_FRONTEND_LOGGING__LEVEL");

    let settings = settings.unwrap();
    assert_eq!(settings.startup_timeout_secs, 7);
    assert_eq!(settings.logging.level, "debug");
}
