//! Configuration loading tests
//!
//! File and environment layering for the tool configuration.

use std::fs;
use std::path::PathBuf;

use dirsync_cli::{AppConfig, CliError, ConfigManager};
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_file_values_are_loaded() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
credential_file = "/etc/dirsync/key.json"
subject = "admin@example.com"
concurrency = 4
signature_folder = "/srv/signatures"

[http]
timeout_secs = 60
retry_count = 5

[api]
directory_url = "http://127.0.0.1:8080/admin/directory/v1"
"#,
    );

    let config = ConfigManager::with_path(&path)
        .with_env_prefix("DIRSYNC_TEST_FILE")
        .load()
        .unwrap();

    assert_eq!(config.credential_file, PathBuf::from("/etc/dirsync/key.json"));
    assert_eq!(config.subject, "admin@example.com");
    assert_eq!(config.concurrency, 4);
    assert_eq!(config.signature_folder, Some(PathBuf::from("/srv/signatures")));
    assert_eq!(config.http.timeout_secs, 60);
    assert_eq!(config.http.retry_count, 5);
    assert_eq!(config.http.retry_delay_ms, 500);
    assert_eq!(config.api.directory_url, "http://127.0.0.1:8080/admin/directory/v1");
    assert_eq!(config.api.gmail_url, AppConfig::default().api.gmail_url);
    assert!(config.validate().is_ok());
}

#[test]
fn test_environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "credential_file = \"/etc/dirsync/key.json\"\nsubject = \"admin@example.com\"\n",
    );

    std::env::set_var("DIRSYNC_TEST_ENV_SUBJECT", "other-admin@example.com");
    std::env::set_var("DIRSYNC_TEST_ENV_HTTP__RETRY_COUNT", "7");

    let config = ConfigManager::with_path(&path)
        .with_env_prefix("DIRSYNC_TEST_ENV")
        .load()
        .unwrap();

    std::env::remove_var("DIRSYNC_TEST_ENV_SUBJECT");
    std::env::remove_var("DIRSYNC_TEST_ENV_HTTP__RETRY_COUNT");

    assert_eq!(config.subject, "other-admin@example.com");
    assert_eq!(config.http.retry_count, 7);
    assert_eq!(config.credential_file, PathBuf::from("/etc/dirsync/key.json"));
}

#[test]
fn test_explicit_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    let result = ConfigManager::with_path(dir.path().join("absent.toml"))
        .with_env_prefix("DIRSYNC_TEST_MISSING")
        .load();
    assert!(matches!(result, Err(CliError::Config(_))));
}

#[test]
fn test_defaults_without_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");

    let config = ConfigManager::with_path(&path)
        .with_env_prefix("DIRSYNC_TEST_EMPTY")
        .load()
        .unwrap();

    assert_eq!(config, AppConfig::default());
    assert!(matches!(config.validate(), Err(CliError::Config(_))));
}

#[test]
fn test_malformed_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "concurrency = \"many\"\n");

    let result = ConfigManager::with_path(&path)
        .with_env_prefix("DIRSYNC_TEST_BAD")
        .load();
    assert!(matches!(result, Err(CliError::Config(_))));
}

#[test]
fn test_default_path_location() {
    let path = ConfigManager::default_config_path();
    assert!(path.ends_with("dirsync/config.toml"));
}
