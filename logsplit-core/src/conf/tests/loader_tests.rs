use crate::conf::{ConfigError, load_config, parse_config};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn empty_file_yields_defaults() {
    let cfg = parse_config(Path::new("empty.toml"), "").unwrap();

    assert_eq!(cfg.server.redis_url, "redis://127.0.0.1:6379/");
    assert_eq!(cfg.server.block_ms, 1000);
    assert_eq!(cfg.trigger.window, 1);
    assert!(cfg.trigger.trimmed);
    assert!(cfg.trigger.dedupe);
    assert_eq!(cfg.trigger.max_stream_len, 2_000_000);
    assert_eq!(cfg.trigger.dedupe_ttl_ms, 86_400_000);
    assert!(cfg.options().is_none());
}

#[test]
fn loads_all_sections_from_disk() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("logsplit.toml");
    fs::write(
        &path,
        r#"
[server]
redis_url = "redis://cache:6380/"
control_key = "stream_splitter"

[trigger]
window = 10
dedupe = false
dedupe_ttl_ms = 60000

[options]
stream_name = "ingest"
retries = 3
"#,
    )
    .unwrap();

    // Act
    let cfg = load_config(&path).unwrap();

    // Assert
    assert_eq!(cfg.server.redis_url, "redis://cache:6380/");
    assert_eq!(cfg.server.control_key.as_deref(), Some("stream_splitter"));
    assert_eq!(cfg.trigger.window, 10);
    assert!(!cfg.trigger.dedupe);
    assert_eq!(cfg.trigger.dedupe_ttl_ms, 60_000);
    assert_eq!(cfg.options["stream_name"], json!("ingest"));
    assert_eq!(cfg.options["retries"], json!(3));
}

#[test]
fn options_keep_their_toml_types() {
    let cfg = parse_config(Path::new("t.toml"), "[options]\nstream_name = 5\n").unwrap();

    assert_eq!(cfg.options["stream_name"], json!(5));
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempdir().unwrap();

    let err = load_config(&dir.path().join("absent.toml")).unwrap_err();

    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn unknown_settings_are_rejected() {
    let err = parse_config(Path::new("t.toml"), "[trigger]\nwindo = 2\n").unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn zero_window_is_invalid() {
    let err = parse_config(Path::new("t.toml"), "[trigger]\nwindow = 0\n").unwrap_err();

    assert!(matches!(
        err,
        ConfigError::Invalid {
            name: "trigger.window",
            ..
        }
    ));
}
