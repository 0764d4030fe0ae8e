//! Configuration loading integration tests.
//!
//! Tests the config loading APIs:
//! - from_file() with TOML/YAML/JSON
//! - discover_from() for searching parent directories
//! - Error handling for invalid configs

use gridscan::core::config::GridscanConfig;
use gridscan::{EngineMode, GridscanError};
use std::fs;
use tempfile::TempDir;

/// Test loading config from TOML file.
#[test]
fn test_from_file_toml_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
[ocr]
language = "eng+deu"
engine_mode = "legacy_and_lstm"

[detection]
threshold = 100
lower_bound = 0.05
upper_bound = 0.6

[table]
y_tolerance = 14
"#;

    fs::write(&config_path, toml_content).unwrap();

    let config = GridscanConfig::from_file(&config_path).unwrap();
    assert_eq!(config.ocr.language, "eng+deu");
    assert_eq!(config.ocr.engine_mode, EngineMode::LegacyAndLstm);
    assert_eq!(config.detection.threshold, 100);
    assert_eq!(config.detection.upper_bound, 0.6);
    assert!(config.detection.sharpen, "unset fields keep their defaults");
    assert_eq!(config.table.y_tolerance, 14);
    assert_eq!(config.batch.max_images, 10);
}

/// Test loading config from YAML file.
#[test]
fn test_from_file_yaml_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yaml");

    let yaml_content = r#"
batch:
  max_images: 4
limits:
  max_file_bytes: 2048
server:
  port: 9100
  cors_origins:
    - https://app.example.com
"#;

    fs::write(&config_path, yaml_content).unwrap();

    let config = GridscanConfig::from_file(&config_path).unwrap();
    assert_eq!(config.batch.max_images, 4);
    assert_eq!(config.limits.max_file_bytes, 2048);
    assert_eq!(config.server.port, 9100);
    assert_eq!(config.server.cors_origins, ["https://app.example.com"]);
}

/// Test loading config from JSON file.
#[test]
fn test_from_file_json_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.json");

    fs::write(
        &config_path,
        r#"{"table": {"min_confidence": 40.0}, "artifact_dir": "/tmp/gridscan-test"}"#,
    )
    .unwrap();

    let config = GridscanConfig::from_file(&config_path).unwrap();
    assert_eq!(config.table.min_confidence, 40.0);
    assert_eq!(
        config.resolved_artifact_dir(),
        std::path::PathBuf::from("/tmp/gridscan-test")
    );
}

/// An empty file is a valid configuration.
#[test]
fn test_empty_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("gridscan.toml");
    fs::write(&config_path, "").unwrap();

    assert_eq!(GridscanConfig::from_file(&config_path).unwrap(), GridscanConfig::default());
}

#[test]
fn test_from_file_missing_fails() {
    let result = GridscanConfig::from_file("/nonexistent/gridscan.toml");
    assert!(matches!(result, Err(GridscanError::Validation { .. })));
}

#[test]
fn test_malformed_toml_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("bad.toml");
    fs::write(&config_path, "[ocr\nlanguage = ").unwrap();

    let err = GridscanConfig::from_file(&config_path).unwrap_err();
    assert!(err.to_string().contains("Invalid TOML"));
}

#[test]
fn test_inverted_bounds_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("gridscan.toml");
    fs::write(&config_path, "[detection]\nlower_bound = 0.6\nupper_bound = 0.2\n").unwrap();

    let err = GridscanConfig::from_file(&config_path).unwrap_err();
    assert!(err.to_string().contains("lower_bound"));
}

#[test]
fn test_unknown_language_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("gridscan.yaml");
    fs::write(&config_path, "ocr:\n  language: xx\n").unwrap();

    assert!(GridscanConfig::from_file(&config_path).is_err());
}

#[test]
fn test_discover_walks_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("gridscan.toml"), "[batch]\nmax_images = 2\n").unwrap();

    let nested = temp_dir.path().join("a").join("b");
    fs::create_dir_all(&nested).unwrap();

    let config = GridscanConfig::discover_from(&nested).unwrap().unwrap();
    assert_eq!(config.batch.max_images, 2);
}

#[test]
fn test_discover_propagates_invalid_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("gridscan.toml"), "[batch]\nmax_images = 0\n").unwrap();

    assert!(GridscanConfig::discover_from(temp_dir.path()).is_err());
}
