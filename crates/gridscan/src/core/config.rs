//! Configuration loading and management.
//!
//! This module provides utilities for loading pipeline configuration from various
//! sources (TOML, YAML, JSON) and discovering configuration files in the project hierarchy.

use crate::ocr::languages::{DEFAULT_LANGUAGE, validate_language_code};
use crate::ocr::table::DEFAULT_Y_TOLERANCE;
use crate::ocr::types::EngineMode;
use crate::{GridscanError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the file [`GridscanConfig::discover`] looks for.
pub const CONFIG_FILE_NAME: &str = "gridscan.toml";

/// Main pipeline configuration.
///
/// Every field has a default, so an empty file is a valid configuration.
///
/// # Example
///
/// ```rust
/// use gridscan::core::config::GridscanConfig;
///
/// let config = GridscanConfig::default();
/// assert_eq!(config.ocr.language, "eng");
/// assert_eq!(config.batch.max_images, 10);
///
/// // Load from TOML file
/// // let config = GridscanConfig::from_toml_file("gridscan.toml")?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridscanConfig {
    #[serde(default)]
    pub ocr: OcrConfig,

    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default)]
    pub table: TableConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub server: ServerConfig,

    /// Directory for intermediate rasters (None = `<tmp>/gridscan`)
    #[serde(default)]
    pub artifact_dir: Option<PathBuf>,
}

/// OCR engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Language used when a request does not name one (e.g., "eng", "eng+deu")
    #[serde(default = "default_language")]
    pub language: String,

    /// Tesseract data directory (None = TESSDATA_PREFIX or well-known paths)
    #[serde(default)]
    pub tessdata_path: Option<PathBuf>,

    #[serde(default)]
    pub engine_mode: EngineMode,
}

/// Table classifier configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Binarization threshold applied after sharpening
    #[serde(default = "default_detection_threshold")]
    pub threshold: u8,

    /// Exclusive lower bound of the "on"-pixel ratio band
    #[serde(default = "default_lower_bound")]
    pub lower_bound: f64,

    /// Exclusive upper bound of the "on"-pixel ratio band
    #[serde(default = "default_upper_bound")]
    pub upper_bound: f64,

    #[serde(default = "default_true")]
    pub sharpen: bool,
}

/// Table reconstruction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Vertical distance in pixels from a row's anchor within which tokens share the row
    #[serde(default = "default_y_tolerance")]
    pub y_tolerance: u32,

    /// Tokens below this confidence are dropped before reconstruction
    #[serde(default)]
    pub min_confidence: f64,
}

/// Batch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Larger batches are rejected before any engine session is created
    #[serde(default = "default_max_images")]
    pub max_images: usize,
}

/// Input limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins (empty = any origin)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_true() -> bool {
    true
}
fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}
fn default_detection_threshold() -> u8 {
    120
}
fn default_lower_bound() -> f64 {
    0.10
}
fn default_upper_bound() -> f64 {
    0.50
}
fn default_y_tolerance() -> u32 {
    DEFAULT_Y_TOLERANCE
}
fn default_max_images() -> usize {
    10
}
fn default_max_file_bytes() -> usize {
    10 * 1024 * 1024
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8000
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            tessdata_path: None,
            engine_mode: EngineMode::default(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: default_detection_threshold(),
            lower_bound: default_lower_bound(),
            upper_bound: default_upper_bound(),
            sharpen: true,
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            y_tolerance: default_y_tolerance(),
            min_confidence: 0.0,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_images: default_max_images(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Apply `GRIDSCAN_HOST`, `GRIDSCAN_PORT` and `GRIDSCAN_CORS_ORIGINS` (comma-separated).
    ///
    /// Unparseable values are ignored with a warning.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(host) = std::env::var("GRIDSCAN_HOST")
            && !host.trim().is_empty()
        {
            self.host = host.trim().to_string();
        }

        if let Ok(port) = std::env::var("GRIDSCAN_PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!("Ignoring invalid GRIDSCAN_PORT value: {}", port),
            }
        }

        if let Ok(origins) = std::env::var("GRIDSCAN_CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }
}

impl GridscanConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| GridscanError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_yaml_ng::from_str(&content)
            .map_err(|e| GridscanError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| GridscanError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a file, picking the format from its extension (TOML when unknown).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Discover configuration file in parent directories.
    ///
    /// Searches for `gridscan.toml` in current directory and parent directories.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let current = std::env::current_dir().map_err(GridscanError::Io)?;
        Self::discover_from(&current)
    }

    /// Like [`discover`](Self::discover), starting from `start`.
    pub fn discover_from(start: &Path) -> Result<Option<Self>> {
        for dir in start.ancestors() {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "Discovered configuration file");
                return Ok(Some(Self::from_toml_file(candidate)?));
            }
        }

        Ok(None)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        let d = &self.detection;
        if !(0.0..=1.0).contains(&d.lower_bound) || !(0.0..=1.0).contains(&d.upper_bound) {
            return Err(GridscanError::validation(format!(
                "Detection bounds must lie in [0, 1], got {} and {}",
                d.lower_bound, d.upper_bound
            )));
        }
        if d.lower_bound >= d.upper_bound {
            return Err(GridscanError::validation(format!(
                "Detection lower_bound ({}) must be below upper_bound ({})",
                d.lower_bound, d.upper_bound
            )));
        }
        if self.batch.max_images == 0 {
            return Err(GridscanError::validation("batch.max_images must be at least 1"));
        }
        if self.limits.max_file_bytes == 0 {
            return Err(GridscanError::validation("limits.max_file_bytes must be at least 1"));
        }
        validate_language_code(&self.ocr.language)?;
        Ok(())
    }

    /// Directory for intermediate rasters.
    pub fn resolved_artifact_dir(&self) -> PathBuf {
        self.artifact_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("gridscan"))
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| GridscanError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
