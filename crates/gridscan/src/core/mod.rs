//! Core orchestration module.
//!
//! This module contains the request orchestrator and the infrastructure it
//! leans on: configuration, upload validation and intermediate raster storage.
//!
//! # Architecture
//!
//! The core module is responsible for:
//! - **Pipeline**: running images through classification, preprocessing, recognition and table reconstruction
//! - **MIME Detection**: accepting only image uploads
//! - **Artifacts**: unique scratch files removed on every exit path
//! - **Configuration**: loading and discovering `gridscan.toml`
//!
//! # Example
//!
//! ```rust,no_run
//! use gridscan::core::config::GridscanConfig;
//! use gridscan::core::pipeline::OcrPipeline;
//! use gridscan::{ImageInput, OcrEngine, RequestOptions};
//! use std::sync::Arc;
//!
//! # async fn example(engine: Arc<dyn OcrEngine>) -> gridscan::Result<()> {
//! let pipeline = OcrPipeline::new(engine, GridscanConfig::default())?;
//! let image = ImageInput::new("scan.png", std::fs::read("scan.png")?);
//! let result = pipeline.run(image, &RequestOptions::default()).await?;
//! println!("Extracted text: {}", result.text);
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod config;
pub mod mime;
pub mod pipeline;

pub use artifacts::{Artifact, ArtifactStore};
pub use config::{BatchConfig, DetectionConfig, GridscanConfig, LimitsConfig, OcrConfig, ServerConfig, TableConfig};
pub use pipeline::OcrPipeline;
