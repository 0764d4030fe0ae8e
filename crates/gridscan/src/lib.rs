//! Gridscan - OCR with Table Structure Recovery
//!
//! Gridscan runs scanned images through an OCR engine with parameters chosen
//! for the content: printed text, handwriting or tabular data. For tables it
//! rebuilds a row/column grid from the word bounding boxes the engine reports.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! # #[cfg(feature = "tesseract")]
//! # async fn example() -> gridscan::Result<()> {
//! use gridscan::{GridscanConfig, ImageInput, OcrPipeline, ProcessingMode, RequestOptions, TesseractBackend};
//! use std::sync::Arc;
//!
//! let pipeline = OcrPipeline::new(Arc::new(TesseractBackend::new(None)), GridscanConfig::default())?;
//! let image = ImageInput::new("invoice.png", std::fs::read("invoice.png")?);
//! let result = pipeline.run(image, &RequestOptions::new(ProcessingMode::Auto)).await?;
//!
//! if let Some(table) = &result.table {
//!     print!("{}", gridscan::export::to_csv(table));
//! } else {
//!     println!("{}", result.text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core Module** (`core`): request orchestration, config loading, upload validation, scratch rasters
//! - **Image** (`image`): preprocessing filters and the table classifier
//! - **OCR** (`ocr`): engine seam, parameter selection, language catalog, table reconstruction
//! - **Export** (`export`): text, CSV, JSON and Markdown renderings of a table
//! - **API** (`api`, feature `api`): axum HTTP boundary
//!
//! # Features
//!
//! - `tesseract`: native Tesseract engine
//! - `api`: HTTP server
//! - `full`: both

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod export;
pub mod image;
pub mod ocr;
pub mod types;

#[cfg(feature = "api")]
pub mod api;

pub use error::{GridscanError, Result};
pub use types::*;

pub use crate::core::config::{
    BatchConfig, DetectionConfig, GridscanConfig, LimitsConfig, OcrConfig, ServerConfig, TableConfig,
};
pub use crate::core::mime::{detect_image_mime, is_image_mime, validate_image_input};
pub use crate::core::pipeline::OcrPipeline;

pub use export::ExportFormat;
pub use crate::image::detection::{BrightnessRatioDetector, TableDetector};

pub use ocr::engine::{EngineOutput, OcrEngine, OcrSession};
pub use ocr::languages::{LanguageInfo, supported_languages, validate_language_code};
pub use ocr::table::{TableReconstructor, reconstruct_table};
pub use ocr::types::{EngineMode, OutputFormat, RecognitionConfig, SegmentationMode};

#[cfg(feature = "tesseract")]
pub use ocr::tesseract_backend::TesseractBackend;
