//! OCR engine seam.
//!
//! The pipeline never talks to a recognizer directly. It opens an
//! [`OcrSession`] from an [`OcrEngine`] for the request language, runs one
//! recognition per image through it, and drops it when the request (or the
//! whole batch) is done. Dropping the session releases the engine handle on
//! both success and failure paths.
//!
//! Engines are synchronous: the pipeline calls them from
//! `tokio::task::spawn_blocking`.

use std::path::Path;

use super::types::RecognitionConfig;
use crate::Result;
use crate::types::Token;

/// Everything a single recognition call produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineOutput {
    pub text: String,
    /// Mean word confidence in `0..=100`.
    pub confidence: f64,
    /// Present when the config requested hOCR or character boxes.
    pub hocr: Option<String>,
    /// Present when the config requested the token table.
    pub tokens: Option<Vec<Token>>,
}

/// Factory for recognition sessions.
pub trait OcrEngine: Send + Sync {
    /// Engine name used in logs.
    fn name(&self) -> &str;

    /// Engine version string.
    fn version(&self) -> String {
        String::from("unknown")
    }

    /// Load `language` and return a ready session.
    ///
    /// Failing here is an engine failure: it aborts the current image, or the
    /// whole batch when the session would have been shared.
    fn open_session(&self, language: &str) -> Result<Box<dyn OcrSession>>;
}

/// A loaded engine bound to one language profile.
///
/// The session is released when dropped.
pub trait OcrSession {
    fn language(&self) -> &str;

    /// Recognize the raster stored at `image_path`.
    fn recognize(&mut self, image_path: &Path, config: &RecognitionConfig) -> Result<EngineOutput>;
}

/// Mean of per-word confidences, clamped to `0..=100`.
///
/// Negative values are the engine's marker for non-word boxes and are ignored.
pub fn mean_confidence(confidences: &[i32]) -> f64 {
    let valid: Vec<f64> = confidences.iter().filter(|c| **c >= 0).map(|c| *c as f64).collect();
    if valid.is_empty() {
        return 0.0;
    }
    (valid.iter().sum::<f64>() / valid.len() as f64).clamp(0.0, 100.0)
}
