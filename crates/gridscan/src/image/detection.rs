//! Content-type classification.
//!
//! Decides whether an image likely holds a table. The only shipped detector is
//! a brightness-ratio heuristic: after edge sharpening and a fixed threshold,
//! a ruled grid lights up a moderate share of pixels, while blank pages light
//! up too few and dense text or handwriting too many. It has known false
//! positives and negatives.

use std::panic::{AssertUnwindSafe, catch_unwind};

use image::DynamicImage;

use super::filters::sharpen_and_threshold;
use crate::core::config::DetectionConfig;

/// Classifier seam used by the pipeline for `table` and `auto` modes.
///
/// Implementations must not fail: anything that goes wrong means `false`.
pub trait TableDetector: Send + Sync {
    fn is_likely_table(&self, image: &DynamicImage) -> bool;
}

/// Table detector based on the share of "on" pixels after sharpen + threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct BrightnessRatioDetector {
    threshold: u8,
    lower_bound: f64,
    upper_bound: f64,
    sharpen: bool,
}

impl Default for BrightnessRatioDetector {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}

impl BrightnessRatioDetector {
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            threshold: config.threshold,
            lower_bound: config.lower_bound,
            upper_bound: config.upper_bound,
            sharpen: config.sharpen,
        }
    }

    /// Share of white pixels in the binarized raster, `None` for an empty image.
    pub fn on_pixel_ratio(&self, image: &DynamicImage) -> Option<f64> {
        let gray = image.to_luma8();
        let total = gray.width() as u64 * gray.height() as u64;
        if total == 0 {
            return None;
        }

        let binary = sharpen_and_threshold(&gray, self.threshold, self.sharpen);
        let sum: u64 = binary.pixels().map(|p| p[0] as u64).sum();
        Some(sum as f64 / 255.0 / total as f64)
    }

    /// Strictly inside the band: values on either edge are not tables.
    pub fn in_band(&self, ratio: f64) -> bool {
        ratio > self.lower_bound && ratio < self.upper_bound
    }
}

impl TableDetector for BrightnessRatioDetector {
    fn is_likely_table(&self, image: &DynamicImage) -> bool {
        match catch_unwind(AssertUnwindSafe(|| self.on_pixel_ratio(image))) {
            Ok(Some(ratio)) => {
                let verdict = self.in_band(ratio);
                tracing::debug!(ratio, verdict, "Table detection");
                verdict
            }
            Ok(None) => {
                tracing::warn!("Table detection skipped for empty image");
                false
            }
            Err(_) => {
                tracing::warn!("Table detection panicked, assuming no table");
                false
            }
        }
    }
}

/// Classify with default settings.
pub fn is_likely_table(image: &DynamicImage) -> bool {
    BrightnessRatioDetector::default().is_likely_table(image)
}
