//! Raster preprocessing and content-type classification.

pub mod detection;
pub mod filters;

pub use detection::{BrightnessRatioDetector, TableDetector, is_likely_table};
pub use filters::{apply, try_apply};
