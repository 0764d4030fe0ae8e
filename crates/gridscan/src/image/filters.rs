//! Raster filters applied before recognition.
//!
//! Every method works on a single luminance channel and returns a new
//! grayscale image. [`apply`] never fails: when a filter cannot run, the
//! original image is returned unchanged and a warning is logged.

use std::panic::{AssertUnwindSafe, catch_unwind};

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::{self, ThresholdType};
use imageproc::filter::{median_filter, sharpen3x3};
use imageproc::map::map_colors;

use crate::types::PreprocessingMethod;
use crate::{GridscanError, Result};

/// Threshold used by [`PreprocessingMethod::Binarize`].
pub const BINARIZE_THRESHOLD: u8 = 128;

/// Brightness and gamma applied by the contrast and handwriting filters.
const CONTRAST_BRIGHTNESS: f32 = 1.1;
const HANDWRITING_BRIGHTNESS: f32 = 1.05;
const HANDWRITING_GAMMA: f32 = 1.2;

/// Fraction of pixels clipped at each end of the histogram when normalizing.
const NORMALIZE_CLIP: f64 = 0.01;

/// Apply `method`, falling back to the original image on failure.
pub fn apply(image: &DynamicImage, method: PreprocessingMethod) -> DynamicImage {
    match try_apply(image, method) {
        Ok(processed) => processed,
        Err(e) => {
            tracing::warn!(method = %method, "Preprocessing failed, using original image: {}", e);
            image.clone()
        }
    }
}

/// Apply `method`, reporting failures instead of degrading.
pub fn try_apply(image: &DynamicImage, method: PreprocessingMethod) -> Result<DynamicImage> {
    if method.is_none() {
        return Ok(image.clone());
    }

    if image.width() == 0 || image.height() == 0 {
        return Err(GridscanError::image_processing(format!(
            "Cannot apply {} to an empty image",
            method
        )));
    }

    let gray = image.to_luma8();

    let processed = catch_unwind(AssertUnwindSafe(|| match method {
        PreprocessingMethod::None | PreprocessingMethod::Grayscale => gray,
        PreprocessingMethod::Binarize => threshold(&gray, BINARIZE_THRESHOLD),
        PreprocessingMethod::ContrastEnhance => modulate(&normalize(&gray), CONTRAST_BRIGHTNESS),
        PreprocessingMethod::HandwritingOptimize => {
            let denoised = median_filter(&normalize(&gray), 1, 1);
            modulate(&gamma(&denoised, HANDWRITING_GAMMA), HANDWRITING_BRIGHTNESS)
        }
    }))
    .map_err(|_| GridscanError::image_processing(format!("{} filter panicked", method)))?;

    Ok(DynamicImage::ImageLuma8(processed))
}

/// Sharpen edges then binarize: the raster the table classifier measures.
pub fn sharpen_and_threshold(gray: &GrayImage, level: u8, sharpen: bool) -> GrayImage {
    if sharpen {
        threshold(&sharpen3x3(gray), level)
    } else {
        threshold(gray, level)
    }
}

/// Pixels at or above `level` become white, the rest black.
pub fn threshold(gray: &GrayImage, level: u8) -> GrayImage {
    match level.checked_sub(1) {
        Some(below) => contrast::threshold(gray, below, ThresholdType::Binary),
        None => GrayImage::from_pixel(gray.width(), gray.height(), Luma([255])),
    }
}

/// Stretch the luminance histogram to the full range, ignoring outliers.
pub fn normalize(gray: &GrayImage) -> GrayImage {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let total = gray.width() as u64 * gray.height() as u64;
    let clip = (total as f64 * NORMALIZE_CLIP) as u64;

    let low = percentile(&histogram, clip);
    let high = percentile(&histogram, total.saturating_sub(clip + 1));

    if high <= low {
        return gray.clone();
    }

    let scale = 255.0 / (high - low) as f32;
    map_luma(gray, |v| ((v.saturating_sub(low)) as f32 * scale).round().min(255.0) as u8)
}

/// Gamma correction: `gamma > 1` lifts mid-tones.
pub fn gamma(gray: &GrayImage, gamma: f32) -> GrayImage {
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = (255.0 * (i as f32 / 255.0).powf(1.0 / gamma)).round() as u8;
    }
    map_luma(gray, |v| lut[v as usize])
}

/// Scale brightness. Saturation has no effect on a single channel.
pub fn modulate(gray: &GrayImage, brightness: f32) -> GrayImage {
    map_luma(gray, |v| (v as f32 * brightness).round().clamp(0.0, 255.0) as u8)
}

fn percentile(histogram: &[u64; 256], rank: u64) -> u8 {
    let mut seen = 0u64;
    for (value, count) in histogram.iter().enumerate() {
        seen += count;
        if seen > rank {
            return value as u8;
        }
    }
    255
}

fn map_luma(gray: &GrayImage, f: impl Fn(u8) -> u8) -> GrayImage {
    map_colors(gray, |pixel: Luma<u8>| Luma([f(pixel[0])]))
}
