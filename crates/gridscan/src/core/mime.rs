//! MIME type detection and validation for uploaded images.
//!
//! Only `image/*` inputs are accepted. A declared MIME type is trusted when
//! present; otherwise the type is sniffed from the bytes and, failing that,
//! guessed from the file name.

use crate::types::ImageInput;
use crate::{GridscanError, Result};
use std::path::Path;

pub const IMAGE_MIME_PREFIX: &str = "image/";
pub const PNG_MIME_TYPE: &str = "image/png";

pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.trim().to_ascii_lowercase().starts_with(IMAGE_MIME_PREFIX)
}

/// Sniff the MIME type from magic bytes, falling back to the file extension.
pub fn detect_image_mime(filename: &str, data: &[u8]) -> Option<String> {
    if let Ok(format) = image::guess_format(data) {
        return Some(format.to_mime_type().to_string());
    }

    mime_guess::from_path(Path::new(filename))
        .first()
        .map(|mime| mime.essence_str().to_string())
}

/// Validate an upload before any engine work.
///
/// # Errors
///
/// Returns `GridscanError::Validation` for an empty or oversized upload and
/// `GridscanError::UnsupportedFormat` for anything that is not an image.
pub fn validate_image_input(input: &ImageInput, max_file_bytes: usize) -> Result<String> {
    if input.data.is_empty() {
        return Err(GridscanError::validation(format!("No image uploaded ({} is empty)", input.filename)));
    }

    if input.data.len() > max_file_bytes {
        return Err(GridscanError::validation(format!(
            "{} is {} bytes, limit is {} bytes",
            input.filename,
            input.data.len(),
            max_file_bytes
        )));
    }

    let mime_type = match &input.mime_type {
        Some(declared) if !declared.trim().is_empty() => declared.trim().to_ascii_lowercase(),
        _ => detect_image_mime(&input.filename, &input.data).ok_or_else(|| {
            GridscanError::UnsupportedFormat(format!("Could not determine the type of {}", input.filename))
        })?,
    };

    if !is_image_mime(&mime_type) {
        return Err(GridscanError::UnsupportedFormat(format!(
            "{} is not an image ({})",
            input.filename, mime_type
        )));
    }

    Ok(mime_type)
}
