//! Error types for gridscan.
//!
//! All fallible operations return [`GridscanError`]. The variants follow the
//! failure taxonomy of the recognition pipeline:
//!
//! - `Validation` / `UnsupportedFormat` - rejected input (no image, batch too
//!   large, non-image MIME type, bad language code). Raised before any OCR
//!   engine session is created.
//! - `Ocr` - engine initialization or recognition failed. Aborts the current
//!   image, or the whole batch when the session is shared.
//! - `ImageProcessing` - the input could not be decoded at all.
//! - `Io` - file system errors. These always bubble up unchanged.
//!
//! Preprocessing, classification and table reconstruction failures are not
//! represented here: they degrade locally (original image, `is_table = false`,
//! empty grid) and are only logged.
//!
//! # Example
//!
//! ```rust
//! use gridscan::{GridscanError, Result};
//!
//! fn require_image(data: &[u8]) -> Result<&[u8]> {
//!     if data.is_empty() {
//!         return Err(GridscanError::validation("No image uploaded"));
//!     }
//!     Ok(data)
//! }
//! ```
use thiserror::Error;

/// Result type alias using `GridscanError`.
pub type Result<T> = std::result::Result<T, GridscanError>;

/// Main error type for all gridscan operations.
#[derive(Debug, Error)]
pub enum GridscanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Image processing error: {message}")]
    ImageProcessing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for GridscanError {
    fn from(err: serde_json::Error) -> Self {
        GridscanError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<image::ImageError> for GridscanError {
    fn from(err: image::ImageError) -> Self {
        GridscanError::ImageProcessing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl GridscanError {
    error_constructor!(ocr, Ocr);
    error_constructor!(validation, Validation);
    error_constructor!(image_processing, ImageProcessing);

    /// Whether the error was caused by the caller's input rather than the engine.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::UnsupportedFormat(_))
    }

    /// Short, stable name of the variant, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "IoError",
            Self::Ocr { .. } => "OcrError",
            Self::Validation { .. } => "ValidationError",
            Self::ImageProcessing { .. } => "ImageProcessingError",
            Self::Serialization { .. } => "SerializationError",
            Self::UnsupportedFormat(_) => "UnsupportedFormatError",
            Self::Other(_) => "Error",
        }
    }
}
