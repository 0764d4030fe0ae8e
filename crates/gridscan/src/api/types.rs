//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::core::config::GridscanConfig;
use crate::core::pipeline::OcrPipeline;
use crate::ocr::languages::LanguageInfo;
use crate::types::{BatchResult, ModeInfo, OcrResult};

/// API server size limit configuration.
///
/// Controls the maximum size of a whole request body and of a single
/// multipart field. By default both are sized so that a full batch
/// (`batch.max_images` images of `limits.max_file_bytes` each) fits, plus
/// [`MULTIPART_OVERHEAD_BYTES`]. The per-image limit of the pipeline still
/// applies on top of these.
///
/// # Configuration via Environment Variables
///
/// ```bash
/// export GRIDSCAN_MAX_UPLOAD_SIZE_MB=50  # applies to both limits
/// ```
///
/// # Examples
///
/// ```
/// use gridscan::api::ApiSizeLimits;
///
/// // Default limits: ten 10 MiB images plus multipart overhead
/// let limits = ApiSizeLimits::default();
/// assert!(limits.max_request_body_bytes > 100 * 1024 * 1024);
///
/// // 20 MB limits
/// let limits = ApiSizeLimits::from_mb(20, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiSizeLimits {
    /// Maximum size of the entire request body in bytes.
    pub max_request_body_bytes: usize,

    /// Maximum size of a single multipart field in bytes.
    pub max_multipart_field_bytes: usize,
}

/// Allowance for multipart boundaries, part headers and text fields.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

impl Default for ApiSizeLimits {
    fn default() -> Self {
        Self::for_config(&GridscanConfig::default())
    }
}

impl ApiSizeLimits {
    pub fn new(max_request_body_bytes: usize, max_multipart_field_bytes: usize) -> Self {
        Self {
            max_request_body_bytes,
            max_multipart_field_bytes,
        }
    }

    /// Limits large enough for a full batch under `config`.
    pub fn for_config(config: &GridscanConfig) -> Self {
        let bytes = config
            .batch
            .max_images
            .saturating_mul(config.limits.max_file_bytes)
            .saturating_add(MULTIPART_OVERHEAD_BYTES);
        Self::new(bytes, bytes)
    }

    /// Create size limits from MB values.
    pub fn from_mb(max_request_body_mb: usize, max_multipart_field_mb: usize) -> Self {
        Self {
            max_request_body_bytes: max_request_body_mb * 1024 * 1024,
            max_multipart_field_bytes: max_multipart_field_mb * 1024 * 1024,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status
    pub status: String,
    /// API version
    pub version: String,
    /// Name of the OCR engine behind the pipeline
    pub engine: String,
    /// Version reported by the engine
    pub engine_version: String,
}

/// Single-image OCR response.
///
/// The result fields are flattened next to `success`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: OcrResult,
}

/// Batch OCR response, one entry per uploaded image in upload order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOcrResponse {
    pub success: bool,
    pub results: BatchResult,
}

/// Supported language profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguagesResponse {
    pub success: bool,
    pub languages: Vec<LanguageInfo>,
}

/// Supported processing modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModesResponse {
    pub success: bool,
    pub modes: Vec<ModeInfo>,
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Error message
    pub message: String,
    /// Error type name
    pub error_type: String,
}

/// API server state.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub pipeline: OcrPipeline,
}
