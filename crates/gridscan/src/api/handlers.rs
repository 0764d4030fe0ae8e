//! API request handlers.

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
};

use crate::error::GridscanError;
use crate::ocr::languages::supported_languages;
use crate::types::{ImageInput, PreprocessingMethod, ProcessingMode, RequestOptions};

use super::{
    error::ApiError,
    types::{ApiState, BatchOcrResponse, HealthResponse, LanguagesResponse, ModesResponse, OcrResponse},
};

/// Images and options read from a multipart form.
struct Upload {
    images: Vec<ImageInput>,
    options: RequestOptions,
}

fn multipart_error(e: MultipartError) -> ApiError {
    ApiError {
        status: e.status(),
        error: GridscanError::validation(format!("Invalid multipart upload: {}", e.body_text())),
    }
}

/// Read every part of the form. File parts are taken from `file_field`;
/// `mode`, `language` and `preprocessing` are optional text parts.
async fn read_upload(mut multipart: Multipart, file_field: &str) -> Result<Upload, ApiError> {
    let mut images = Vec::new();
    let mut options = RequestOptions::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            name if name == file_field => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .filter(|ct| *ct != "application/octet-stream")
                    .map(|ct| ct.to_string());
                let data = field.bytes().await.map_err(multipart_error)?;

                let mut input = ImageInput::new(filename, data.to_vec());
                if let Some(content_type) = content_type {
                    input = input.with_mime_type(content_type);
                }
                images.push(input);
            }
            "mode" => {
                let value = field.text().await.map_err(multipart_error)?;
                if !value.trim().is_empty() {
                    options.mode = value.parse::<ProcessingMode>()?;
                }
            }
            "language" => {
                let value = field.text().await.map_err(multipart_error)?;
                let value = value.trim();
                options.language = (!value.is_empty()).then(|| value.to_string());
            }
            "preprocessing" => {
                let value = field.text().await.map_err(multipart_error)?;
                if !value.trim().is_empty() {
                    options.preprocessing = value.parse::<PreprocessingMethod>()?;
                }
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown form field");
            }
        }
    }

    Ok(Upload { images, options })
}

/// Single image OCR handler.
///
/// POST /api/ocr
///
/// Accepts multipart form data with:
/// - `image`: the image to recognize
/// - `mode` (optional): `text`, `handwriting`, `table` or `auto`
/// - `language` (optional): profile code such as `eng` or `eng+deu`
/// - `preprocessing` (optional): `none`, `grayscale`, `binarize` or `contrast`
///
/// Request body size limits are enforced at the router layer; a request over
/// the limit is rejected with HTTP 413.
pub async fn ocr_handler(State(state): State<ApiState>, multipart: Multipart) -> Result<Json<OcrResponse>, ApiError> {
    let Upload { mut images, options } = read_upload(multipart, "image").await?;

    let image = match images.len() {
        0 => return Err(ApiError::bad_request("No image uploaded")),
        1 => images.remove(0),
        n => {
            return Err(ApiError::bad_request(format!(
                "Expected one image, got {}. Use /api/batch-ocr for several images",
                n
            )));
        }
    };

    let result = state.pipeline.run(image, &options).await?;

    Ok(Json(OcrResponse { success: true, result }))
}

/// Batch OCR handler.
///
/// POST /api/batch-ocr
///
/// Same form as [`ocr_handler`] with repeated `images` parts. The whole batch
/// is rejected with 400 when it is empty, larger than `batch.max_images` or
/// contains a non-image part.
pub async fn batch_ocr_handler(
    State(state): State<ApiState>,
    multipart: Multipart,
) -> Result<Json<BatchOcrResponse>, ApiError> {
    let Upload { images, options } = read_upload(multipart, "images").await?;

    if images.is_empty() {
        return Err(ApiError::bad_request("No images uploaded"));
    }

    let results = state.pipeline.run_batch(images, &options).await?;

    Ok(Json(BatchOcrResponse { success: true, results }))
}

/// Language catalog handler.
///
/// GET /api/languages
pub async fn languages_handler() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        success: true,
        languages: supported_languages(),
    })
}

/// Mode catalog handler.
///
/// GET /api/modes
pub async fn modes_handler() -> Json<ModesResponse> {
    Json(ModesResponse {
        success: true,
        modes: ProcessingMode::ALL.iter().map(ProcessingMode::describe).collect(),
    })
}

/// Health check endpoint handler.
///
/// GET /health
pub async fn health_handler(State(state): State<ApiState>) -> Json<HealthResponse> {
    let engine = state.pipeline.engine();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: engine.name().to_string(),
        engine_version: engine.version(),
    })
}
