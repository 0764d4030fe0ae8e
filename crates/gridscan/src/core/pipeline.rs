//! Request orchestration.
//!
//! [`OcrPipeline`] sequences one image through classification, parameter
//! selection, preprocessing, recognition and table reconstruction:
//!
//! 1. Validate the upload (type, size). Rejections happen before any engine session exists.
//! 2. Decode the raster.
//! 3. Run the table classifier for `table` and `auto` modes.
//! 4. Select preprocessing and engine configuration.
//! 5. Apply the filter, degrading to the original raster on failure.
//! 6. Write the raster the engine reads to the artifact store.
//! 7. Recognize through the session.
//! 8. Rebuild the grid when tokens were requested and the mode is table-like.
//!
//! The intermediate raster and the engine session are owned by guards, so
//! both are released on every exit path.
//!
//! A batch shares one session across all images. Per-image decode failures
//! are recorded in the batch result; an engine failure aborts the batch.

use std::sync::Arc;

use image::DynamicImage;

use crate::core::artifacts::ArtifactStore;
use crate::core::config::GridscanConfig;
use crate::core::mime::validate_image_input;
use crate::image::detection::{BrightnessRatioDetector, TableDetector};
use crate::image::filters;
use crate::ocr::engine::{OcrEngine, OcrSession};
use crate::ocr::languages::validate_language_code;
use crate::ocr::selector::select;
use crate::ocr::table::TableReconstructor;
use crate::types::{BatchItem, BatchResult, ImageInput, OcrResult, PreprocessingMethod, RequestOptions};
use crate::{GridscanError, Result};

/// The request orchestrator.
///
/// Cheap to clone: the engine, detector and configuration are shared.
#[derive(Clone)]
pub struct OcrPipeline {
    engine: Arc<dyn OcrEngine>,
    detector: Arc<dyn TableDetector>,
    artifacts: ArtifactStore,
    config: Arc<GridscanConfig>,
}

impl std::fmt::Debug for OcrPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrPipeline")
            .field("engine", &self.engine.name())
            .field("artifacts", &self.artifacts)
            .field("config", &self.config)
            .finish()
    }
}

impl OcrPipeline {
    /// Build a pipeline around `engine`.
    ///
    /// # Errors
    ///
    /// Returns `GridscanError::Validation` for an invalid configuration and
    /// `GridscanError::Io` when the artifact directory cannot be created.
    pub fn new(engine: Arc<dyn OcrEngine>, config: GridscanConfig) -> Result<Self> {
        config.validate()?;
        let artifacts = ArtifactStore::new(config.resolved_artifact_dir())?;
        let detector = Arc::new(BrightnessRatioDetector::from_config(&config.detection));

        tracing::info!(
            engine = engine.name(),
            artifact_dir = %artifacts.dir().display(),
            "OCR pipeline ready"
        );

        Ok(Self {
            engine,
            detector,
            artifacts,
            config: Arc::new(config),
        })
    }

    /// Replace the table classifier.
    pub fn with_detector(mut self, detector: Arc<dyn TableDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn config(&self) -> &GridscanConfig {
        &self.config
    }

    pub fn engine(&self) -> &dyn OcrEngine {
        self.engine.as_ref()
    }

    /// Process one image on a blocking worker.
    pub async fn run(&self, input: ImageInput, options: &RequestOptions) -> Result<OcrResult> {
        let pipeline = self.clone();
        let options = options.clone();
        tokio::task::spawn_blocking(move || pipeline.run_blocking(input, &options))
            .await
            .map_err(|e| GridscanError::Other(format!("OCR task panicked: {}", e)))?
    }

    /// Process a batch on a blocking worker.
    pub async fn run_batch(&self, inputs: Vec<ImageInput>, options: &RequestOptions) -> Result<BatchResult> {
        let pipeline = self.clone();
        let options = options.clone();
        tokio::task::spawn_blocking(move || pipeline.run_batch_blocking(inputs, &options))
            .await
            .map_err(|e| GridscanError::Other(format!("OCR batch task panicked: {}", e)))?
    }

    /// Process one image on the current thread.
    ///
    /// # Errors
    ///
    /// - `Validation` / `UnsupportedFormat` for rejected input or language
    /// - `ImageProcessing` when the raster cannot be decoded
    /// - `Ocr` when the engine fails to start or to recognize
    #[tracing::instrument(
        skip(self, input, options),
        fields(
            filename = %input.filename,
            image.size_bytes = input.data.len(),
            mode = %options.mode,
        )
    )]
    pub fn run_blocking(&self, input: ImageInput, options: &RequestOptions) -> Result<OcrResult> {
        let language = self.resolve_language(options)?;
        validate_image_input(&input, self.config.limits.max_file_bytes)?;
        let image = decode(&input)?;

        let mut session = self.engine.open_session(&language)?;
        self.process(session.as_mut(), &input, &image, options)
    }

    /// Process a batch on the current thread, sharing one engine session.
    ///
    /// The returned items follow input order.
    ///
    /// # Errors
    ///
    /// The whole batch is rejected, before a session is opened, when it is
    /// empty, exceeds `batch.max_images`, names an invalid language or holds a
    /// non-image upload. An engine failure aborts the batch.
    #[tracing::instrument(
        skip(self, inputs, options),
        fields(batch.size = inputs.len(), mode = %options.mode)
    )]
    pub fn run_batch_blocking(&self, inputs: Vec<ImageInput>, options: &RequestOptions) -> Result<BatchResult> {
        if inputs.is_empty() {
            return Err(GridscanError::validation("No images uploaded"));
        }

        let max_images = self.config.batch.max_images;
        if inputs.len() > max_images {
            return Err(GridscanError::validation(format!(
                "Too many images: {} submitted, at most {} per batch",
                inputs.len(),
                max_images
            )));
        }

        let language = self.resolve_language(options)?;
        for input in &inputs {
            validate_image_input(input, self.config.limits.max_file_bytes)?;
        }

        let mut session = self.engine.open_session(&language)?;
        let mut results = Vec::with_capacity(inputs.len());

        for input in inputs {
            let outcome = decode(&input).and_then(|image| self.process(session.as_mut(), &input, &image, options));

            match outcome {
                Ok(result) => results.push(BatchItem {
                    filename: input.filename,
                    success: true,
                    result: Some(result),
                    error: None,
                }),
                Err(e @ (GridscanError::Ocr { .. } | GridscanError::Io(_))) => {
                    tracing::warn!(filename = %input.filename, "Aborting batch: {}", e);
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(filename = %input.filename, "Image failed: {}", e);
                    results.push(BatchItem {
                        filename: input.filename,
                        success: false,
                        result: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        Ok(results)
    }

    fn resolve_language(&self, options: &RequestOptions) -> Result<String> {
        let language = options
            .language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.config.ocr.language);
        validate_language_code(language)?;
        Ok(language.to_string())
    }

    fn process(
        &self,
        session: &mut dyn OcrSession,
        input: &ImageInput,
        image: &DynamicImage,
        options: &RequestOptions,
    ) -> Result<OcrResult> {
        let table_detected = options
            .mode
            .requires_detection()
            .then(|| self.detector.is_likely_table(image));

        let selection =
            select(options.mode, table_detected.unwrap_or(false)).with_requested_preprocessing(options.preprocessing);
        let config = selection.config.with_engine_mode(self.config.ocr.engine_mode);

        let (raster, preprocessing) = match filters::try_apply(image, selection.preprocessing) {
            Ok(filtered) => (filtered, selection.preprocessing),
            Err(e) => {
                tracing::warn!(method = %selection.preprocessing, "Preprocessing failed, using original image: {}", e);
                (image.clone(), PreprocessingMethod::None)
            }
        };

        let artifact = self
            .artifacts
            .persist(&input.filename, artifact_suffix(preprocessing), &raster)?;

        tracing::debug!(
            ?table_detected,
            preprocessing = %preprocessing,
            psm = %config.segmentation,
            "Recognizing"
        );

        let output = session.recognize(artifact.path(), &config)?;
        drop(artifact);

        let tokens = if config.wants_tokens() {
            output.tokens.map(|mut tokens| {
                let min_confidence = self.config.table.min_confidence;
                tokens.retain(|t| t.confidence >= min_confidence);
                tokens
            })
        } else {
            None
        };

        let table = match (&tokens, selection.table_like) {
            (Some(tokens), true) => {
                let table = TableReconstructor::new(self.config.table.y_tolerance).reconstruct(tokens);
                tracing::debug!(rows = table.row_count(), cells = table.cell_count(), "Table reconstructed");
                Some(table)
            }
            _ => None,
        };

        Ok(OcrResult {
            text: output.text,
            confidence: output.confidence,
            hocr: output.hocr,
            table,
            tokens,
            mode: options.mode,
            preprocessing,
            table_detected,
        })
    }
}

fn decode(input: &ImageInput) -> Result<DynamicImage> {
    image::load_from_memory(&input.data).map_err(|e| {
        GridscanError::image_processing_with_source(format!("Failed to decode {}", input.filename), e)
    })
}

fn artifact_suffix(method: PreprocessingMethod) -> &'static str {
    match method {
        PreprocessingMethod::None => "",
        PreprocessingMethod::HandwritingOptimize => "handwriting",
        _ => "processed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::engine::EngineOutput;
    use crate::ocr::types::RecognitionConfig;
    use crate::types::ProcessingMode;
    use image::{GrayImage, ImageFormat, Luma};
    use std::io::Cursor;
    use std::path::Path;
    use tempfile::TempDir;

    struct EchoEngine;

    struct EchoSession {
        language: String,
    }

    impl OcrEngine for EchoEngine {
        fn name(&self) -> &str {
            "echo"
        }

        fn open_session(&self, language: &str) -> Result<Box<dyn OcrSession>> {
            Ok(Box::new(EchoSession {
                language: language.to_string(),
            }))
        }
    }

    impl OcrSession for EchoSession {
        fn language(&self) -> &str {
            &self.language
        }

        fn recognize(&mut self, image_path: &Path, config: &RecognitionConfig) -> Result<EngineOutput> {
            assert!(image_path.exists());
            Ok(EngineOutput {
                text: format!("{}:{}", self.language, config.segmentation),
                confidence: 88.0,
                hocr: None,
                tokens: None,
            })
        }
    }

    fn png() -> Vec<u8> {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([255])));
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    fn pipeline(dir: &TempDir) -> OcrPipeline {
        let config = GridscanConfig {
            artifact_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        OcrPipeline::new(Arc::new(EchoEngine), config).unwrap()
    }

    #[test]
    fn test_artifact_suffix() {
        assert_eq!(artifact_suffix(PreprocessingMethod::None), "");
        assert_eq!(artifact_suffix(PreprocessingMethod::Binarize), "processed");
        assert_eq!(artifact_suffix(PreprocessingMethod::HandwritingOptimize), "handwriting");
    }

    #[test]
    fn test_run_uses_default_language() {
        let dir = TempDir::new().unwrap();
        let result = pipeline(&dir)
            .run_blocking(ImageInput::new("a.png", png()), &RequestOptions::default())
            .unwrap();
        assert_eq!(result.text, "eng:3");
        assert_eq!(result.mode, ProcessingMode::Text);
        assert!(result.table_detected.is_none());
    }

    #[test]
    fn test_run_rejects_invalid_language() {
        let dir = TempDir::new().unwrap();
        let options = RequestOptions::default().with_language("zz");
        let err = pipeline(&dir)
            .run_blocking(ImageInput::new("a.png", png()), &options)
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = GridscanConfig::default();
        config.batch.max_images = 0;
        assert!(OcrPipeline::new(Arc::new(EchoEngine), config).is_err());
    }

    #[test]
    fn test_undecodable_image() {
        let dir = TempDir::new().unwrap();
        let input = ImageInput::new("broken.png", vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2]);
        let err = pipeline(&dir)
            .run_blocking(input, &RequestOptions::default())
            .unwrap_err();
        assert!(matches!(err, GridscanError::ImageProcessing { .. }));
    }
}
