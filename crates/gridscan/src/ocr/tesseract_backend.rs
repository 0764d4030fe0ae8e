//! Native Tesseract engine.
//!
//! Implements [`OcrEngine`] on top of `kreuzberg-tesseract`. One
//! [`TesseractSession`] owns one initialized `TesseractAPI` handle, so a batch
//! pays language loading once.

use std::env;
use std::path::{Path, PathBuf};

use kreuzberg_tesseract::{TessPageSegMode, TesseractAPI};

use super::engine::{EngineOutput, OcrEngine, OcrSession, mean_confidence};
use super::table::extract_tokens_from_tsv;
use super::types::{OutputFormat, RecognitionConfig};
use crate::{GridscanError, Result};

const FALLBACK_TESSDATA_PATHS: &[&str] = &[
    "/opt/homebrew/share/tessdata",
    "/opt/homebrew/opt/tesseract/share/tessdata",
    "/usr/local/opt/tesseract/share/tessdata",
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    r#"C:\Program Files\Tesseract-OCR\tessdata"#,
    r#"C:\ProgramData\Tesseract-OCR\tessdata"#,
];

fn strip_control_characters(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\u{0000}'..='\u{001F}' | '\u{007F}') || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}

/// Resolve the tessdata directory: explicit path, then `TESSDATA_PREFIX`, then well-known install locations.
pub fn resolve_tessdata_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(prefix) = env::var_os("TESSDATA_PREFIX") {
        return Some(PathBuf::from(prefix));
    }

    FALLBACK_TESSDATA_PATHS
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
}

/// Tesseract-backed engine.
#[derive(Debug, Clone, Default)]
pub struct TesseractBackend {
    tessdata_path: Option<PathBuf>,
}

impl TesseractBackend {
    pub fn new(tessdata_path: Option<PathBuf>) -> Self {
        Self { tessdata_path }
    }
}

impl OcrEngine for TesseractBackend {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn version(&self) -> String {
        TesseractAPI::version()
    }

    fn open_session(&self, language: &str) -> Result<Box<dyn OcrSession>> {
        // tesseract can crash on an empty language or a missing traineddata file instead of returning an error
        if language.trim().is_empty() {
            return Err(GridscanError::ocr(
                "Language cannot be empty. Please specify a valid language code (e.g., 'eng')",
            ));
        }

        let tessdata_path = resolve_tessdata_path(self.tessdata_path.as_deref());
        let datapath = tessdata_path
            .as_deref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        if let Some(dir) = &tessdata_path {
            for lang in language.split('+').map(str::trim).filter(|l| !l.is_empty()) {
                let traineddata = dir.join(format!("{}.traineddata", lang));
                if !traineddata.exists() {
                    return Err(GridscanError::ocr(format!(
                        "Language '{}' not found. Traineddata file does not exist: {}",
                        lang,
                        traineddata.display()
                    )));
                }
            }
        }

        tracing::debug!(language, datapath = %datapath, "Initializing Tesseract session");

        let api = TesseractAPI::new();
        api.init(&datapath, language).map_err(|e| {
            GridscanError::ocr(format!("Failed to initialize language '{}': {}", language, e))
        })?;

        Ok(Box::new(TesseractSession {
            api,
            language: language.to_string(),
        }))
    }
}

/// An initialized Tesseract handle bound to one language.
pub struct TesseractSession {
    api: TesseractAPI,
    language: String,
}

impl TesseractSession {
    fn set_variable(&self, name: &str, value: &str) -> Result<()> {
        self.api
            .set_variable(name, value)
            .map_err(|e| GridscanError::ocr(format!("Failed to set {}: {}", name, e)))
    }

    fn configure(&self, config: &RecognitionConfig) -> Result<()> {
        self.api
            .set_page_seg_mode(TessPageSegMode::from_int(config.segmentation.as_u8() as i32))
            .map_err(|e| GridscanError::ocr(format!("Failed to set PSM mode: {}", e)))?;

        // The engine mode is fixed at init time; a rejected update is not fatal.
        if let Err(e) = self
            .api
            .set_variable("tessedit_ocr_engine_mode", &config.engine_mode.as_u8().to_string())
        {
            tracing::debug!("Engine mode not applied: {}", e);
        }

        // Always written so a shared session does not keep the previous image's whitelist.
        self.set_variable("tessedit_char_whitelist", config.whitelist_value())?;

        let char_boxes = if config.wants(OutputFormat::CharacterBoxes) { "1" } else { "0" };
        self.set_variable("hocr_char_boxes", char_boxes)?;

        Ok(())
    }
}

impl OcrSession for TesseractSession {
    fn language(&self) -> &str {
        &self.language
    }

    fn recognize(&mut self, image_path: &Path, config: &RecognitionConfig) -> Result<EngineOutput> {
        let img = image::open(image_path)
            .map_err(|e| GridscanError::ocr_with_source(format!("Failed to load {}", image_path.display()), e))?;

        let rgb_image = img.to_rgb8();
        let (width, height) = rgb_image.dimensions();
        let bytes_per_pixel = 3;
        let bytes_per_line = width * bytes_per_pixel;

        self.configure(config)?;

        self.api
            .set_image(
                rgb_image.as_raw(),
                width as i32,
                height as i32,
                bytes_per_pixel as i32,
                bytes_per_line as i32,
            )
            .map_err(|e| GridscanError::ocr(format!("Failed to set image: {}", e)))?;

        self.api
            .recognize()
            .map_err(|e| GridscanError::ocr(format!("Failed to recognize text: {}", e)))?;

        let text = self
            .api
            .get_utf8_text()
            .map_err(|e| GridscanError::ocr(format!("Failed to extract text: {}", e)))?;

        let confidence = self
            .api
            .get_word_confidences()
            .map(|confs| mean_confidence(&confs))
            .unwrap_or_else(|e| {
                tracing::debug!("Word confidences unavailable: {}", e);
                0.0
            });

        let hocr = if config.wants_hocr() {
            Some(
                self.api
                    .get_hocr_text(0)
                    .map_err(|e| GridscanError::ocr(format!("Failed to extract hOCR: {}", e)))?,
            )
        } else {
            None
        };

        let tokens = if config.wants_tokens() {
            let tsv = self
                .api
                .get_tsv_text(0)
                .map_err(|e| GridscanError::ocr(format!("Failed to extract TSV: {}", e)))?;
            Some(extract_tokens_from_tsv(&tsv, 0.0))
        } else {
            None
        };

        tracing::debug!(
            width,
            height,
            psm = %config.segmentation,
            confidence,
            tokens = tokens.as_ref().map(Vec::len),
            "Tesseract recognition completed"
        );

        Ok(EngineOutput {
            text: strip_control_characters(&text),
            confidence,
            hocr,
            tokens,
        })
    }
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_strip_control_characters() {
        assert_eq!(strip_control_characters("a\u{0000}b\u{0007}c"), "abc");
        assert_eq!(strip_control_characters("line1\nline2\tx\r"), "line1\nline2\tx\r");
        assert_eq!(strip_control_characters("del\u{007F}"), "del");
    }

    #[test]
    #[serial]
    fn test_explicit_tessdata_path_wins() {
        let path = PathBuf::from("/custom/tessdata");
        assert_eq!(resolve_tessdata_path(Some(&path)), Some(path));
    }

    #[test]
    #[serial]
    fn test_tessdata_prefix_env() {
        let previous = env::var_os("TESSDATA_PREFIX");
        unsafe { env::set_var("TESSDATA_PREFIX", "/env/tessdata") };
        assert_eq!(resolve_tessdata_path(None), Some(PathBuf::from("/env/tessdata")));
        match previous {
            Some(value) => unsafe { env::set_var("TESSDATA_PREFIX", value) },
            None => unsafe { env::remove_var("TESSDATA_PREFIX") },
        }
    }

    #[test]
    fn test_open_session_rejects_empty_language() {
        let backend = TesseractBackend::default();
        assert!(backend.open_session("  ").is_err());
    }

    #[test]
    fn test_open_session_rejects_missing_traineddata() {
        let dir = tempfile::tempdir().unwrap();
        let backend = TesseractBackend::new(Some(dir.path().to_path_buf()));
        let err = backend.open_session("eng").err().unwrap();
        assert!(err.to_string().contains("Traineddata file does not exist"));
    }
}
