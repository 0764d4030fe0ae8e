//! Shared helpers: a scripted OCR engine and synthetic rasters.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gridscan::{
    BoundingBox, EngineOutput, GridscanConfig, GridscanError, OcrEngine, OcrPipeline, OcrSession, RecognitionConfig,
    Result, TableDetector, Token,
};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use tempfile::TempDir;

/// What the engine saw on one `recognize` call.
#[derive(Debug, Clone)]
pub struct RecognizeCall {
    pub path: PathBuf,
    pub file_existed: bool,
    pub language: String,
    pub config: RecognitionConfig,
}

/// Engine returning canned output and recording every call.
#[derive(Default)]
pub struct ScriptedEngine {
    pub sessions_opened: AtomicUsize,
    pub calls: Mutex<Vec<RecognizeCall>>,
    pub tokens: Vec<Token>,
    /// `recognize` fails for artifacts whose name contains this stem
    pub fail_on: Option<String>,
}

impl ScriptedEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_tokens(tokens: Vec<Token>) -> Arc<Self> {
        Arc::new(Self {
            tokens,
            ..Default::default()
        })
    }

    pub fn failing_on(stem: &str) -> Arc<Self> {
        Arc::new(Self {
            fail_on: Some(stem.to_string()),
            ..Default::default()
        })
    }

    pub fn sessions(&self) -> usize {
        self.sessions_opened.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<RecognizeCall> {
        self.calls.lock().unwrap().clone()
    }
}

struct ScriptedSession {
    engine: Arc<ScriptedEngine>,
    language: String,
}

/// Engine handle whose sessions record into the shared script.
pub struct SharedEngine(pub Arc<ScriptedEngine>);

impl OcrEngine for SharedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    fn version(&self) -> String {
        "0.0.1".to_string()
    }

    fn open_session(&self, language: &str) -> Result<Box<dyn OcrSession>> {
        self.0.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            engine: Arc::clone(&self.0),
            language: language.to_string(),
        }))
    }
}

impl OcrSession for ScriptedSession {
    fn language(&self) -> &str {
        &self.language
    }

    fn recognize(&mut self, image_path: &Path, config: &RecognitionConfig) -> Result<EngineOutput> {
        self.engine.calls.lock().unwrap().push(RecognizeCall {
            path: image_path.to_path_buf(),
            file_existed: image_path.exists(),
            language: self.language.clone(),
            config: config.clone(),
        });

        if let Some(stem) = &self.engine.fail_on
            && image_path.to_string_lossy().contains(stem.as_str())
        {
            return Err(GridscanError::ocr(format!("engine crashed on {}", image_path.display())));
        }

        Ok(EngineOutput {
            text: "recognized text".to_string(),
            confidence: 91.5,
            hocr: config.wants_hocr().then(|| "<div class='ocr_page'></div>".to_string()),
            tokens: config.wants_tokens().then(|| self.engine.tokens.clone()),
        })
    }
}

/// Detector with a fixed verdict.
pub struct FixedDetector(pub bool);

impl TableDetector for FixedDetector {
    fn is_likely_table(&self, _image: &DynamicImage) -> bool {
        self.0
    }
}

/// Detector with a fixed verdict that counts how often it was consulted.
#[derive(Default)]
pub struct CountingDetector {
    pub verdict: bool,
    calls: AtomicUsize,
}

impl CountingDetector {
    pub fn new(verdict: bool) -> Arc<Self> {
        Arc::new(Self {
            verdict,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TableDetector for CountingDetector {
    fn is_likely_table(&self, _image: &DynamicImage) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verdict
    }
}

pub fn token(text: &str, x: u32, y: u32, confidence: f64) -> Token {
    Token::new(text, confidence, BoundingBox::new(x, y, 20, 12))
}

/// A small PNG of uniform brightness.
pub fn png_bytes(luma: u8) -> Vec<u8> {
    let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(16, 16, Luma([luma])));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

/// Pipeline writing artifacts into `dir`.
pub fn pipeline_in(dir: &TempDir, engine: Arc<ScriptedEngine>) -> OcrPipeline {
    pipeline_with_config(
        engine,
        GridscanConfig {
            artifact_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        },
    )
}

pub fn pipeline_with_config(engine: Arc<ScriptedEngine>, config: GridscanConfig) -> OcrPipeline {
    OcrPipeline::new(Arc::new(SharedEngine(engine)), config).unwrap()
}

pub fn artifact_count(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}
