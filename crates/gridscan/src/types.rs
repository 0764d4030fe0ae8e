use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{GridscanError, Result};

/// Processing mode selected by the caller.
///
/// `Auto` defers the text-vs-table decision to the content-type classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    #[default]
    Text,
    Handwriting,
    Table,
    Auto,
}

/// Human-readable description of a processing mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeInfo {
    pub code: String,
    pub name: String,
    pub description: String,
}

impl ProcessingMode {
    pub const ALL: [ProcessingMode; 4] = [Self::Text, Self::Handwriting, Self::Table, Self::Auto];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Handwriting => "handwriting",
            Self::Table => "table",
            Self::Auto => "auto",
        }
    }

    /// Whether the content-type classifier runs for each image.
    ///
    /// Only `Auto` feeds the verdict into parameter selection; `Table` records it.
    pub fn requires_detection(&self) -> bool {
        matches!(self, Self::Table | Self::Auto)
    }

    pub fn describe(&self) -> ModeInfo {
        let (name, description) = match self {
            Self::Text => (
                "Regular Text",
                "Best for printed text in documents, books, articles, etc.",
            ),
            Self::Handwriting => ("Handwriting", "Optimized for handwritten text recognition"),
            Self::Table => ("Table Detection", "Detects and extracts tabular data from images"),
            Self::Auto => (
                "Automatic",
                "Detects whether the image holds a table and picks table or handwriting settings",
            ),
        };

        ModeInfo {
            code: self.as_str().to_string(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessingMode {
    type Err = GridscanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "handwriting" => Ok(Self::Handwriting),
            "table" => Ok(Self::Table),
            "auto" => Ok(Self::Auto),
            other => Err(GridscanError::validation(format!(
                "Invalid mode: '{}'. Must be one of: text, handwriting, table, auto",
                other
            ))),
        }
    }
}

/// Raster preprocessing applied before recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreprocessingMethod {
    #[default]
    None,
    Grayscale,
    Binarize,
    #[serde(alias = "contrast")]
    ContrastEnhance,
    #[serde(alias = "handwriting")]
    HandwritingOptimize,
}

impl PreprocessingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Grayscale => "grayscale",
            Self::Binarize => "binarize",
            Self::ContrastEnhance => "contrast_enhance",
            Self::HandwritingOptimize => "handwriting_optimize",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for PreprocessingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreprocessingMethod {
    type Err = GridscanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "grayscale" => Ok(Self::Grayscale),
            "binarize" => Ok(Self::Binarize),
            "contrast" | "contrast_enhance" => Ok(Self::ContrastEnhance),
            "handwriting" | "handwriting_optimize" => Ok(Self::HandwritingOptimize),
            other => Err(GridscanError::validation(format!(
                "Invalid preprocessing: '{}'. Must be one of: none, grayscale, binarize, contrast, handwriting",
                other
            ))),
        }
    }
}

/// Pixel-space bounding box of a recognized token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }
}

/// One recognized word or fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// Engine confidence in `0..=100`.
    pub confidence: f64,
    #[serde(rename = "bbox")]
    pub bounding_box: BoundingBox,
}

impl Token {
    pub fn new(text: impl Into<String>, confidence: f64, bounding_box: BoundingBox) -> Self {
        Self {
            text: text.into(),
            confidence,
            bounding_box,
        }
    }
}

/// Table recovered from positioned tokens.
///
/// Rows may have different lengths: columns are implied by token order within
/// a row, never snapped to shared x positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconstructedTable {
    /// Tokens in row-major reading order.
    pub raw_cells: Vec<Token>,
    pub grid: Vec<Vec<String>>,
}

impl ReconstructedTable {
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.grid.len()
    }

    pub fn cell_count(&self) -> usize {
        self.grid.iter().map(Vec::len).sum()
    }

    /// Length of the longest row.
    pub fn max_columns(&self) -> usize {
        self.grid.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Recognition result for a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    pub text: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hocr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<ReconstructedTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<Token>>,
    pub mode: ProcessingMode,
    /// Preprocessing actually applied to the raster.
    pub preprocessing: PreprocessingMethod,
    /// Classifier verdict, present only when the classifier ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_detected: Option<bool>,
}

/// One entry of a batch run, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    pub filename: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<OcrResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub type BatchResult = Vec<BatchItem>;

/// An image handed to the pipeline.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub filename: String,
    pub data: Vec<u8>,
    /// MIME type declared by the caller, if any. Sniffed from the bytes otherwise.
    pub mime_type: Option<String>,
}

impl ImageInput {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Per-request options shared by every image of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOptions {
    #[serde(default)]
    pub mode: ProcessingMode,
    /// Language profile, `None` uses the configured default.
    #[serde(default)]
    pub language: Option<String>,
    /// Caller-chosen filter, applied only when the mode implies none.
    #[serde(default)]
    pub preprocessing: PreprocessingMethod,
}

impl RequestOptions {
    pub fn new(mode: ProcessingMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_preprocessing(mut self, preprocessing: PreprocessingMethod) -> Self {
        self.preprocessing = preprocessing;
        self
    }
}
