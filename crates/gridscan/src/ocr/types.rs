use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Page segmentation mode handed to the engine.
///
/// Discriminants match Tesseract's `tessedit_pageseg_mode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationMode {
    OsdOnly = 0,
    AutoOsd = 1,
    AutoOnly = 2,
    Auto = 3,
    SingleColumn = 4,
    SingleBlockVertical = 5,
    SingleBlock = 6,
    SingleLine = 7,
    SingleWord = 8,
    CircleWord = 9,
    SingleChar = 10,
}

impl SegmentationMode {
    pub fn from_u8(value: u8) -> Result<Self, String> {
        match value {
            0 => Ok(Self::OsdOnly),
            1 => Ok(Self::AutoOsd),
            2 => Ok(Self::AutoOnly),
            3 => Ok(Self::Auto),
            4 => Ok(Self::SingleColumn),
            5 => Ok(Self::SingleBlockVertical),
            6 => Ok(Self::SingleBlock),
            7 => Ok(Self::SingleLine),
            8 => Ok(Self::SingleWord),
            9 => Ok(Self::CircleWord),
            10 => Ok(Self::SingleChar),
            _ => Err(format!("Invalid segmentation mode value: {}", value)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Whether the mode asks the engine for orientation and script detection.
    pub fn detects_orientation(&self) -> bool {
        matches!(self, Self::OsdOnly | Self::AutoOsd)
    }
}

impl fmt::Display for SegmentationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Recognizer selection (Tesseract `tessedit_ocr_engine_mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    LegacyOnly = 0,
    #[default]
    LstmOnly = 1,
    LegacyAndLstm = 2,
    Default = 3,
}

impl EngineMode {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// Outputs requested from a recognition call, beyond plain text which is always produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    PlainText,
    Hocr,
    /// Per-token TSV table with bounding boxes.
    TokenTable,
    /// Per-character boxes inside the hOCR markup.
    CharacterBoxes,
}

/// Concrete engine configuration for one request.
///
/// Fully determined by the processing mode and the classifier verdict; see
/// [`crate::ocr::selector::select`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionConfig {
    pub segmentation: SegmentationMode,
    pub engine_mode: EngineMode,
    /// Allowed characters, `None` leaves the engine unrestricted.
    pub character_whitelist: Option<String>,
    pub output_formats: BTreeSet<OutputFormat>,
}

impl RecognitionConfig {
    pub fn new(segmentation: SegmentationMode, formats: impl IntoIterator<Item = OutputFormat>) -> Self {
        let mut output_formats: BTreeSet<OutputFormat> = formats.into_iter().collect();
        output_formats.insert(OutputFormat::PlainText);
        Self {
            segmentation,
            engine_mode: EngineMode::default(),
            character_whitelist: None,
            output_formats,
        }
    }

    pub fn with_whitelist(mut self, whitelist: impl Into<String>) -> Self {
        self.character_whitelist = Some(whitelist.into());
        self
    }

    pub fn with_engine_mode(mut self, engine_mode: EngineMode) -> Self {
        self.engine_mode = engine_mode;
        self
    }

    pub fn wants(&self, format: OutputFormat) -> bool {
        self.output_formats.contains(&format)
    }

    pub fn wants_hocr(&self) -> bool {
        self.wants(OutputFormat::Hocr) || self.wants(OutputFormat::CharacterBoxes)
    }

    pub fn wants_tokens(&self) -> bool {
        self.wants(OutputFormat::TokenTable)
    }

    /// Whitelist as the engine expects it: empty string when unrestricted.
    pub fn whitelist_value(&self) -> &str {
        self.character_whitelist.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segmentation_from_u8_valid() {
        let modes = [
            (0, SegmentationMode::OsdOnly),
            (1, SegmentationMode::AutoOsd),
            (3, SegmentationMode::Auto),
            (6, SegmentationMode::SingleBlock),
            (7, SegmentationMode::SingleLine),
            (10, SegmentationMode::SingleChar),
        ];

        for (value, expected) in modes {
            assert_eq!(SegmentationMode::from_u8(value).unwrap(), expected);
        }
    }

    #[test]
    fn test_segmentation_from_u8_invalid() {
        for value in [11, 12, 255] {
            let result = SegmentationMode::from_u8(value);
            assert!(result.unwrap_err().contains("Invalid segmentation mode"));
        }
    }

    #[test]
    fn test_segmentation_orientation() {
        assert!(SegmentationMode::AutoOsd.detects_orientation());
        assert!(!SegmentationMode::Auto.detects_orientation());
        assert!(!SegmentationMode::SingleLine.detects_orientation());
    }

    #[test]
    fn test_plain_text_always_requested() {
        let config = RecognitionConfig::new(SegmentationMode::Auto, []);
        assert!(config.wants(OutputFormat::PlainText));
        assert!(!config.wants_tokens());
        assert!(!config.wants_hocr());
    }

    #[test]
    fn test_character_boxes_imply_hocr() {
        let config = RecognitionConfig::new(SegmentationMode::AutoOsd, [OutputFormat::CharacterBoxes]);
        assert!(config.wants_hocr());
    }

    #[test]
    fn test_whitelist_value() {
        let config = RecognitionConfig::new(SegmentationMode::SingleLine, []);
        assert_eq!(config.whitelist_value(), "");
        let config = config.with_whitelist("abc");
        assert_eq!(config.whitelist_value(), "abc");
    }

    #[test]
    fn test_default_engine_mode_is_lstm() {
        assert_eq!(EngineMode::default().as_u8(), 1);
    }
}
