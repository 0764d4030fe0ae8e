//! Recognition parameter selection.
//!
//! Maps a processing mode and the classifier verdict to a preprocessing
//! method and an engine configuration. The mapping is a fixed table:
//!
//! | mode        | is_table | preprocessing        | segmentation | whitelist | extra outputs                 |
//! |-------------|----------|----------------------|--------------|-----------|-------------------------------|
//! | text        | -        | none (caller filter) | auto         | -         | hOCR                          |
//! | handwriting | -        | handwriting optimize | single line  | yes       | hOCR, tokens                  |
//! | table       | -        | none                 | auto + OSD   | -         | hOCR, tokens, character boxes |
//! | auto        | true     | none                 | auto + OSD   | -         | hOCR, tokens                  |
//! | auto        | false    | handwriting optimize | single line  | yes       | hOCR, tokens                  |

use super::types::{OutputFormat, RecognitionConfig, SegmentationMode};
use crate::types::{PreprocessingMethod, ProcessingMode};

/// Characters accepted in handwriting recognition: ASCII alphanumerics and common punctuation.
pub const HANDWRITING_WHITELIST: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789.,;:!?'\"-()/&@#%+=";

/// Outcome of parameter selection for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub preprocessing: PreprocessingMethod,
    pub config: RecognitionConfig,
    /// Whether the token table should be turned into a grid.
    pub table_like: bool,
}

impl Selection {
    /// Apply a caller-chosen filter when the mode itself implies none.
    pub fn with_requested_preprocessing(mut self, requested: PreprocessingMethod) -> Self {
        if self.preprocessing.is_none() {
            self.preprocessing = requested;
        }
        self
    }
}

/// Select preprocessing and engine configuration.
///
/// `is_table` only matters for [`ProcessingMode::Auto`].
pub fn select(mode: ProcessingMode, is_table: bool) -> Selection {
    match mode {
        ProcessingMode::Text => Selection {
            preprocessing: PreprocessingMethod::None,
            config: RecognitionConfig::new(SegmentationMode::Auto, [OutputFormat::Hocr]),
            table_like: false,
        },
        ProcessingMode::Handwriting => handwriting(),
        ProcessingMode::Table => Selection {
            preprocessing: PreprocessingMethod::None,
            config: RecognitionConfig::new(
                SegmentationMode::AutoOsd,
                [OutputFormat::Hocr, OutputFormat::TokenTable, OutputFormat::CharacterBoxes],
            ),
            table_like: true,
        },
        ProcessingMode::Auto if is_table => Selection {
            preprocessing: PreprocessingMethod::None,
            config: RecognitionConfig::new(
                SegmentationMode::AutoOsd,
                [OutputFormat::Hocr, OutputFormat::TokenTable],
            ),
            table_like: true,
        },
        ProcessingMode::Auto => handwriting(),
    }
}

fn handwriting() -> Selection {
    Selection {
        preprocessing: PreprocessingMethod::HandwritingOptimize,
        config: RecognitionConfig::new(
            SegmentationMode::SingleLine,
            [OutputFormat::Hocr, OutputFormat::TokenTable],
        )
        .with_whitelist(HANDWRITING_WHITELIST),
        table_like: false,
    }
}
