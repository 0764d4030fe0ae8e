//! OCR subsystem.
//!
//! Recognition parameters are chosen per image by [`selector::select`], the
//! engine is reached through the [`engine::OcrEngine`] seam, and token output
//! is turned into a row/column grid by [`table`].
//!
//! # Features
//!
//! - **Parameter selection**: processing mode plus classifier verdict to preprocessing and engine config
//! - **Table reconstruction**: TSV token parsing and anchor-based row grouping
//! - **Language catalog**: supported profiles and `+`-joined code validation
//! - **Tesseract integration**: native backend behind the `tesseract` feature
//!
//! # Example
//!
//! ```rust
//! use gridscan::ocr::{reconstruct_table, select};
//! use gridscan::{BoundingBox, ProcessingMode, Token};
//!
//! let selection = select(ProcessingMode::Table, false);
//! assert!(selection.table_like);
//!
//! let tokens = vec![
//!     Token::new("A", 90.0, BoundingBox::new(0, 0, 10, 10)),
//!     Token::new("B", 90.0, BoundingBox::new(15, 0, 10, 10)),
//!     Token::new("C", 90.0, BoundingBox::new(0, 20, 10, 10)),
//! ];
//! let table = reconstruct_table(&tokens, 10);
//! assert_eq!(table.grid, vec![vec!["A", "B"], vec!["C"]]);
//! ```
pub mod engine;
pub mod languages;
pub mod selector;
pub mod table;
#[cfg(feature = "tesseract")]
pub mod tesseract_backend;
pub mod types;

pub use engine::{EngineOutput, OcrEngine, OcrSession};
pub use languages::{LanguageInfo, supported_languages, validate_language_code};
pub use selector::{HANDWRITING_WHITELIST, Selection, select};
pub use table::{DEFAULT_Y_TOLERANCE, TableReconstructor, extract_tokens_from_tsv, reconstruct_table};
#[cfg(feature = "tesseract")]
pub use tesseract_backend::TesseractBackend;
pub use types::{EngineMode, OutputFormat, RecognitionConfig, SegmentationMode};
