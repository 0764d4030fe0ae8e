use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{GridscanError, Result};

/// A language profile the engine can load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub code: String,
    pub name: String,
}

/// Supported profiles in display order.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("eng", "English"),
    ("deu", "German"),
    ("fra", "French"),
    ("spa", "Spanish"),
    ("ita", "Italian"),
    ("por", "Portuguese"),
    ("chi_sim", "Chinese (Simplified)"),
    ("chi_tra", "Chinese (Traditional)"),
    ("jpn", "Japanese"),
    ("kor", "Korean"),
    ("ara", "Arabic"),
    ("hin", "Hindi"),
    ("rus", "Russian"),
    ("ben", "Bengali"),
    ("tur", "Turkish"),
    ("tha", "Thai"),
    ("swe", "Swedish"),
    ("nor", "Norwegian"),
    ("dan", "Danish"),
    ("fin", "Finnish"),
    ("pol", "Polish"),
    ("ukr", "Ukrainian"),
    ("ell", "Greek"),
    ("heb", "Hebrew"),
    ("osd", "Orientation and Script Detection"),
];

pub const DEFAULT_LANGUAGE: &str = "eng";

lazy_static::lazy_static! {
    static ref LANGUAGE_NAMES: HashMap<&'static str, &'static str> =
        SUPPORTED_LANGUAGES.iter().copied().collect();
}

/// The catalog as owned records, for listing endpoints.
pub fn supported_languages() -> Vec<LanguageInfo> {
    SUPPORTED_LANGUAGES
        .iter()
        .map(|(code, name)| LanguageInfo {
            code: (*code).to_string(),
            name: (*name).to_string(),
        })
        .collect()
}

pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGE_NAMES.get(code).copied()
}

pub fn is_supported(code: &str) -> bool {
    LANGUAGE_NAMES.contains_key(code)
}

/// Validate a language code, allowing `+`-joined combinations like `eng+deu`.
pub fn validate_language_code(lang_code: &str) -> Result<()> {
    if lang_code.trim().is_empty() {
        return Err(GridscanError::validation(
            "Language cannot be empty. Please specify a valid language code (e.g., 'eng')",
        ));
    }

    for code in lang_code.split('+') {
        if !is_supported(code.trim()) {
            return Err(GridscanError::validation(format!(
                "Language code '{}' is not supported",
                code
            )));
        }
    }
    Ok(())
}
