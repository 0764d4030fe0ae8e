//! Table export formats.
//!
//! All renderings are derived directly from [`ReconstructedTable::grid`] (or
//! `raw_cells` for JSON) without realigning columns, so ragged rows stay
//! ragged. Markdown is the only format that pads rows, because GFM tables
//! require a fixed width.
//!
//! # Output Format
//!
//! ```markdown
//! | Name | Qty |
//! |------|------|
//! | Apple | 3 |
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{OcrResult, ReconstructedTable};
use crate::{GridscanError, Result};

/// Output format for recognition results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Text,
    Csv,
    Json,
    Markdown,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Markdown => "markdown",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = GridscanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(GridscanError::validation(format!(
                "Invalid format: '{}'. Must be one of: text, csv, json, markdown",
                other
            ))),
        }
    }
}

/// Tab-separated cells, one row per line.
pub fn to_text(table: &ReconstructedTable) -> String {
    table
        .grid
        .iter()
        .map(|row| row.join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// CSV with RFC 4180 quoting, one record per row.
pub fn to_csv(table: &ReconstructedTable) -> String {
    let mut out = String::new();
    for row in &table.grid {
        let record: Vec<String> = row.iter().map(|cell| csv_field(cell)).collect();
        out.push_str(&record.join(","));
        out.push_str("\r\n");
    }
    out
}

fn csv_field(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Pretty JSON with both the grid and the positioned raw cells.
pub fn to_json(table: &ReconstructedTable) -> Result<String> {
    Ok(serde_json::to_string_pretty(table)?)
}

/// GitHub-flavored Markdown table. The first row is the header.
pub fn to_markdown(table: &ReconstructedTable) -> String {
    let width = table.max_columns();
    if width == 0 {
        return String::new();
    }

    let mut markdown = String::new();
    for (idx, row) in table.grid.iter().enumerate() {
        markdown.push('|');
        for col in 0..width {
            let cell = row.get(col).map(String::as_str).unwrap_or("");
            markdown.push(' ');
            markdown.push_str(&cell.replace('|', "\\|"));
            markdown.push_str(" |");
        }
        markdown.push('\n');

        if idx == 0 {
            markdown.push('|');
            for _ in 0..width {
                markdown.push_str("------|");
            }
            markdown.push('\n');
        }
    }

    markdown
}

/// Render a whole result.
///
/// `Text` and `Json` always work; `Csv` and `Markdown` need a reconstructed table.
pub fn render_result(result: &OcrResult, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Text => Ok(result.text.clone()),
        ExportFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        ExportFormat::Csv | ExportFormat::Markdown => {
            let table = result.table.as_ref().ok_or_else(|| {
                GridscanError::validation(format!(
                    "No table was reconstructed, {} export needs mode 'table' or 'auto'",
                    format
                ))
            })?;
            Ok(match format {
                ExportFormat::Csv => to_csv(table),
                _ => to_markdown(table),
            })
        }
    }
}
