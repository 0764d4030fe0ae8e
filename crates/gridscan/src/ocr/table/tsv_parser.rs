use crate::types::{BoundingBox, Token};

/// TSV level of word records.
pub const TSV_WORD_LEVEL: u32 = 5;
/// Records with fewer fields are malformed and skipped.
pub const TSV_MIN_FIELDS: usize = 5;

/// Column positions inside a TSV record.
#[derive(Debug, Clone, Copy)]
struct Columns {
    level: Option<usize>,
    left: Option<usize>,
    top: Option<usize>,
    width: Option<usize>,
    height: Option<usize>,
    conf: Option<usize>,
    text: Option<usize>,
}

impl Columns {
    /// Tesseract's fixed layout: level page_num block_num par_num line_num word_num left top width height conf text
    const TESSERACT: Columns = Columns {
        level: Some(0),
        left: Some(6),
        top: Some(7),
        width: Some(8),
        height: Some(9),
        conf: Some(10),
        text: Some(11),
    };

    fn from_header(header: &[&str]) -> Self {
        let find = |name: &str| header.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
        Self {
            level: find("level"),
            left: find("left"),
            top: find("top"),
            width: find("width"),
            height: find("height"),
            conf: find("conf"),
            text: find("text"),
        }
    }
}

fn is_header(fields: &[&str]) -> bool {
    fields.first().is_some_and(|f| f.trim().parse::<i64>().is_err())
}

fn position(fields: &[&str], column: Option<usize>) -> u32 {
    column
        .and_then(|idx| fields.get(idx))
        .and_then(|value| value.trim().parse::<i64>().ok())
        .map(|value| value.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(0)
}

/// Extract word tokens from engine TSV output.
///
/// A header line, when present, decides the column layout; otherwise
/// Tesseract's layout is assumed. Records with fewer than
/// [`TSV_MIN_FIELDS`] fields or without text are skipped, as are non-word
/// levels and tokens below `min_confidence`. Missing or non-numeric position
/// and confidence fields become `0`; such positions sort into the first row.
pub fn extract_tokens_from_tsv(tsv_data: &str, min_confidence: f64) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut columns = Columns::TESSERACT;
    let mut skipped = 0usize;

    for (line_num, line) in tsv_data.lines().enumerate() {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();

        if line_num == 0 && is_header(&fields) {
            columns = Columns::from_header(&fields);
            continue;
        }

        if fields.len() < TSV_MIN_FIELDS {
            skipped += 1;
            continue;
        }

        if let Some(level_idx) = columns.level {
            let level = fields
                .get(level_idx)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(0);
            if level != TSV_WORD_LEVEL {
                continue;
            }
        }

        let conf = columns
            .conf
            .and_then(|idx| fields.get(idx))
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(0.0);
        if conf < min_confidence {
            continue;
        }

        let text = match columns.text.and_then(|idx| fields.get(idx)) {
            Some(text) if !text.trim().is_empty() => text.trim(),
            _ => continue,
        };

        tokens.push(Token {
            text: text.to_string(),
            confidence: conf.clamp(0.0, 100.0),
            bounding_box: BoundingBox {
                x: position(&fields, columns.left),
                y: position(&fields, columns.top),
                width: position(&fields, columns.width),
                height: position(&fields, columns.height),
            },
        });
    }

    if skipped > 0 {
        tracing::debug!(skipped, "Skipped malformed TSV records");
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_tokens_basic() {
        let tsv = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
5\t1\t0\t0\t0\t0\t100\t50\t80\t30\t95.5\tHello
5\t1\t0\t0\t0\t1\t190\t50\t70\t30\t92.3\tWorld";

        let tokens = extract_tokens_from_tsv(tsv, 0.0);
        assert_eq!(tokens.len(), 2);

        assert_eq!(tokens[0].text, "Hello");
        assert_eq!(tokens[0].bounding_box, BoundingBox::new(100, 50, 80, 30));
        assert_eq!(tokens[0].confidence, 95.5);

        assert_eq!(tokens[1].text, "World");
        assert_eq!(tokens[1].bounding_box.x, 190);
    }

    #[test]
    fn test_extract_tokens_confidence_filter() {
        let tsv = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
5\t1\t0\t0\t0\t0\t100\t50\t80\t30\t95.5\tHello
5\t1\t0\t0\t0\t1\t190\t50\t70\t30\t50.0\tWorld
5\t1\t0\t0\t0\t2\t270\t50\t60\t30\t92.3\tTest";

        let tokens = extract_tokens_from_tsv(tsv, 90.0);
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello", "Test"]);
    }

    #[test]
    fn test_extract_tokens_level_filter() {
        let tsv = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
3\t1\t0\t0\t0\t0\t100\t50\t80\t30\t-1\t
5\t1\t0\t0\t0\t0\t100\t50\t80\t30\t95.5\tHello
4\t1\t0\t0\t0\t1\t190\t50\t70\t30\t-1\t";

        let tokens = extract_tokens_from_tsv(tsv, 0.0);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "Hello");
    }

    #[test]
    fn test_extract_tokens_skips_empty_text() {
        let tsv = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
5\t1\t0\t0\t0\t0\t100\t50\t80\t30\t95.5\t
5\t1\t0\t0\t0\t1\t190\t50\t70\t30\t92.3\tWorld";

        let tokens = extract_tokens_from_tsv(tsv, 0.0);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "World");
    }

    #[test]
    fn test_extract_tokens_skips_short_records() {
        let tsv = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
5\t1\t0
invalid line
5\t1\t0\t0\t0\t1\t190\t50\t70\t30\t92.3\tWorld";

        let tokens = extract_tokens_from_tsv(tsv, 0.0);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "World");
    }

    #[test]
    fn test_non_numeric_positions_become_zero() {
        let tsv = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
5\t1\t0\t0\t0\t0\tx\t?\t80\tNaN\t90\tSkewed";

        let tokens = extract_tokens_from_tsv(tsv, 0.0);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].bounding_box, BoundingBox::new(0, 0, 80, 0));
    }

    #[test]
    fn test_non_numeric_confidence_becomes_zero() {
        let tokens = extract_tokens_from_tsv("5\t1\t1\t1\t1\t1\t10\t20\t30\t40\tx\tCell", 0.0);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "Cell");
        assert_eq!(tokens[0].confidence, 0.0);
        assert_eq!(tokens[0].bounding_box, BoundingBox::new(10, 20, 30, 40));
    }

    #[test]
    fn test_headerless_input_uses_tesseract_layout() {
        let tsv = "5\t1\t1\t1\t1\t1\t10\t20\t30\t40\t88\tCell";
        let tokens = extract_tokens_from_tsv(tsv, 0.0);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].bounding_box, BoundingBox::new(10, 20, 30, 40));
    }

    #[test]
    fn test_custom_header_layout() {
        let tsv = "text\tleft\ttop\twidth\theight\tconf
Alpha\t5\t6\t7\t8\t99";
        let tokens = extract_tokens_from_tsv(tsv, 0.0);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "Alpha");
        assert_eq!(tokens[0].bounding_box, BoundingBox::new(5, 6, 7, 8));
    }

    #[test]
    fn test_negative_positions_clamped() {
        let tsv = "5\t1\t1\t1\t1\t1\t-4\t20\t30\t40\t88\tEdge";
        let tokens = extract_tokens_from_tsv(tsv, 0.0);
        assert_eq!(tokens[0].bounding_box.x, 0);
    }
}
