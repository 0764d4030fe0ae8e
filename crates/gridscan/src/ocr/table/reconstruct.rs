//! Row/column grid recovery from positioned tokens.
//!
//! Tokens are ordered top-to-bottom, then partitioned into rows with a single
//! scan: a token joins the current row while its `y` stays within
//! `y_tolerance` of the row's anchor, the `y` of the row's first token. The
//! anchor never moves, so a long row does not drift, but a strongly skewed row
//! can split in two. Rows are never merged afterwards and the tolerance is not
//! re-estimated from observed line spacing.
//!
//! Columns are implied by left-to-right order inside a row. There is no
//! column alignment pass, so rows may differ in length.

use crate::types::{ReconstructedTable, Token};

/// Default vertical tolerance in pixels.
pub const DEFAULT_Y_TOLERANCE: u32 = 10;

/// Rebuilds a table grid from engine tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableReconstructor {
    y_tolerance: u32,
}

impl Default for TableReconstructor {
    fn default() -> Self {
        Self::new(DEFAULT_Y_TOLERANCE)
    }
}

impl TableReconstructor {
    pub fn new(y_tolerance: u32) -> Self {
        Self { y_tolerance }
    }

    pub fn y_tolerance(&self) -> u32 {
        self.y_tolerance
    }

    pub fn reconstruct(&self, tokens: &[Token]) -> ReconstructedTable {
        reconstruct_table(tokens, self.y_tolerance)
    }
}

/// Reconstruct a table from tokens.
///
/// Never fails: an empty input, or one where no token carries text, yields an
/// empty table. Tokens without text are dropped; every other token lands in
/// exactly one cell.
pub fn reconstruct_table(tokens: &[Token], y_tolerance: u32) -> ReconstructedTable {
    let mut ordered: Vec<&Token> = tokens.iter().filter(|t| !t.text.trim().is_empty()).collect();

    let dropped = tokens.len() - ordered.len();
    if dropped > 0 {
        tracing::debug!(dropped, "Dropped tokens without text before reconstruction");
    }

    if ordered.is_empty() {
        return ReconstructedTable::default();
    }

    // Stable: tokens sharing a position keep their input order.
    ordered.sort_by_key(|t| (t.bounding_box.y, t.bounding_box.x));

    let mut rows: Vec<Vec<&Token>> = Vec::new();
    let mut anchor_y = 0u32;

    for token in ordered {
        let y = token.bounding_box.y;
        match rows.last_mut() {
            Some(row) if y.abs_diff(anchor_y) <= y_tolerance => row.push(token),
            _ => {
                anchor_y = y;
                rows.push(vec![token]);
            }
        }
    }

    for row in &mut rows {
        row.sort_by_key(|t| t.bounding_box.x);
    }

    let grid = rows
        .iter()
        .map(|row| row.iter().map(|t| t.text.clone()).collect())
        .collect();

    let raw_cells = rows.into_iter().flatten().cloned().collect();

    ReconstructedTable { raw_cells, grid }
}
