//! Normalization steps applied to the merged roster sheet
//!
//! The merged sheet is built once by [`merge::merge_sheets`] and then mutated in
//! place by each [`NormalizeStep`] in registry order.

pub mod filter;
pub mod header;
pub mod merge;
pub mod points;
pub mod registry;

use crate::reader::{CellValue, EMPTY_CELL, Row};
use crate::report::NormalizeReport;

/// First row (1-based) that the points reconciler and the row filters touch.
/// Rows 1 and 2 are never processed by either.
pub const FIRST_DATA_ROW: usize = 3;

/// Column D, issued points (1-based)
pub const POINTS_ISSUED_COL: usize = 4;

/// Column E, remaining points (1-based)
pub const POINTS_REMAINING_COL: usize = 5;

/// Trait that all normalization steps must implement
pub trait NormalizeStep: Send + Sync {
    /// Unique step identifier (e.g., "HEADER")
    fn id(&self) -> &str;

    /// Human-readable step name
    fn name(&self) -> &str;

    /// Mutate the sheet and record what happened in the report
    fn apply(&self, sheet: &mut MergedSheet, report: &mut NormalizeReport);
}

/// The single working sheet produced by concatenating every source sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedSheet {
    pub name: String,
    pub rows: Vec<Row>,
}

impl MergedSheet {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row in the sheet
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Row by 1-based number
    pub fn row(&self, row: usize) -> Option<&Row> {
        row.checked_sub(1).and_then(|idx| self.rows.get(idx))
    }

    /// Cell by 1-based row and column; cells past a row's end read as empty
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.row(row)
            .and_then(|r| col.checked_sub(1).and_then(|idx| r.get(idx)))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Set a cell by 1-based row and column, padding the row with empties.
    /// Rows past the end of the sheet are created.
    pub fn set_cell(&mut self, row: usize, col: usize, value: CellValue) {
        assert!(row >= 1 && col >= 1, "cell coordinates are 1-based");
        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let cells = &mut self.rows[row - 1];
        if cells.len() < col {
            cells.resize(col, CellValue::Empty);
        }
        cells[col - 1] = value;
    }

    /// Keep rows 1-2 and every later row for which `keep` is true; returns how
    /// many rows were dropped.
    pub fn retain_data_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Row) -> bool,
    {
        let before = self.rows.len();
        let mut number = 0;
        self.rows.retain(|row| {
            number += 1;
            number < FIRST_DATA_ROW || keep(row)
        });
        before - self.rows.len()
    }
}
