//! Summaries handed back to callers after a run

use serde::{Deserialize, Serialize};

/// Outcome of normalizing one workbook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeReport {
    /// Sheets in the source workbook
    pub original_sheets: usize,
    /// Rows in the merged sheet after filtering, header included
    pub total_rows: usize,
    /// Rows dropped because a cell contained the exclusion substring
    pub deleted_rows: usize,
    /// Rows dropped because every cell was blank
    pub blank_rows_removed: usize,
    /// Whether row 1 was overwritten with the canonical header
    pub header_replaced: bool,
    /// Rows whose issued points were taken from the remaining-points column
    pub points_reconciled: usize,
}

/// Success/failure counts of a roster import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportTally {
    pub success_count: usize,
    pub fail_count: usize,
}
