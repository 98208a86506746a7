//! Row filters for the merged sheet
//!
//! Both filters rebuild the row list instead of deleting by index, and both
//! only consider rows 3 and later.

use super::{MergedSheet, NormalizeStep};
use crate::config::NormalizeConfig;
use crate::reader::{CellValue, Row};
use crate::report::NormalizeReport;

/// Removes rows where every cell is absent or an empty string
pub struct BlankRowFilter;

pub fn is_blank_row(row: &Row) -> bool {
    row.iter().all(CellValue::is_blank)
}

impl NormalizeStep for BlankRowFilter {
    fn id(&self) -> &str {
        "BLANK"
    }

    fn name(&self) -> &str {
        "Remove blank rows"
    }

    fn apply(&self, sheet: &mut MergedSheet, report: &mut NormalizeReport) {
        let removed = sheet.retain_data_rows(|row| !is_blank_row(row));
        report.blank_rows_removed += removed;
        log::info!("removed {} blank row(s)", removed);
    }
}

/// Removes rows where any cell contains the exclusion substring
pub struct ExclusionFilter {
    needle: String,
}

impl ExclusionFilter {
    pub fn new(config: &NormalizeConfig) -> Self {
        Self {
            needle: config.exclusion_substring.clone(),
        }
    }

    pub fn is_excluded(&self, row: &Row) -> bool {
        row.iter()
            .filter(|cell| !cell.is_empty())
            .any(|cell| cell.to_string().contains(&self.needle))
    }
}

impl NormalizeStep for ExclusionFilter {
    fn id(&self) -> &str {
        "EXCLUDE"
    }

    fn name(&self) -> &str {
        "Remove rows from excluded institutions"
    }

    fn apply(&self, sheet: &mut MergedSheet, report: &mut NormalizeReport) {
        let removed = sheet.retain_data_rows(|row| !self.is_excluded(row));
        report.deleted_rows += removed;
        log::info!(
            "removed {} row(s) containing '{}'",
            removed,
            self.needle
        );
    }
}
