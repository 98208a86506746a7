//! Concatenate every sheet of a workbook into one working sheet

use super::MergedSheet;
use crate::reader::Workbook;

/// Merge all sheets: every row of the first sheet, then each later sheet
/// without its header row, in sheet order.
pub fn merge_sheets(workbook: &Workbook, name: &str) -> MergedSheet {
    let mut rows = Vec::new();

    for (index, sheet) in workbook.sheets.iter().enumerate() {
        let skip = if index == 0 { 0 } else { 1 };
        rows.extend(sheet.rows.iter().skip(skip).cloned());
        log::debug!(
            "merged sheet '{}' ({} rows, {} skipped)",
            sheet.name,
            sheet.rows.len(),
            skip.min(sheet.rows.len())
        );
    }

    MergedSheet::new(name, rows)
}
