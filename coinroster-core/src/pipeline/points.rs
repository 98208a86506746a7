//! Points column reconciliation
//!
//! Some rosters record the authoritative balance under "remaining points"
//! (column E) instead of "points issued" (column D). From row 3 on, a present
//! E value is copied into D; E itself is never changed.

use super::{FIRST_DATA_ROW, MergedSheet, NormalizeStep, POINTS_ISSUED_COL, POINTS_REMAINING_COL};
use crate::report::NormalizeReport;

pub struct PointsReconciler;

impl NormalizeStep for PointsReconciler {
    fn id(&self) -> &str {
        "POINTS"
    }

    fn name(&self) -> &str {
        "Prefer remaining points over issued points"
    }

    fn apply(&self, sheet: &mut MergedSheet, report: &mut NormalizeReport) {
        let mut reconciled = 0;

        for row in FIRST_DATA_ROW..=sheet.row_count() {
            let remaining = sheet.cell(row, POINTS_REMAINING_COL);
            // Zero and empty strings count as present; only absence keeps D
            if remaining.is_empty() {
                continue;
            }
            let remaining = remaining.clone();
            sheet.set_cell(row, POINTS_ISSUED_COL, remaining);
            reconciled += 1;
        }

        report.points_reconciled += reconciled;
        log::info!("points taken from remaining column for {} row(s)", reconciled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{CellValue, Row};

    fn data_row(d: CellValue, e: CellValue) -> Row {
        vec!["n".into(), "id".into(), "c".into(), d, e]
    }

    #[test]
    fn test_remaining_overrides_issued() {
        let mut sheet = MergedSheet::new(
            "m",
            vec![
                vec!["header".into()],
                data_row(CellValue::Number(1.0), CellValue::Number(9.0)),
                data_row(CellValue::Number(10.0), CellValue::Empty),
                data_row(CellValue::Empty, CellValue::Number(5.0)),
                data_row(CellValue::Number(3.0), CellValue::Number(0.0)),
                data_row(CellValue::Number(3.0), CellValue::from("")),
                data_row(CellValue::Empty, CellValue::Empty),
            ],
        );
        let original = sheet.clone();
        let mut report = NormalizeReport::default();

        PointsReconciler.apply(&mut sheet, &mut report);

        // Row 2 is not processed
        assert_eq!(sheet.cell(2, 4), &CellValue::Number(1.0));
        assert_eq!(sheet.cell(3, 4), &CellValue::Number(10.0));
        assert_eq!(sheet.cell(4, 4), &CellValue::Number(5.0));
        assert_eq!(sheet.cell(5, 4), &CellValue::Number(0.0));
        assert_eq!(sheet.cell(6, 4), &CellValue::from(""));
        assert_eq!(sheet.cell(7, 4), &CellValue::Empty);
        assert_eq!(report.points_reconciled, 3);

        for row in 1..=sheet.row_count() {
            assert_eq!(sheet.cell(row, 5), original.cell(row, 5));
        }
    }

    #[test]
    fn test_short_rows_are_untouched() {
        let short = vec![CellValue::from("only name")];
        let mut sheet = MergedSheet::new("m", vec![vec![], vec![], short.clone()]);
        let mut report = NormalizeReport::default();

        PointsReconciler.apply(&mut sheet, &mut report);
        assert_eq!(sheet.rows[2], short);
        assert_eq!(report.points_reconciled, 0);
    }
}
