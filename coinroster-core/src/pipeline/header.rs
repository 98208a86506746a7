//! Header reconciliation for the merged sheet

use super::{MergedSheet, NormalizeStep};
use crate::config::NormalizeConfig;
use crate::reader::CellValue;
use crate::report::NormalizeReport;

/// Drops row 1 of the merged sheet, the title row contributed by the first sheet
pub struct TitleRowDiscard;

impl NormalizeStep for TitleRowDiscard {
    fn id(&self) -> &str {
        "TITLE"
    }

    fn name(&self) -> &str {
        "Discard title row"
    }

    fn apply(&self, sheet: &mut MergedSheet, _report: &mut NormalizeReport) {
        if !sheet.rows.is_empty() {
            sheet.rows.remove(0);
        }
    }
}

/// Forces row 1 to carry the canonical header labels
pub struct HeaderReconciler {
    canonical: Vec<String>,
}

impl HeaderReconciler {
    pub fn new(config: &NormalizeConfig) -> Self {
        Self {
            canonical: config.canonical_header.clone(),
        }
    }

    /// Pairs row 1 with the canonical labels over the shorter of the two.
    /// Row 1 is read at the sheet's full width (at least one column), so
    /// trailing empties count and an empty sheet mismatches.
    pub fn is_mismatch(&self, sheet: &MergedSheet) -> bool {
        let width = sheet.width().max(1);
        (1..=width)
            .zip(self.canonical.iter())
            .any(|(col, label)| !matches_label(sheet.cell(1, col), label))
    }
}

fn matches_label(cell: &CellValue, label: &str) -> bool {
    cell.as_text() == Some(label)
}

impl NormalizeStep for HeaderReconciler {
    fn id(&self) -> &str {
        "HEADER"
    }

    fn name(&self) -> &str {
        "Reconcile header row"
    }

    fn apply(&self, sheet: &mut MergedSheet, report: &mut NormalizeReport) {
        if !self.is_mismatch(sheet) {
            return;
        }

        for (idx, label) in self.canonical.iter().enumerate() {
            sheet.set_cell(1, idx + 1, CellValue::Text(label.clone()));
        }
        report.header_replaced = true;
        log::info!("header row replaced with canonical labels");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CANONICAL_HEADER;
    use crate::reader::Row;

    fn canonical_row() -> Row {
        CANONICAL_HEADER.iter().map(|s| CellValue::from(*s)).collect()
    }

    fn reconciler() -> HeaderReconciler {
        HeaderReconciler::new(&NormalizeConfig::default())
    }

    #[test]
    fn test_title_row_discard() {
        let mut sheet = MergedSheet::new("m", vec![vec!["title".into()], vec!["h".into()]]);
        let mut report = NormalizeReport::default();
        TitleRowDiscard.apply(&mut sheet, &mut report);
        assert_eq!(sheet.rows, vec![vec![CellValue::from("h")]]);

        let mut empty = MergedSheet::default();
        TitleRowDiscard.apply(&mut empty, &mut report);
        assert_eq!(empty.row_count(), 0);
    }

    #[test]
    fn test_matching_header_is_left_alone() {
        let mut row = canonical_row();
        row.push("extra".into());
        let mut sheet = MergedSheet::new("m", vec![row.clone()]);
        let mut report = NormalizeReport::default();

        reconciler().apply(&mut sheet, &mut report);
        assert_eq!(sheet.rows[0], row);
        assert!(!report.header_replaced);
    }

    #[test]
    fn test_mismatch_overwrites_first_five_only() {
        let mut sheet = MergedSheet::new(
            "m",
            vec![vec![
                "x".into(),
                "y".into(),
                CellValue::Empty,
                CellValue::Empty,
                CellValue::Empty,
                "notes".into(),
            ]],
        );
        let mut report = NormalizeReport::default();

        reconciler().apply(&mut sheet, &mut report);
        let mut expected = canonical_row();
        expected.push("notes".into());
        assert_eq!(sheet.rows[0], expected);
        assert!(report.header_replaced);
    }

    #[test]
    fn test_short_matching_prefix_is_not_a_mismatch() {
        // Only two columns wide: comparison stops after 学号
        let mut sheet = MergedSheet::new("m", vec![vec!["姓名".into(), "学号".into()]]);
        let mut report = NormalizeReport::default();

        reconciler().apply(&mut sheet, &mut report);
        assert_eq!(sheet.rows[0].len(), 2);
        assert!(!report.header_replaced);
    }

    #[test]
    fn test_numeric_header_cell_mismatches() {
        let mut row = canonical_row();
        row[1] = CellValue::Number(1.0);
        let sheet = MergedSheet::new("m", vec![row]);
        assert!(reconciler().is_mismatch(&sheet));
    }

    #[test]
    fn test_empty_sheet_gets_header() {
        let mut sheet = MergedSheet::default();
        let mut report = NormalizeReport::default();
        reconciler().apply(&mut sheet, &mut report);
        assert_eq!(sheet.rows, vec![canonical_row()]);
    }

    #[test]
    fn test_idempotent() {
        let mut once = MergedSheet::new(
            "m",
            vec![vec!["x".into(), "学号".into()], vec!["Alice".into()]],
        );
        let mut report = NormalizeReport::default();
        reconciler().apply(&mut once, &mut report);

        let mut twice = once.clone();
        reconciler().apply(&mut twice, &mut report);
        assert_eq!(once.rows[0], twice.rows[0]);
        assert_eq!(once, twice);
    }
}
