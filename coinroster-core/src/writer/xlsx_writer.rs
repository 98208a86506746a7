// ! XLSX writer for the merged roster sheet

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::Path;

use crate::pipeline::MergedSheet;
use crate::reader::CellValue;

/// Build an in-memory xlsx workbook holding the merged sheet
fn build_workbook(sheet: &MergedSheet) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(&sheet.name)
        .with_context(|| format!("Invalid sheet name: {}", sheet.name))?;

    for (row_idx, row) in sheet.rows.iter().enumerate() {
        let row_num = u32::try_from(row_idx).context("Too many rows for an xlsx sheet")?;
        for (col_idx, value) in row.iter().enumerate() {
            let col_num = u16::try_from(col_idx).context("Too many columns for an xlsx sheet")?;
            write_value(worksheet, row_num, col_num, value)?;
        }
    }

    Ok(workbook)
}

/// Write the merged sheet to an xlsx file
pub fn write_xlsx(sheet: &MergedSheet, path: &Path) -> Result<()> {
    let mut workbook = build_workbook(sheet)?;
    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;
    Ok(())
}

fn write_value(ws: &mut Worksheet, row: u32, col: u16, value: &CellValue) -> Result<()> {
    match value {
        CellValue::Empty => { /* Leave cell empty */ }
        CellValue::Text(s) => {
            ws.write_string(row, col, s)?;
        }
        CellValue::Number(n) => {
            ws.write_number(row, col, *n)?;
        }
        CellValue::Boolean(b) => {
            ws.write_boolean(row, col, *b)?;
        }
    }
    Ok(())
}
