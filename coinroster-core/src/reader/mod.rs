//! Excel/ODS file reader using calamine

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto, open_workbook_auto_from_rs};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use crate::error::NormalizeError;

pub mod workbook;

pub use workbook::{CellValue, EMPTY_CELL, Row, Sheet, Workbook};

/// Read a workbook from a file path
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook, NormalizeError> {
    let path = path.as_ref();
    let mut excel = open_workbook_auto(path).map_err(|e| {
        NormalizeError::UnreadableWorkbook(format!("{}: {}", path.display(), e))
    })?;
    let workbook = load_sheets(&mut excel)?;
    log::debug!(
        "read {} sheet(s) from {}",
        workbook.sheets.len(),
        path.display()
    );
    Ok(workbook)
}

/// Read a workbook from an uploaded byte buffer
pub fn read_workbook_from_bytes(bytes: &[u8]) -> Result<Workbook, NormalizeError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut excel = open_workbook_auto_from_rs(cursor)
        .map_err(|e| NormalizeError::UnreadableWorkbook(e.to_string()))?;
    load_sheets(&mut excel)
}

fn load_sheets<RS: Read + Seek>(excel: &mut Sheets<RS>) -> Result<Workbook, NormalizeError> {
    let sheet_names = excel.sheet_names();
    if sheet_names.is_empty() {
        return Err(NormalizeError::UnreadableWorkbook(
            "workbook contains no sheets".to_string(),
        ));
    }

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for sheet_name in &sheet_names {
        let range = excel.worksheet_range(sheet_name).map_err(|e| {
            NormalizeError::UnreadableWorkbook(format!("sheet '{}': {}", sheet_name, e))
        })?;
        sheets.push(parse_sheet(sheet_name, &range));
    }

    Ok(Workbook::new(sheets))
}

/// calamine ranges start at the first used cell; pad back to A1 so row and
/// column numbers match what the user sees in Excel
fn parse_sheet(name: &str, range: &Range<Data>) -> Sheet {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Row> = vec![Vec::new(); row_offset];
    rows.extend(range.rows().map(|row| {
        let mut cells = vec![CellValue::Empty; col_offset];
        cells.extend(row.iter().map(parse_cell_value));
        cells
    }));
    Sheet::new(name, rows)
}

fn parse_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}
