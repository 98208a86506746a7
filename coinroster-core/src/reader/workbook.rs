//! Workbook data structures

use std::fmt;

/// One row of cell values, in column order
pub type Row = Vec<CellValue>;

/// Represents a complete workbook
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Get all sheet names
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Represents a worksheet as an ordered list of rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Number of rows in the sheet
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row in the sheet
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Shared absence marker for reads past the end of a row
pub static EMPTY_CELL: CellValue = CellValue::Empty;

/// Cell value types
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl CellValue {
    /// Check if the cell is the absence marker
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Absent or an empty string
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Get the text if this is a text cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            // Whole numbers print like integers so ids read "1001", not "1001.0"
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Boolean(true) => f.write_str("TRUE"),
            CellValue::Boolean(false) => f.write_str("FALSE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Number(1001.0).to_string(), "1001");
        assert_eq!(CellValue::Number(-3.0).to_string(), "-3");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::Boolean(true).to_string(), "TRUE");
        assert_eq!(CellValue::from("学院").to_string(), "学院");
    }

    #[test]
    fn test_blank() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::from("").is_blank());
        assert!(!CellValue::from(" ").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
        assert!(!CellValue::from("").is_empty());
    }

    #[test]
    fn test_sheet_width() {
        let sheet = Sheet::new(
            "Sheet1",
            vec![vec!["a".into()], vec!["a".into(), "b".into(), CellValue::Empty]],
        );
        assert_eq!(sheet.width(), 3);
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(Sheet::default().width(), 0);
    }
}
