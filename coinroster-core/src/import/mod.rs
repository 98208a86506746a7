//! Roster import: upsert student accounts from an import workbook
//!
//! The import sheet is the first sheet of a freshly uploaded workbook. Row 1
//! holds the labels, every following row is one student. Fields are looked up
//! by label, the student id is the upsert key, and the whole batch commits in
//! one transaction.

pub mod sqlite;
pub mod store;

use std::collections::HashMap;

use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::reader::{CellValue, EMPTY_CELL, Row, Workbook};
use crate::report::ImportTally;

pub use sqlite::SqliteStore;
pub use store::{MemoryStore, StudentAccount, StudentStore, StudentTransaction};

/// One roster row as extracted for import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub student_id: String,
    pub name: String,
    pub college: String,
    pub points_issued: i64,
    pub points_remaining: i64,
}

/// Column positions of the import fields, resolved from the header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldColumns {
    pub name: usize,
    pub student_id: usize,
    pub college: usize,
    pub points_issued: usize,
    pub points_remaining: usize,
}

impl FieldColumns {
    /// Resolve the field labels against a header row. `labels` are given in
    /// field order: name, student id, college, points issued, points remaining.
    /// When a label occurs more than once the last occurrence wins.
    pub fn resolve(header: &Row, labels: &[String]) -> Result<Self, ImportError> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for (col, cell) in header.iter().enumerate() {
            if let Some(label) = cell.as_text() {
                positions.insert(label, col);
            }
        }

        let lookup = |idx: usize| -> Result<usize, ImportError> {
            let label = labels.get(idx).ok_or_else(|| {
                ImportError::MissingRequiredColumn(format!("field #{}", idx + 1))
            })?;
            positions
                .get(label.as_str())
                .copied()
                .ok_or_else(|| ImportError::MissingRequiredColumn(label.clone()))
        };

        Ok(Self {
            name: lookup(0)?,
            student_id: lookup(1)?,
            college: lookup(2)?,
            points_issued: lookup(3)?,
            points_remaining: lookup(4)?,
        })
    }

    /// Extract a record; `None` when the student id is blank
    pub fn extract(&self, row: &Row) -> Option<ImportRecord> {
        let cell = |col: usize| row.get(col).unwrap_or(&EMPTY_CELL);

        let student_id = cell(self.student_id);
        if student_id.is_blank() {
            return None;
        }

        Some(ImportRecord {
            student_id: student_id.to_string(),
            name: cell(self.name).to_string(),
            college: cell(self.college).to_string(),
            points_issued: parse_points(cell(self.points_issued)),
            points_remaining: parse_points(cell(self.points_remaining)),
        })
    }
}

/// Points as a whole number; blank or unparsable values count as 0
pub fn parse_points(value: &CellValue) -> i64 {
    match value {
        CellValue::Empty => 0,
        CellValue::Number(n) if n.is_finite() => n.trunc() as i64,
        CellValue::Number(_) => 0,
        CellValue::Boolean(b) => i64::from(*b),
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return 0;
            }
            trimmed.parse().unwrap_or_else(|_| {
                log::debug!("non-numeric points value '{}' defaulted to 0", s);
                0
            })
        }
    }
}

/// Upsert every roster row of the workbook's first sheet into `store`
pub fn import_workbook(
    workbook: &Workbook,
    store: &mut dyn StudentStore,
    config: &ImportConfig,
) -> Result<ImportTally, ImportError> {
    let sheet = workbook
        .sheets
        .first()
        .ok_or_else(|| ImportError::UnreadableWorkbook("workbook contains no sheets".into()))?;

    let header = sheet.rows.first().cloned().unwrap_or_default();
    let columns = FieldColumns::resolve(&header, &config.required_headers)?;

    let mut tally = ImportTally::default();
    let mut tx = store.transaction()?;

    for (idx, row) in sheet.rows.iter().enumerate().skip(1) {
        let Some(record) = columns.extract(row) else {
            log::warn!("row {}: blank student id, skipped", idx + 1);
            tally.fail_count += 1;
            continue;
        };

        match tx.find(&record.student_id)? {
            Some(mut account) => {
                account.name = record.name;
                account.college = record.college;
                account.points = record.points_issued;
                account.remaining_points = record.points_remaining;
                tx.update(&account)?;
            }
            None => {
                let account = StudentAccount {
                    password: record.student_id.clone(),
                    student_id: record.student_id,
                    is_admin: false,
                    name: record.name,
                    gender: config.default_gender.clone(),
                    college: record.college,
                    points: record.points_issued,
                    remaining_points: record.points_remaining,
                };
                tx.insert(&account)?;
            }
        }
        tally.success_count += 1;
    }

    tx.commit()?;
    log::info!(
        "import committed: {} succeeded, {} failed",
        tally.success_count,
        tally.fail_count
    );
    Ok(tally)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CANONICAL_HEADER;
    use crate::error::SinkError;
    use crate::reader::Sheet;

    fn header() -> Row {
        CANONICAL_HEADER.iter().map(|s| CellValue::from(*s)).collect()
    }

    fn roster(rows: Vec<Row>) -> Workbook {
        let mut all = vec![header()];
        all.extend(rows);
        Workbook::new(vec![Sheet::new("Sheet1", all)])
    }

    fn student(name: &str, id: CellValue, college: &str, issued: CellValue, left: CellValue) -> Row {
        vec![name.into(), id, college.into(), issued, left]
    }

    #[test]
    fn test_parse_points() {
        assert_eq!(parse_points(&CellValue::Empty), 0);
        assert_eq!(parse_points(&CellValue::Number(12.9)), 12);
        assert_eq!(parse_points(&CellValue::Number(-1.5)), -1);
        assert_eq!(parse_points(&CellValue::from(" 42 ")), 42);
        assert_eq!(parse_points(&CellValue::from("lots")), 0);
        assert_eq!(parse_points(&CellValue::from("")), 0);
        assert_eq!(parse_points(&CellValue::Boolean(true)), 1);
        assert_eq!(parse_points(&CellValue::Number(f64::NAN)), 0);
    }

    #[test]
    fn test_creates_with_defaults() {
        let workbook = roster(vec![student(
            "Alice",
            CellValue::Number(1001.0),
            "CS",
            CellValue::Number(10.0),
            CellValue::Empty,
        )]);
        let mut store = MemoryStore::new();

        let tally = import_workbook(&workbook, &mut store, &ImportConfig::default()).unwrap();
        assert_eq!(tally, ImportTally { success_count: 1, fail_count: 0 });

        let alice = store.get("1001").unwrap();
        assert_eq!(alice.password, "1001");
        assert!(!alice.is_admin);
        assert_eq!(alice.gender, "male");
        assert_eq!(alice.college, "CS");
        assert_eq!(alice.points, 10);
        assert_eq!(alice.remaining_points, 0);
    }

    #[test]
    fn test_upsert_law() {
        let mut store = MemoryStore::new();
        let config = ImportConfig::default();

        let first = roster(vec![student(
            "Bob",
            "002".into(),
            "EE",
            CellValue::Number(1.0),
            CellValue::Number(1.0),
        )]);
        let second = roster(vec![student(
            "Robert",
            "002".into(),
            "Physics",
            CellValue::Number(8.0),
            CellValue::Number(3.0),
        )]);

        assert_eq!(import_workbook(&first, &mut store, &config).unwrap().success_count, 1);
        assert_eq!(import_workbook(&second, &mut store, &config).unwrap().success_count, 1);

        assert_eq!(store.len(), 1);
        let bob = store.get("002").unwrap();
        assert_eq!(bob.name, "Robert");
        assert_eq!(bob.college, "Physics");
        assert_eq!((bob.points, bob.remaining_points), (8, 3));
    }

    #[test]
    fn test_blank_student_id_counts_as_failure() {
        let workbook = roster(vec![
            student("Nobody", CellValue::Empty, "CS", CellValue::Empty, CellValue::Empty),
            student("Ghost", "".into(), "CS", CellValue::Empty, CellValue::Empty),
            student("Carol", "003".into(), "Math", CellValue::Empty, CellValue::Empty),
        ]);
        let mut store = MemoryStore::new();

        let tally = import_workbook(&workbook, &mut store, &ImportConfig::default()).unwrap();
        assert_eq!(tally, ImportTally { success_count: 1, fail_count: 2 });
        assert_eq!(store.len(), 1);
        assert!(store.get("003").is_some());
    }

    #[test]
    fn test_columns_found_by_label() {
        // Shuffled header with an extra column
        let header: Row = vec![
            "备注".into(),
            "学号".into(),
            "剩余爱心币".into(),
            "姓名".into(),
            "爱心币数量".into(),
            "学院".into(),
        ];
        let row: Row = vec![
            "note".into(),
            "007".into(),
            CellValue::Number(2.0),
            "Dan".into(),
            CellValue::Number(9.0),
            "Art".into(),
        ];
        let workbook = Workbook::new(vec![Sheet::new("s", vec![header, row])]);
        let mut store = MemoryStore::new();

        import_workbook(&workbook, &mut store, &ImportConfig::default()).unwrap();
        let dan = store.get("007").unwrap();
        assert_eq!(dan.name, "Dan");
        assert_eq!(dan.college, "Art");
        assert_eq!((dan.points, dan.remaining_points), (9, 2));
    }

    #[test]
    fn test_missing_column_aborts_before_any_row() {
        let mut partial = header();
        partial.truncate(4);
        let workbook = Workbook::new(vec![Sheet::new(
            "s",
            vec![partial, student("A", "1".into(), "CS", CellValue::Empty, CellValue::Empty)],
        )]);
        let mut store = MemoryStore::new();

        let err = import_workbook(&workbook, &mut store, &ImportConfig::default()).unwrap_err();
        assert!(matches!(err, ImportError::MissingRequiredColumn(ref c) if c == "剩余爱心币"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_missing_columns_reported_in_field_order() {
        let header: Row = vec!["学院".into(), CellValue::Number(1.0), "姓名".into()];
        let labels = ImportConfig::default().required_headers;

        let err = FieldColumns::resolve(&header, &labels).unwrap_err();
        assert!(matches!(err, ImportError::MissingRequiredColumn(ref c) if c == "学号"));

        let empty = Workbook::new(vec![Sheet::new("s", Vec::new())]);
        let mut store = MemoryStore::new();
        let err = import_workbook(&empty, &mut store, &ImportConfig::default()).unwrap_err();
        assert!(matches!(err, ImportError::MissingRequiredColumn(ref c) if c == "姓名"));
    }

    /// Store whose transactions fail on the n-th insert
    struct FlakyStore {
        inner: MemoryStore,
        fail_on_insert: usize,
    }

    struct FlakyTransaction<'a> {
        inner: Box<dyn StudentTransaction + 'a>,
        remaining: usize,
    }

    impl StudentStore for FlakyStore {
        fn transaction(&mut self) -> Result<Box<dyn StudentTransaction + '_>, SinkError> {
            let remaining = self.fail_on_insert;
            Ok(Box::new(FlakyTransaction {
                inner: self.inner.transaction()?,
                remaining,
            }))
        }
    }

    impl StudentTransaction for FlakyTransaction<'_> {
        fn find(&self, student_id: &str) -> Result<Option<StudentAccount>, SinkError> {
            self.inner.find(student_id)
        }

        fn insert(&mut self, account: &StudentAccount) -> Result<(), SinkError> {
            self.remaining -= 1;
            if self.remaining == 0 {
                return Err(SinkError::Rejected("disk full".into()));
            }
            self.inner.insert(account)
        }

        fn update(&mut self, account: &StudentAccount) -> Result<(), SinkError> {
            self.inner.update(account)
        }

        fn commit(self: Box<Self>) -> Result<(), SinkError> {
            self.inner.commit()
        }
    }

    #[test]
    fn test_sink_failure_rolls_back_whole_batch() {
        let workbook = roster(vec![
            student("A", "1".into(), "CS", CellValue::Empty, CellValue::Empty),
            student("B", "2".into(), "CS", CellValue::Empty, CellValue::Empty),
            student("C", "3".into(), "CS", CellValue::Empty, CellValue::Empty),
        ]);
        let mut store = FlakyStore {
            inner: MemoryStore::new(),
            fail_on_insert: 3,
        };

        let err = import_workbook(&workbook, &mut store, &ImportConfig::default()).unwrap_err();
        assert!(matches!(err, ImportError::SinkWriteFailure(_)));
        assert!(err.to_string().contains("disk full"));
        assert!(store.inner.is_empty());
    }
}
