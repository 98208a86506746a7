//! coinroster-core: roster workbook normalization and student import
//!
//! Administrators of the love-coin store upload student rosters as workbooks
//! of inconsistent shape. This library merges every sheet into one canonical
//! sheet (fixed header, reconciled points, blank and excluded rows removed)
//! and imports roster rows into a student store keyed by student id.

pub mod config;
pub mod error;
pub mod import;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod service;
pub mod writer;

use std::path::Path;

pub use config::{AppConfig, NormalizeConfig};
pub use error::{ImportError, NormalizeError, SinkError};
pub use pipeline::{MergedSheet, NormalizeStep};
pub use reader::{CellValue, Sheet, Workbook};
pub use report::{ImportTally, NormalizeReport};

/// Main normalization interface
pub struct Normalizer {
    config: NormalizeConfig,
    steps: Vec<Box<dyn NormalizeStep>>,
}

impl Normalizer {
    /// Create a new normalizer with default configuration
    pub fn new() -> Self {
        Self::with_config(NormalizeConfig::default())
    }

    /// Create a new normalizer with custom configuration
    pub fn with_config(config: NormalizeConfig) -> Self {
        let steps = pipeline::registry::create_steps(&config);
        Self { config, steps }
    }

    /// Merge and clean an in-memory workbook
    pub fn normalize(&self, workbook: &Workbook) -> (MergedSheet, NormalizeReport) {
        let mut sheet = pipeline::merge::merge_sheets(workbook, &self.config.merged_sheet_name);
        let mut report = NormalizeReport {
            original_sheets: workbook.sheets.len(),
            ..NormalizeReport::default()
        };

        for step in &self.steps {
            log::debug!("running step {} ({})", step.id(), step.name());
            step.apply(&mut sheet, &mut report);
        }

        report.total_rows = sheet.row_count();
        log::info!(
            "normalized {} sheet(s) into {} row(s), {} excluded",
            report.original_sheets,
            report.total_rows,
            report.deleted_rows
        );
        (sheet, report)
    }

    /// Read a workbook file and normalize it
    pub fn normalize_file<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(MergedSheet, NormalizeReport), NormalizeError> {
        let workbook = reader::read_workbook(path)?;
        Ok(self.normalize(&workbook))
    }

    /// Normalize `input` and write the processed workbook into `output_dir`,
    /// named `<stem><suffix>.xlsx`. Returns the written path with the report.
    pub fn process_file(
        &self,
        input: &Path,
        output_dir: &Path,
    ) -> Result<(std::path::PathBuf, NormalizeReport), NormalizeError> {
        let (sheet, report) = self.normalize_file(input)?;
        let output = writer::output_path_for(input, output_dir, &self.config.output_suffix);
        writer::write_merged_sheet(&sheet, &output)?;
        Ok((output, report))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge and clean a workbook with the default configuration
pub fn normalize_workbook(workbook: &Workbook) -> (MergedSheet, NormalizeReport) {
    Normalizer::new().normalize(workbook)
}
