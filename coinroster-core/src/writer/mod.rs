// ! Writer module for processed roster workbooks

mod xlsx_writer;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::NormalizeError;
use crate::pipeline::MergedSheet;

/// Extension of every workbook this crate writes
pub const OUTPUT_EXTENSION: &str = "xlsx";

/// Write the merged sheet as an xlsx workbook, creating parent directories
pub fn write_merged_sheet(sheet: &MergedSheet, path: &Path) -> Result<(), NormalizeError> {
    let wrap = |source: anyhow::Error| NormalizeError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| wrap(e.into()))?;
    }
    xlsx_writer::write_xlsx(sheet, path).map_err(wrap)?;

    log::info!(
        "wrote {} row(s) to {}",
        sheet.row_count(),
        path.display()
    );
    Ok(())
}

/// Output path for a processed workbook: `<dir>/<stem><suffix>.xlsx`
pub fn output_path_for(input: &Path, dir: &Path, suffix: &str) -> PathBuf {
    dir.join(output_file_name(input, suffix))
}

/// File name for a processed workbook: `<stem><suffix>.xlsx`
pub fn output_file_name(input: &Path, suffix: &str) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}{}.{}", stem, suffix, OUTPUT_EXTENSION)
}

/// Directory the CLI writes into when no output directory is given
pub fn default_output_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
