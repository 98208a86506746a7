//! Output formatters for merge and import results

use anyhow::Result;
use colored::*;
use coinroster_core::{ImportTally, NormalizeReport};
use std::path::Path;

/// Print a merge report in human-readable format
pub fn print_merge_human(file_path: &Path, output_path: &Path, report: &NormalizeReport) {
    println!("{}", format!("Merging: {}", file_path.display()).bold());
    println!();

    println!("{}", "✓ Roster processed".green().bold());
    println!("  {} {}", "Output:".bold(), output_path.display().to_string().cyan());
    println!();

    println!("{}", "Summary:".bold().underline());
    println!("  {} {}", "Original sheets:".bold(), report.original_sheets);
    println!("  {} {}", "Total rows:".bold(), report.total_rows);
    if report.deleted_rows > 0 {
        println!("  {} {}", "Excluded rows:".yellow().bold(), report.deleted_rows);
    } else {
        println!("  {} {}", "Excluded rows:".bold(), report.deleted_rows);
    }
    if report.blank_rows_removed > 0 {
        println!(
            "  {} {}",
            "Blank rows removed:".bright_black(),
            report.blank_rows_removed
        );
    }
    if report.header_replaced {
        println!("  {}", "Header row replaced with canonical labels".bright_black());
    }
}

/// Print a merge report in JSON format
pub fn print_merge_json(
    file_path: &Path,
    output_path: &Path,
    report: &NormalizeReport,
) -> Result<()> {
    let output = serde_json::json!({
        "file": file_path.display().to_string(),
        "output": output_path.display().to_string(),
        "report": report,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Print an import tally in human-readable format
pub fn print_import_human(file_path: &Path, tally: &ImportTally) {
    println!("{}", format!("Importing: {}", file_path.display()).bold());
    println!();

    if tally.fail_count == 0 {
        println!("{}", "✓ Import finished".green().bold());
    } else {
        println!("{}", "✓ Import finished with skipped rows".yellow().bold());
    }
    println!();

    println!("{}", "Summary:".bold().underline());
    println!("  {} {}", "Imported:".green().bold(), tally.success_count);
    if tally.fail_count > 0 {
        println!("  {} {}", "Skipped (no student id):".red().bold(), tally.fail_count);
    }
}

/// Print an import tally in JSON format
pub fn print_import_json(file_path: &Path, tally: &ImportTally) -> Result<()> {
    let output = serde_json::json!({
        "file": file_path.display().to_string(),
        "success_count": tally.success_count,
        "fail_count": tally.fail_count,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
