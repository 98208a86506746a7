//! Configuration for the roster pipeline, upload handling and import

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Canonical merged-sheet header: Name, StudentID, College, PointsIssued, PointsRemaining
pub const CANONICAL_HEADER: [&str; 5] = ["姓名", "学号", "学院", "爱心币数量", "剩余爱心币"];

/// Institution-name fragment whose rows are dropped from merged rosters
pub const EXCLUSION_SUBSTRING: &str = "高等职业技术学院";

/// Appended to the input file stem when naming the processed workbook
pub const PROCESSED_SUFFIX: &str = "_处理后";

pub const MERGED_SHEET_NAME: &str = "合并数据";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub normalize: NormalizeConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Validate values that would otherwise break the pipeline at run time
    pub fn validate(&self) -> Result<()> {
        let normalize = &self.normalize;
        if normalize.canonical_header.len() != CANONICAL_HEADER.len() {
            anyhow::bail!(
                "Configuration error: canonical_header must have exactly {} labels, got {}",
                CANONICAL_HEADER.len(),
                normalize.canonical_header.len()
            );
        }
        if normalize.exclusion_substring.is_empty() {
            anyhow::bail!("Configuration error: exclusion_substring must not be empty");
        }
        if normalize.output_suffix.is_empty() {
            anyhow::bail!("Configuration error: output_suffix must not be empty");
        }
        validate_sheet_name(&normalize.merged_sheet_name)?;

        if self.import.required_headers.len() != CANONICAL_HEADER.len() {
            anyhow::bail!(
                "Configuration error: import.required_headers must have exactly {} labels, got {}",
                CANONICAL_HEADER.len(),
                self.import.required_headers.len()
            );
        }

        Ok(())
    }
}

/// Merge-path settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    pub canonical_header: Vec<String>,
    pub exclusion_substring: String,
    pub output_suffix: String,
    pub merged_sheet_name: String,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            canonical_header: CANONICAL_HEADER.iter().map(|s| s.to_string()).collect(),
            exclusion_substring: EXCLUSION_SUBSTRING.to_string(),
            output_suffix: PROCESSED_SUFFIX.to_string(),
            merged_sheet_name: MERGED_SHEET_NAME.to_string(),
        }
    }
}

/// Directories used by the upload handlers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Staging area for uploaded files
    pub upload_dir: PathBuf,
    /// Where processed workbooks are written
    pub output_dir: PathBuf,
    /// Prefix of the path handed back to the client for a processed workbook
    pub output_url_prefix: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("temp"),
            output_dir: PathBuf::from("static/excel"),
            output_url_prefix: "static/excel".to_string(),
        }
    }
}

/// Import-path settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Labels that must all be present in the import sheet's header row, in
    /// field order: name, student id, college, points issued, points remaining
    pub required_headers: Vec<String>,
    /// Gender assigned to students created by an import
    pub default_gender: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            required_headers: CANONICAL_HEADER.iter().map(|s| s.to_string()).collect(),
            default_gender: "male".to_string(),
        }
    }
}

fn validate_sheet_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().count() > 31 {
        anyhow::bail!(
            "Configuration error: merged_sheet_name must be 1 to 31 characters, got '{}'",
            name
        );
    }
    if name.contains(['[', ']', ':', '*', '?', '/', '\\']) {
        anyhow::bail!(
            "Configuration error: merged_sheet_name '{}' contains a character Excel rejects",
            name
        );
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        anyhow::bail!(
            "Configuration error: merged_sheet_name '{}' must not start or end with an apostrophe",
            name
        );
    }
    Ok(())
}
