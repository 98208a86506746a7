//! Request handlers for the roster upload endpoints
//!
//! These are framework-agnostic: each takes the uploaded file name and bytes
//! and returns a status code with a JSON-serializable body, so any HTTP server
//! can mount them. Errors never escape; they become `success: false` bodies.

use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::Normalizer;
use crate::config::AppConfig;
use crate::error::ImportError;
use crate::import::{StudentStore, import_workbook};
use crate::reader;
use crate::writer;

/// Extensions accepted by the upload endpoints
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Longest sanitized upload name, in bytes; leaves room for the staging
/// prefix and the processed suffix within a 255-byte file name
pub const MAX_FILE_NAME_BYTES: usize = 120;

/// Extensions longer than this are treated as part of the stem when capping
const MAX_EXTENSION_BYTES: usize = 16;

/// Status code plus JSON body of a handler call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerResponse<T> {
    #[serde(skip)]
    pub status: u16,
    #[serde(flatten)]
    pub body: ResponseBody<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseBody<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> HandlerResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: 200,
            body: ResponseBody {
                success: true,
                data: Some(data),
                error: None,
            },
        }
    }

    pub fn fail(status: u16, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ResponseBody {
                success: false,
                data: None,
                error: Some(error.into()),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.body.success
    }
}

/// Payload of a successful merge upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessOutcome {
    /// Client-facing path of the processed workbook
    pub file_path: String,
    pub original_sheets: usize,
    pub total_rows: usize,
    pub deleted_rows: usize,
}

/// Payload of a successful import upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub success_count: usize,
    pub fail_count: usize,
    pub message: String,
}

/// An uploaded file staged on disk; the file is removed when this is dropped
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
}

impl StagedUpload {
    /// Write `bytes` to a fresh file in `dir` whose name ends with `file_name`
    pub fn create(dir: &Path, file_name: &str, bytes: &[u8]) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&format!("-{}", file_name))
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Replace anything that is not alphanumeric, `.`, `-` or `_`, drop any
/// directory components and cap the result at [`MAX_FILE_NAME_BYTES`]
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cap_file_name(cleaned)
    }
}

/// Shorten the stem on a char boundary, keeping a short extension intact
fn cap_file_name(name: &str) -> String {
    if name.len() <= MAX_FILE_NAME_BYTES {
        return name.to_string();
    }
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= MAX_EXTENSION_BYTES => name.split_at(dot),
        _ => (name, ""),
    };
    let mut end = MAX_FILE_NAME_BYTES - ext.len();
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &stem[..end], ext)
}

/// Validate the uploaded file name the way both endpoints do
fn check_upload_name<T>(file_name: &str) -> Result<(), HandlerResponse<T>> {
    if file_name.trim().is_empty() {
        return Err(HandlerResponse::fail(400, "no file selected"));
    }
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(HandlerResponse::fail(400, "please upload an Excel file")),
    }
}

/// Merge endpoint: normalize the uploaded workbook and publish the result
pub fn process_upload(
    config: &AppConfig,
    file_name: &str,
    bytes: &[u8],
) -> HandlerResponse<ProcessOutcome> {
    if let Err(rejected) = check_upload_name(file_name) {
        return rejected;
    }

    match run_process(config, file_name, bytes) {
        Ok(outcome) => HandlerResponse::ok(outcome),
        Err(e) => {
            log::warn!("processing upload '{}' failed: {:#}", file_name, e);
            HandlerResponse::fail(500, format!("file processing failed: {:#}", e))
        }
    }
}

fn run_process(
    config: &AppConfig,
    file_name: &str,
    bytes: &[u8],
) -> anyhow::Result<ProcessOutcome> {
    let safe_name = sanitize_file_name(file_name);
    let staged = StagedUpload::create(&config.paths.upload_dir, &safe_name, bytes)?;

    let workbook = reader::read_workbook(staged.path())?;
    let normalizer = Normalizer::with_config(config.normalize.clone());
    let (sheet, report) = normalizer.normalize(&workbook);

    let output_name =
        writer::output_file_name(Path::new(&safe_name), &config.normalize.output_suffix);
    let output_path: PathBuf = config.paths.output_dir.join(&output_name);
    writer::write_merged_sheet(&sheet, &output_path)?;

    Ok(ProcessOutcome {
        file_path: format!(
            "{}/{}",
            config.paths.output_url_prefix.trim_end_matches('/'),
            output_name
        ),
        original_sheets: report.original_sheets,
        total_rows: report.total_rows,
        deleted_rows: report.deleted_rows,
    })
}

/// Import endpoint: upsert the uploaded roster into `store`
pub fn import_upload(
    store: &mut dyn StudentStore,
    config: &AppConfig,
    file_name: &str,
    bytes: &[u8],
) -> HandlerResponse<ImportOutcome> {
    if let Err(rejected) = check_upload_name(file_name) {
        return rejected;
    }

    let result = reader::read_workbook_from_bytes(bytes)
        .map_err(ImportError::from)
        .and_then(|workbook| import_workbook(&workbook, store, &config.import));

    match result {
        Ok(tally) => HandlerResponse::ok(ImportOutcome {
            success_count: tally.success_count,
            fail_count: tally.fail_count,
            message: format!(
                "import finished: {} succeeded, {} failed",
                tally.success_count, tally.fail_count
            ),
        }),
        Err(e @ ImportError::MissingRequiredColumn(_)) => {
            HandlerResponse::fail(400, e.to_string())
        }
        Err(e) => {
            log::warn!("import of '{}' failed: {}", file_name, e);
            HandlerResponse::fail(500, format!("import failed: {}", e))
        }
    }
}
