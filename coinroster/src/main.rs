use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use coinroster_core::import::{SqliteStore, import_workbook};
use coinroster_core::{AppConfig, Normalizer, reader, writer};
use std::path::{Path, PathBuf};

mod formatter;

#[derive(Parser)]
#[command(name = "coinroster")]
#[command(about = "Merge and import love-coin roster workbooks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Merge every sheet of a roster workbook into one cleaned sheet
    Merge {
        /// Path to the Excel/ODS roster
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Directory for the processed workbook (defaults to the input's directory)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Path to configuration file (TOML)
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
    /// Import roster rows into the student database
    Import {
        /// Path to the Excel/ODS roster
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// SQLite database holding the users table
        #[arg(long, value_name = "PATH")]
        db: PathBuf,

        /// Path to configuration file (TOML)
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output for scripting
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Merge {
            file,
            output_dir,
            config,
            format,
        } => run_merge(&file, output_dir, config.as_deref(), format),
        Command::Import {
            file,
            db,
            config,
            format,
        } => run_import(&file, &db, config.as_deref(), format),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let config = if let Some(config_path) = explicit {
        AppConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Fall back to coinroster.toml in the working directory
        let default_config_path = PathBuf::from("coinroster.toml");
        if default_config_path.exists() {
            AppConfig::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            AppConfig::default()
        }
    };

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn run_merge(
    file: &Path,
    output_dir: Option<PathBuf>,
    config: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let config = load_config(config)?;
    let output_dir = output_dir.unwrap_or_else(|| writer::default_output_dir(file));

    let normalizer = Normalizer::with_config(config.normalize);
    let (output, report) = normalizer
        .process_file(file, &output_dir)
        .with_context(|| format!("Failed to process file: {}", file.display()))?;

    match format {
        OutputFormat::Human => formatter::print_merge_human(file, &output, &report),
        OutputFormat::Json => formatter::print_merge_json(file, &output, &report)?,
    }
    Ok(())
}

fn run_import(file: &Path, db: &Path, config: Option<&Path>, format: OutputFormat) -> Result<()> {
    let config = load_config(config)?;

    let workbook = reader::read_workbook(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;
    let mut store = SqliteStore::open(db)
        .with_context(|| format!("Failed to open database: {}", db.display()))?;
    let tally = import_workbook(&workbook, &mut store, &config.import)
        .with_context(|| format!("Failed to import file: {}", file.display()))?;

    match format {
        OutputFormat::Human => formatter::print_import_human(file, &tally),
        OutputFormat::Json => formatter::print_import_json(file, &tally)?,
    }
    Ok(())
}
