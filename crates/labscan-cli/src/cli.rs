//! CLI command definitions and argument parsing.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// LabScan CLI - Extract biomarkers from lab reports.
#[derive(Debug, Parser)]
#[command(name = "labscan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (one line per reading)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract biomarkers from report text
    Extract(ExtractArgs),

    /// OCR documents and extract health records
    Scan(ScanArgs),

    /// List the biomarker catalog
    Catalog,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Text file to read
    #[arg(required_unless_present = "stdin", conflicts_with = "stdin")]
    pub file: Option<PathBuf>,

    /// Read the report text from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Append a validation report
    #[arg(long)]
    pub validate: bool,
}

/// Arguments for the scan command.
#[derive(Debug, Parser)]
pub struct ScanArgs {
    /// Documents to scan (images or PDFs)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Google Cloud Vision API key
    #[arg(long, env = "LABSCAN_VISION_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Treat the files as already-extracted text
    #[arg(long, conflicts_with = "api_key")]
    pub plain_text: bool,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
