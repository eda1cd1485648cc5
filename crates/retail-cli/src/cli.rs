//! CLI argument definitions for the retail pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "retail-pipeline",
    version,
    about = "Retail data pipeline - merge product, sales, and inventory data",
    long_about = "Batch pipeline for retail data.\n\n\
                  Fetches the product catalog, merges it with local sales and\n\
                  inventory CSVs, computes sales metrics, and writes dated\n\
                  Parquet, CSV, and Markdown outputs after a quality gate."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Execute the pipeline end to end.
    Run(RunArgs),

    /// Load the configuration file and print the resolved settings.
    CheckConfig(CheckConfigArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Path to the YAML configuration file.
    #[arg(
        long = "config",
        value_name = "PATH",
        default_value = "config/pipeline.yaml"
    )]
    pub config: PathBuf,

    /// Redirect all output directories under this root.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Override the run date stamp (YYYY-MM-DD, default: today UTC).
    #[arg(long = "run-date", value_name = "DATE")]
    pub run_date: Option<String>,

    /// Run every stage but write no files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct CheckConfigArgs {
    /// Path to the YAML configuration file.
    #[arg(
        long = "config",
        value_name = "PATH",
        default_value = "config/pipeline.yaml"
    )]
    pub config: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
