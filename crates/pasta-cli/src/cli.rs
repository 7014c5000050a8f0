//! CLI argument definitions for agile-pasta.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "agile-pasta",
    version,
    about = "Agile Pasta - transform PSV data files into CSV using rule files",
    long_about = "Transform pipe-separated (PSV) data files into Excel-compatible CSV.\n\n\
                  Input folders hold <name>.psv data files with <name>_Headers.psv column names.\n\
                  Output folders hold <name>_Headers.psv output columns and <name>_Rules.psv\n\
                  GLOBAL (row filter) and FIELD (column expression) rules; <name>.csv is\n\
                  written next to them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

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
    /// Transform PSV data files to CSV using the rules in the output folder.
    Transform(TransformArgs),

    /// Check output configuration files without transforming anything.
    #[command(alias = "sanity-check")]
    Check(CheckArgs),
}

#[derive(Parser)]
pub struct TransformArgs {
    /// Input directory, searched recursively for <name>.psv + <name>_Headers.psv.
    #[arg(long = "in", value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Output directory, searched recursively for <name>_Headers.psv + <name>_Rules.psv.
    #[arg(long = "out", value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Run the whole pipeline without writing CSV files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Write a JSON run report to this path.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Output directory holding the configurations to check.
    #[arg(long = "out", value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,
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
