use std::path::PathBuf;

use pasta_model::TransformWarning;
use serde::Serialize;

/// Everything a `transform` run produced; also the JSON report body.
#[derive(Debug, Serialize)]
pub struct TransformRun {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub tables: Vec<TableSummary>,
    pub outputs: Vec<OutputSummary>,
    pub errors: Vec<String>,
}

impl TransformRun {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn total_rows(&self) -> usize {
        self.outputs.iter().map(|output| output.rows).sum()
    }

    pub fn total_warnings(&self) -> usize {
        self.outputs.iter().map(|output| output.warnings.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub source: PathBuf,
    pub size_bytes: u64,
    pub columns: usize,
    pub records: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputSummary {
    pub name: String,
    pub columns: usize,
    pub rules: usize,
    pub rows: usize,
    /// `None` for dry runs and for outputs without header names.
    pub csv_path: Option<PathBuf>,
    pub warnings: Vec<TransformWarning>,
    pub duration_ms: u128,
}

/// Result of a `check` run.
#[derive(Debug, Serialize)]
pub struct CheckRun {
    pub output_dir: PathBuf,
    pub entries: Vec<CheckEntry>,
}

impl CheckRun {
    pub fn passed_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.len() - self.passed_count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckEntry {
    pub name: String,
    pub headers_path: PathBuf,
    pub rules_path: PathBuf,
    /// `None` when the headers file could not be read.
    pub headers: Option<usize>,
    /// `None` when the rules file could not be read.
    pub rules: Option<usize>,
    pub problems: Vec<String>,
}

impl CheckEntry {
    pub fn passed(&self) -> bool {
        self.problems.is_empty()
    }
}
