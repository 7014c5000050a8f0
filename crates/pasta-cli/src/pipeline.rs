//! Processing pipeline with explicit stages.
//!
//! 1. **Ingest**: discover `<prefix>.psv` / `<prefix>_Headers.psv` pairs and load
//!    them into a [`Database`]
//! 2. **Discover**: find `<prefix>_Headers.psv` / `<prefix>_Rules.psv` output pairs
//! 3. **Transform**: apply each pair's rules to the loaded tables
//! 4. **Output**: write `<prefix>.csv` next to the output headers file
//!
//! The `check` command reuses stage 2 and parses each pair without loading data.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use pasta_ingest::{
    InputFile, LoadProgress, OutputConfig, load_tables, scan_input_files, scan_output_files,
    validate_encoding,
};
use pasta_model::{Database, QueryResult, TransformWarning};
use pasta_output::write_csv_with_progress;
use pasta_transform::{
    TracingSink, check_output_config, load_rules, parse_output_headers, transform,
};
use tracing::{debug, info, warn};

use crate::types::{CheckEntry, TableSummary};

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// Result of the ingest stage.
#[derive(Debug)]
pub struct IngestResult {
    pub files: Vec<InputFile>,
    pub database: Database,
    /// One entry per registered table, in name order.
    pub tables: Vec<TableSummary>,
    /// Files that failed to load.
    pub errors: Vec<String>,
}

/// Discovers the input files under `input_dir` and loads them in parallel.
///
/// A missing input directory is an error; files that fail to parse are
/// collected in [`IngestResult::errors`].
pub fn ingest<P: LoadProgress>(input_dir: &Path, progress: &P) -> Result<IngestResult> {
    let files = scan_input_files(input_dir)
        .with_context(|| format!("scan input directory {}", input_dir.display()))?;
    if files.is_empty() {
        warn!(path = %input_dir.display(), "no input files found");
    }
    debug!(files = files.len(), "input files discovered");

    let outcome = load_tables(&files, progress);
    let errors = outcome
        .failures
        .iter()
        .map(|(path, error)| format!("{}: {error}", path.display()))
        .collect();
    let tables = table_summaries(&files, &outcome.database);

    Ok(IngestResult {
        files,
        database: outcome.database,
        tables,
        errors,
    })
}

fn table_summaries(files: &[InputFile], database: &Database) -> Vec<TableSummary> {
    database
        .tables()
        .map(|table| {
            let source = table.source_file.clone().unwrap_or_default();
            let size_bytes = files
                .iter()
                .find(|file| file.data_path == source)
                .map_or(0, |file| file.size_bytes);
            TableSummary {
                name: table.name.clone(),
                source,
                size_bytes,
                columns: table.headers.len(),
                records: table.record_count(),
            }
        })
        .collect()
}

// ============================================================================
// Stage 2: Discover outputs
// ============================================================================

/// Finds every output configuration under `output_dir`.
pub fn discover_outputs(output_dir: &Path) -> Result<Vec<OutputConfig>> {
    let configs = scan_output_files(output_dir)
        .with_context(|| format!("scan output directory {}", output_dir.display()))?;
    debug!(outputs = configs.len(), "output configurations discovered");
    Ok(configs)
}

/// Reads a headers or rules file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String> {
    validate_encoding(path)?;
    std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

// ============================================================================
// Stage 3: Transform
// ============================================================================

/// One output configuration after its rules were applied.
#[derive(Debug)]
pub struct TransformedOutput {
    pub name: String,
    pub columns: usize,
    pub rules: usize,
    /// `None` when the output headers file names no columns.
    pub result: Option<QueryResult>,
    pub warnings: Vec<TransformWarning>,
}

impl TransformedOutput {
    pub fn row_count(&self) -> usize {
        self.result.as_ref().map_or(0, QueryResult::row_count)
    }
}

/// Parses the configuration's files and transforms `database` with them.
///
/// Warnings are logged as they occur and kept on the result.
pub fn transform_output(config: &OutputConfig, database: &Database) -> Result<TransformedOutput> {
    let start = Instant::now();
    let headers_text = read_text(&config.headers_path)?;
    let rules_text = read_text(&config.rules_path)?;

    let mut sink = TracingSink::for_output(config.name_prefix.as_str());
    let output = parse_output_headers(&headers_text);
    let rules = load_rules(&rules_text, &mut sink);
    if output.is_empty() {
        warn!(
            output = %config.name_prefix,
            path = %config.headers_path.display(),
            "output headers file names no columns, skipping"
        );
    }
    let result = transform(&rules, &output, database, &mut sink);

    debug!(
        output = %config.name_prefix,
        rows = result.as_ref().map_or(0, QueryResult::row_count),
        duration_ms = start.elapsed().as_millis(),
        "output transformed"
    );
    Ok(TransformedOutput {
        name: config.name_prefix.clone(),
        columns: output.len(),
        rules: rules.len(),
        result,
        warnings: sink.into_warnings(),
    })
}

// ============================================================================
// Stage 4: Output
// ============================================================================

/// Writes `result` to the configuration's CSV path and returns that path.
pub fn write_output<F: FnMut(usize)>(
    config: &OutputConfig,
    result: &QueryResult,
    on_row: F,
) -> Result<PathBuf> {
    let path = config.csv_path();
    let rows = write_csv_with_progress(result, &path, on_row)
        .with_context(|| format!("write output {}", config.name_prefix))?;
    info!(output = %config.name_prefix, path = %path.display(), rows, "output written");
    Ok(path)
}

// ============================================================================
// Sanity check
// ============================================================================

/// Checks one output configuration; unreadable files become problems.
pub fn check_output(config: &OutputConfig) -> CheckEntry {
    let mut entry = CheckEntry {
        name: config.name_prefix.clone(),
        headers_path: config.headers_path.clone(),
        rules_path: config.rules_path.clone(),
        headers: None,
        rules: None,
        problems: Vec::new(),
    };

    let headers_text = read_text(&config.headers_path);
    let rules_text = read_text(&config.rules_path);
    if let Err(error) = &headers_text {
        entry.problems.push(format!("{error:#}"));
    }
    if let Err(error) = &rules_text {
        entry.problems.push(format!("{error:#}"));
    }

    // A missing file is checked as empty so the other one is still reported on.
    let check = check_output_config(
        headers_text.as_deref().unwrap_or_default(),
        rules_text.as_deref().unwrap_or_default(),
    );
    if headers_text.is_ok() {
        entry.headers = Some(check.output.len());
    }
    if rules_text.is_ok() {
        entry.rules = Some(check.rules.len());
    }
    match (headers_text.is_ok(), rules_text.is_ok()) {
        (true, true) => entry.problems.extend(check.problems()),
        (true, false) => entry
            .problems
            .extend(check.headers_problem().map(str::to_string)),
        (false, true) => entry
            .problems
            .extend(check.malformed.iter().map(ToString::to_string)),
        _ => {}
    }

    debug!(output = %entry.name, passed = entry.passed(), "output configuration checked");
    entry
}

// ============================================================================
// Report
// ============================================================================

/// Writes `value` as pretty-printed JSON.
pub fn write_report<T: serde::Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize run report")?;
    std::fs::write(path, json).with_context(|| format!("write report {}", path.display()))?;
    info!(path = %path.display(), "run report written");
    Ok(())
}
