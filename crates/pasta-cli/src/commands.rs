use std::time::Instant;

use anyhow::{Result, bail};
use tracing::{error, info, info_span, warn};

use pasta_cli::pipeline::{
    check_output, discover_outputs, ingest, transform_output, write_output, write_report,
};
use pasta_cli::types::{CheckRun, OutputSummary, TransformRun};

use crate::cli::{CheckArgs, TransformArgs};
use crate::progress::{LoadBars, row_bar};

pub fn run_transform(args: &TransformArgs) -> Result<TransformRun> {
    let transform_span = info_span!(
        "transform",
        input = %args.input_dir.display(),
        output = %args.output_dir.display()
    );
    let _transform_guard = transform_span.enter();
    let start = Instant::now();

    // =========================================================================
    // Stage 1: Discover outputs (fail before loading any data)
    // =========================================================================
    let configs = discover_outputs(&args.output_dir)?;
    if configs.is_empty() {
        bail!(
            "no output configurations (<name>_Headers.psv + <name>_Rules.psv) found in {}",
            args.output_dir.display()
        );
    }

    // =========================================================================
    // Stage 2: Ingest
    // =========================================================================
    let ingest_span = info_span!("ingest");
    let ingested = ingest_span.in_scope(|| {
        let stage_start = Instant::now();
        let ingested = ingest(&args.input_dir, &LoadBars::new())?;
        info!(
            files = ingested.files.len(),
            tables = ingested.tables.len(),
            failures = ingested.errors.len(),
            duration_ms = stage_start.elapsed().as_millis(),
            "ingest complete"
        );
        anyhow::Ok(ingested)
    })?;
    let mut errors = ingested.errors;

    // =========================================================================
    // Stage 3: Transform and write each output
    // =========================================================================
    let mut outputs = Vec::with_capacity(configs.len());
    for config in &configs {
        let output_span = info_span!("output", name = %config.name_prefix);
        let _output_guard = output_span.enter();
        let output_start = Instant::now();

        let transformed = match transform_output(config, &ingested.database) {
            Ok(transformed) => transformed,
            Err(err) => {
                error!(error = %format!("{err:#}"), "output failed");
                errors.push(format!("{}: {err:#}", config.name_prefix));
                continue;
            }
        };

        let mut csv_path = None;
        if let Some(result) = &transformed.result {
            if args.dry_run {
                info!(rows = result.row_count(), "dry run, csv not written");
            } else {
                let bar = row_bar(&config.name_prefix, result.row_count());
                match write_output(config, result, |rows| bar.set_position(rows as u64)) {
                    Ok(path) => {
                        bar.finish_and_clear();
                        csv_path = Some(path);
                    }
                    Err(err) => {
                        bar.abandon();
                        error!(error = %format!("{err:#}"), "output failed");
                        errors.push(format!("{}: {err:#}", config.name_prefix));
                    }
                }
            }
        }

        info!(
            rows = transformed.row_count(),
            warnings = transformed.warnings.len(),
            duration_ms = output_start.elapsed().as_millis(),
            "output complete"
        );
        outputs.push(OutputSummary {
            rows: transformed.row_count(),
            name: transformed.name,
            columns: transformed.columns,
            rules: transformed.rules,
            csv_path,
            warnings: transformed.warnings,
            duration_ms: output_start.elapsed().as_millis(),
        });
    }

    let run = TransformRun {
        input_dir: args.input_dir.clone(),
        output_dir: args.output_dir.clone(),
        dry_run: args.dry_run,
        tables: ingested.tables,
        outputs,
        errors,
    };
    if let Some(path) = &args.report {
        write_report(&run, path)?;
    }

    info!(
        outputs = run.outputs.len(),
        rows = run.total_rows(),
        errors = run.errors.len(),
        duration_ms = start.elapsed().as_millis(),
        "transform complete"
    );
    Ok(run)
}

pub fn run_check(args: &CheckArgs) -> Result<CheckRun> {
    let check_span = info_span!("check", output = %args.output_dir.display());
    let _check_guard = check_span.enter();
    let start = Instant::now();

    let configs = discover_outputs(&args.output_dir)?;
    if configs.is_empty() {
        warn!("no output configurations found");
    }
    let entries: Vec<_> = configs.iter().map(check_output).collect();
    let run = CheckRun {
        output_dir: args.output_dir.clone(),
        entries,
    };

    info!(
        passed = run.passed_count(),
        failed = run.failed_count(),
        duration_ms = start.elapsed().as_millis(),
        "check complete"
    );
    Ok(run)
}
