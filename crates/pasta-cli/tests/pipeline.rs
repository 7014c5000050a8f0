//! Integration tests for the pipeline module.

use std::fs;
use std::path::Path;

use pasta_cli::pipeline::{
    check_output, discover_outputs, ingest, transform_output, write_output, write_report,
};
use pasta_cli::types::{OutputSummary, TransformRun};
use pasta_ingest::{NoProgress, OutputConfig};
use pasta_model::TransformWarning;
use pasta_transform::check_output_config;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn employees_input(dir: &Path) {
    write(dir, "employees_Headers.psv", "id|first_name|last_name|age|salary\n");
    write(
        dir,
        "employees.psv",
        "1|John|Doe|30|75000\n\
         2|Jane|Smith|25|65000\n\
         3|Bob|Johnson|35|85000\n",
    );
}

fn high_earners_output(dir: &Path) {
    write(dir, "high_earners_Headers.psv", "id|full_name|salary\n");
    write(
        dir,
        "high_earners_Rules.psv",
        "# keep the well paid\n\
         GLOBAL|salary >= '70000'|High earners\n\
         FIELD|full_name|first_name + \" \" + last_name|Full name\n",
    );
}

#[test]
fn transform_writes_csv_next_to_headers() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    employees_input(input.path());
    high_earners_output(output.path());

    let ingested = ingest(input.path(), &NoProgress).unwrap();
    assert_eq!(ingested.tables.len(), 1);
    assert_eq!(ingested.tables[0].records, 3);
    assert!(ingested.errors.is_empty());

    let configs = discover_outputs(output.path()).unwrap();
    assert_eq!(configs.len(), 1);

    let transformed = transform_output(&configs[0], &ingested.database).unwrap();
    assert_eq!(transformed.row_count(), 2);
    assert!(transformed.warnings.is_empty());

    let result = transformed.result.as_ref().unwrap();
    let mut progress = Vec::new();
    let path = write_output(&configs[0], result, |rows| progress.push(rows)).unwrap();
    assert_eq!(path, output.path().join("high_earners.csv"));
    assert_eq!(progress, vec![1, 2]);
    assert_eq!(
        fs::read_to_string(path).unwrap(),
        "id,full_name,salary\n1,John Doe,75000\n3,Bob Johnson,85000\n"
    );
}

#[test]
fn transform_without_write_leaves_no_csv() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    employees_input(input.path());
    high_earners_output(output.path());

    let ingested = ingest(input.path(), &NoProgress).unwrap();
    let configs = discover_outputs(output.path()).unwrap();
    transform_output(&configs[0], &ingested.database).unwrap();

    assert!(!output.path().join("high_earners.csv").exists());
}

#[test]
fn static_output_works_without_input_files() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write(output.path(), "banner_Headers.psv", "title|version\n");
    write(
        output.path(),
        "banner_Rules.psv",
        "FIELD|title|UPPER(\"agile pasta\")\nFIELD|version|\"1.0\"\n",
    );

    let ingested = ingest(input.path(), &NoProgress).unwrap();
    assert!(ingested.database.is_empty());

    let configs = discover_outputs(output.path()).unwrap();
    let transformed = transform_output(&configs[0], &ingested.database).unwrap();
    let result = transformed.result.unwrap();
    assert_eq!(result.rows, vec![vec!["AGILE PASTA".to_string(), "1.0".to_string()]]);
}

#[test]
fn warnings_are_kept_per_output() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    employees_input(input.path());
    write(output.path(), "people_Headers.psv", "id|nickname\n");
    write(
        output.path(),
        "people_Rules.psv",
        "FIELD|id|id\nnot a rule\n",
    );

    let ingested = ingest(input.path(), &NoProgress).unwrap();
    let configs = discover_outputs(output.path()).unwrap();
    let transformed = transform_output(&configs[0], &ingested.database).unwrap();

    let codes: Vec<_> = transformed.warnings.iter().map(TransformWarning::code).collect();
    assert_eq!(codes, vec!["malformed_rule", "unmapped_columns"]);
    assert_eq!(transformed.row_count(), 3);
}

#[test]
fn missing_input_directory_is_an_error() {
    let root = TempDir::new().unwrap();
    let result = ingest(&root.path().join("nope"), &NoProgress);
    assert!(result.is_err());
}

#[test]
fn check_reports_each_problem() {
    let output = TempDir::new().unwrap();
    high_earners_output(output.path());
    write(output.path(), "broken_Headers.psv", "\n");
    write(
        output.path(),
        "broken_Rules.psv",
        "FIELD|a|b\nFIELD|only_two\nCOLUMN|x|y\n",
    );

    let configs = discover_outputs(output.path()).unwrap();
    let entries: Vec<_> = configs.iter().map(check_output).collect();
    assert_eq!(entries.len(), 2);

    let broken = &entries[0];
    assert_eq!(broken.name, "broken");
    assert!(!broken.passed());
    assert_eq!(broken.headers, Some(0));
    assert_eq!(broken.rules, Some(1));
    assert_eq!(broken.problems.len(), 3);
    assert!(broken.problems[1].contains("line 2"));

    let good = &entries[1];
    assert!(good.passed(), "{:?}", good.problems);
    assert_eq!(good.headers, Some(3));
    assert_eq!(good.rules, Some(2));
}

#[test]
fn check_matches_config_check_problems() {
    let output = TempDir::new().unwrap();
    write(output.path(), "broken_Headers.psv", "\n");
    write(output.path(), "broken_Rules.psv", "FIELD|only_two\n");
    let config = OutputConfig {
        headers_path: output.path().join("broken_Headers.psv"),
        rules_path: output.path().join("broken_Rules.psv"),
        name_prefix: "broken".to_string(),
    };

    let expected = check_output_config("\n", "FIELD|only_two\n").problems();
    assert_eq!(check_output(&config).problems, expected);

    let missing_rules = OutputConfig {
        rules_path: output.path().join("gone_Rules.psv"),
        ..config
    };
    let entry = check_output(&missing_rules);
    assert_eq!(entry.headers, Some(0));
    assert_eq!(entry.rules, None);
    assert_eq!(entry.problems.len(), 2);
    assert!(entry.problems[0].contains("gone_Rules.psv"), "{:?}", entry.problems);
    assert!(entry.problems[1].contains("no header names"));
}

#[test]
fn report_serializes_outputs_and_warnings() {
    let dir = TempDir::new().unwrap();
    let run = TransformRun {
        input_dir: "in".into(),
        output_dir: "out".into(),
        dry_run: true,
        tables: Vec::new(),
        outputs: vec![OutputSummary {
            name: "people".to_string(),
            columns: 2,
            rules: 1,
            rows: 3,
            csv_path: None,
            warnings: vec![TransformWarning::UnmappedColumns {
                columns: vec!["nickname".to_string()],
            }],
            duration_ms: 4,
        }],
        errors: Vec::new(),
    };
    let path = dir.path().join("report.json");
    write_report(&run, &path).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["outputs"][0]["name"], "people");
    assert_eq!(json["outputs"][0]["rows"], 3);
    assert!(json["outputs"][0]["csv_path"].is_null());
    assert_eq!(json["outputs"][0]["warnings"][0]["kind"], "unmapped_columns");
}
