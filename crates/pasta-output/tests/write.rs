//! CSV output tests.

use pasta_model::QueryResult;
use pasta_output::{OutputError, write_csv, write_csv_to};
use tempfile::TempDir;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn render(result: &QueryResult) -> String {
    let mut buffer = Vec::new();
    write_csv_to(result, &mut buffer, |_| {}).unwrap();
    String::from_utf8(buffer).unwrap()
}

#[test]
fn escapes_awkward_fields() {
    let result = QueryResult::new(
        strings(&["name", "note", "city"]),
        vec![
            strings(&["John Doe", "said \"hi\"", "Paris, FR"]),
            strings(&[" leading", "multi\nline", "Oslo"]),
        ],
    );
    insta::assert_snapshot!(render(&result), @r#"
    name,note,city
    John Doe,"said ""hi""","Paris, FR"
    " leading","multi
    line",Oslo
    "#);
}

#[test]
fn header_only_when_no_rows() {
    let result = QueryResult::empty(strings(&["id", "full name"]));
    assert_eq!(render(&result), "id,full name\n");
}

#[test]
fn writes_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("employees.csv");
    let result = QueryResult::new(strings(&["id"]), vec![strings(&["1"]), strings(&["2"])]);

    let rows = write_csv(&result, &path).unwrap();

    assert_eq!(rows, 2);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "id\n1\n2\n");
}

#[test]
fn missing_directory_is_a_create_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("out.csv");
    let error = write_csv(&QueryResult::empty(strings(&["a"])), &path).unwrap_err();
    assert!(matches!(error, OutputError::Create { .. }));
}
