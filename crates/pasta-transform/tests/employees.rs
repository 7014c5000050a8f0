//! End-to-end rule scenarios over a small employees table.

use pasta_model::{Database, IgnoreWarnings, QueryResult, Record, Table, TransformWarning};
use pasta_transform::{load_rules, parse_output_headers, transform};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn employees() -> Database {
    let mut db = Database::new();
    db.insert(Table::new(
        "employees",
        strings(&["id", "first_name", "last_name", "age", "salary", "department"]),
        vec![
            Record::new(strings(&["1", "John", "Doe", "30", "75000", "engineering"])),
            Record::new(strings(&["2", "Jane", "Smith", "25", "65000", "marketing"])),
            Record::new(strings(&["3", "Bob", "Johnson", "35", "85000", "engineering"])),
        ],
    ));
    db
}

fn run(headers: &str, rules: &str, db: &Database) -> (QueryResult, Vec<TransformWarning>) {
    let mut warnings = Vec::new();
    let rules = load_rules(rules, &mut warnings);
    let result = transform(&rules, &parse_output_headers(headers), db, &mut warnings)
        .expect("output headers are not empty");
    (result, warnings)
}

#[test]
fn global_filter_with_concatenation() {
    let (result, warnings) = run(
        "employee_name|annual_salary",
        "GLOBAL|salary >= '70000'|Only high earners\n\
         FIELD|employee_name|first_name + \" \" + last_name|Combine names\n\
         FIELD|annual_salary|salary|Copy salary",
        &employees(),
    );

    assert!(warnings.is_empty());
    assert_eq!(result.headers, strings(&["employee_name", "annual_salary"]));
    assert_eq!(
        result.rows,
        vec![strings(&["John Doe", "75000"]), strings(&["Bob Johnson", "85000"])]
    );
}

#[test]
fn string_functions() {
    let (result, _) = run(
        "upper_name|lower_dept|title_name",
        "FIELD|upper_name|UPPER(first_name)|\n\
         FIELD|lower_dept|LOWER(department)|\n\
         FIELD|title_name|TITLE(last_name)|",
        &employees(),
    );
    assert_eq!(result.rows.len(), 3);
    assert_eq!(result.rows[0], strings(&["JOHN", "engineering", "Doe"]));
}

#[test]
fn missing_output_field_is_empty_and_reported_once() {
    let (result, warnings) = run(
        "employee_name|nonexistent_field",
        "FIELD|employee_name|first_name + \" \" + last_name|Combine names",
        &employees(),
    );

    assert_eq!(result.rows.len(), 3);
    for row in &result.rows {
        assert!(!row[0].is_empty());
        assert!(row[1].is_empty());
    }
    assert_eq!(
        warnings,
        vec![TransformWarning::UnmappedColumns {
            columns: strings(&["nonexistent_field"])
        }]
    );
}

#[test]
fn no_rules_with_pass_through_header() {
    let (result, _) = run("employee_name", "", &employees());
    assert_eq!(result.headers, strings(&["employee_name"]));
}

#[test]
fn numeric_operations() {
    let (result, _) = run(
        "monthly_salary|double_age",
        "FIELD|monthly_salary|salary / 12|Convert to monthly\n\
         FIELD|double_age|age * 2|Double the age",
        &employees(),
    );
    let monthly: Vec<_> = result.rows.iter().map(|r| r[0].as_str()).collect();
    let doubled: Vec<_> = result.rows.iter().map(|r| r[1].as_str()).collect();
    assert_eq!(monthly, vec!["75000 / 12", "65000 / 12", "85000 / 12"]);
    assert_eq!(doubled, vec!["60", "50", "70"]);
}

#[test]
fn field_ternaries() {
    let (result, _) = run(
        "salary_category|dept_status",
        "FIELD|salary_category|salary >= '75000' ? 'High' : 'Low'|\n\
         FIELD|dept_status|department = 'engineering' ? \"Tech\" : \"Non-Tech\"|",
        &employees(),
    );
    assert_eq!(
        result.rows,
        vec![
            strings(&["High", "Tech"]),
            strings(&["Low", "Non-Tech"]),
            strings(&["High", "Tech"]),
        ]
    );
}

#[test]
fn global_ternary_filters() {
    let (result, _) = run(
        "employee_name|salary",
        "GLOBAL|salary >= '75000' ? ACCEPT : REJECT|Filter high earners\n\
         FIELD|employee_name|first_name + \" \" + last_name|Combine names\n\
         FIELD|salary|salary|Copy salary",
        &employees(),
    );
    assert_eq!(
        result.column("employee_name"),
        Some(vec!["John Doe", "Bob Johnson"])
    );
}

#[test]
fn numeric_comparison_is_not_lexicographic() {
    let (result, _) = run(
        "employee_name",
        "GLOBAL|salary >= '80000'|\n\
         GLOBAL|salary > '9'|\"75000\" < \"9\" as text\n\
         FIELD|employee_name|first_name + \" \" + last_name|",
        &employees(),
    );
    assert_eq!(result.rows, vec![strings(&["Bob Johnson"])]);
}

#[test]
fn static_rules_without_tables() {
    let (result, warnings) = run(
        "greeting|source",
        "FIELD|greeting|\"Hi\"|Static greeting\nFIELD|source|'agile-pasta'|",
        &Database::new(),
    );
    assert!(warnings.is_empty());
    assert_eq!(result.rows, vec![strings(&["Hi", "agile-pasta"])]);
}

#[test]
fn static_rules_ignore_loaded_tables() {
    let (result, _) = run("greeting", "FIELD|greeting|\"Hi\"|", &employees());
    assert_eq!(result.rows, vec![strings(&["Hi"])]);
}

#[test]
fn malformed_lines_are_skipped() {
    let (result, warnings) = run(
        "name|age",
        "FIELD|name|first_name|ok\nFIELD|broken\nFIELD|age|age|ok",
        &employees(),
    );
    assert_eq!(result.rows[1], strings(&["Jane", "25"]));
    assert!(matches!(
        warnings.as_slice(),
        [TransformWarning::MalformedRule { line_number: 2, .. }]
    ));
}

#[test]
fn rerunning_is_idempotent() {
    let db = employees();
    let rules = load_rules(
        "GLOBAL|department = 'engineering'|\nFIELD|who|TITLE(first_name)|",
        IgnoreWarnings,
    );
    let output = parse_output_headers("id|who");
    let first = transform(&rules, &output, &db, IgnoreWarnings);
    let second = transform(&rules, &output, &db, IgnoreWarnings);
    assert_eq!(first, second);
    assert_eq!(first.map(|r| r.row_count()), Some(2));
}
