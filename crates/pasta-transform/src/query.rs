//! Filtered selection over a single table.

use pasta_model::{Database, QueryResult};

use crate::condition::CompiledCondition;

/// [`Database::select`] restricted to rows accepted by `condition`.
///
/// `condition` uses the GLOBAL rule grammar and is evaluated against the full
/// table row, so it may test columns that are not selected.
pub fn select_where(
    database: &Database,
    table_name: &str,
    columns: &[String],
    condition: &str,
) -> Option<QueryResult> {
    let table = database.get(table_name)?;
    let condition = CompiledCondition::compile(condition, &table.headers);
    let full = database.select(table_name, &[])?;
    let rows = full
        .rows
        .into_iter()
        .filter(|row| condition.evaluate(row.as_slice()));

    if columns.is_empty() {
        return Some(QueryResult::new(full.headers, rows.collect()));
    }

    let positions: Vec<Option<usize>> = columns.iter().map(|c| table.column_index(c)).collect();
    let rows = rows
        .map(|row| {
            positions
                .iter()
                .map(|position| position.and_then(|idx| row.get(idx).cloned()).unwrap_or_default())
                .collect()
        })
        .collect();
    Some(QueryResult::new(columns.to_vec(), rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pasta_model::{Record, Table};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn database() -> Database {
        let mut db = Database::new();
        db.insert(Table::new(
            "employees",
            strings(&["id", "name", "salary"]),
            vec![
                Record::new(strings(&["1", "John", "75000"])),
                Record::new(strings(&["2", "Jane", "65000"])),
                Record::new(strings(&["3", "Bob"])),
            ],
        ));
        db
    }

    #[test]
    fn filters_on_unselected_columns() {
        let result =
            select_where(&database(), "employees", &strings(&["name"]), "salary > '70000'").unwrap();
        assert_eq!(result.headers, strings(&["name"]));
        assert_eq!(result.rows, vec![strings(&["John"])]);
    }

    #[test]
    fn all_columns_when_none_requested() {
        let result = select_where(&database(), "employees", &[], "salary = ''").unwrap();
        assert_eq!(result.rows, vec![strings(&["3", "Bob", ""])]);
    }

    #[test]
    fn unknown_table_or_column() {
        assert!(select_where(&database(), "nope", &[], "id = '1'").is_none());
        let result =
            select_where(&database(), "employees", &strings(&["id", "email"]), "id = '2'").unwrap();
        assert_eq!(result.rows, vec![strings(&["2", ""])]);
    }
}
