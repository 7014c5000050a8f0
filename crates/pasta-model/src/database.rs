use std::collections::BTreeMap;

use crate::query::QueryResult;
use crate::table::Table;

/// In-memory collection of loaded tables keyed by name.
///
/// Tables are enumerated in sorted name order. Registering a table under an
/// existing name replaces the previous one.
#[derive(Debug, Clone, Default)]
pub struct Database {
    tables: BTreeMap<String, Table>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `table`, returning the table it replaced.
    pub fn insert(&mut self, table: Table) -> Option<Table> {
        self.tables.insert(table.name.clone(), table)
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn total_records(&self) -> usize {
        self.tables.values().map(Table::record_count).sum()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }

    /// Project `columns` (all columns when empty) out of `table_name`.
    ///
    /// Every returned row has exactly one value per result header. Unknown
    /// columns and short records yield empty strings.
    pub fn select(&self, table_name: &str, columns: &[String]) -> Option<QueryResult> {
        let table = self.get(table_name)?;
        if columns.is_empty() {
            let rows = table
                .records
                .iter()
                .map(|record| table.normalized_row(record))
                .collect();
            return Some(QueryResult::new(table.headers.clone(), rows));
        }

        let positions: Vec<Option<usize>> = columns
            .iter()
            .map(|column| table.column_index(column))
            .collect();
        let rows = table
            .records
            .iter()
            .map(|record| {
                positions
                    .iter()
                    .map(|position| match position {
                        Some(idx) => record.get(*idx).to_string(),
                        None => String::new(),
                    })
                    .collect()
            })
            .collect();
        Some(QueryResult::new(columns.to_vec(), rows))
    }
}
