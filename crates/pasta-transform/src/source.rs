//! Source Selector.
//!
//! Picks the single table FIELD rules draw from. This is a first-match
//! heuristic over tables in name order, not a join: the first table with any
//! column referenced (as a whole word) by any FIELD expression wins.

use pasta_model::{Database, QueryResult, Rule, Table};
use tracing::debug;

use crate::words::contains_whole_word;

/// Outcome of source selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelection {
    /// Rows of the first table whose columns FIELD rules reference.
    Table {
        name: String,
        referenced: Vec<String>,
        source: QueryResult,
    },
    /// No FIELD rule references any loaded column: a single zero-column row,
    /// so static rules still produce one output row.
    Static,
    /// Nothing to transform: no tables are loaded and no FIELD rules exist.
    NoTables,
    /// References were found but the table could not be read back.
    Missing { name: String, referenced: Vec<String> },
}

impl SourceSelection {
    /// Source headers and rows to transform; `None` when there are none.
    pub fn into_source(self) -> Option<QueryResult> {
        match self {
            Self::Table { source, .. } => Some(source),
            Self::Static => Some(QueryResult::new(Vec::new(), vec![Vec::new()])),
            Self::NoTables | Self::Missing { .. } => None,
        }
    }
}

fn field_expressions(rules: &[Rule]) -> impl Iterator<Item = &str> {
    rules.iter().filter_map(|rule| match rule {
        Rule::Field { expression, .. } => Some(expression.as_str()),
        Rule::Global { .. } => None,
    })
}

/// Columns of `table` referenced by at least one FIELD expression.
pub fn referenced_columns(rules: &[Rule], table: &Table) -> Vec<String> {
    table
        .headers
        .iter()
        .filter(|header| field_expressions(rules).any(|expr| contains_whole_word(expr, header)))
        .cloned()
        .collect()
}

pub fn select_source(rules: &[Rule], database: &Database) -> SourceSelection {
    if database.is_empty() {
        return if field_expressions(rules).next().is_some() {
            SourceSelection::Static
        } else {
            SourceSelection::NoTables
        };
    }

    for table in database.tables() {
        let referenced = referenced_columns(rules, table);
        if referenced.is_empty() {
            continue;
        }
        debug!(table = %table.name, ?referenced, "source table selected");
        return match database.select(&table.name, &[]) {
            Some(source) => SourceSelection::Table {
                name: table.name.clone(),
                referenced,
                source,
            },
            None => SourceSelection::Missing {
                name: table.name.clone(),
                referenced,
            },
        };
    }

    debug!("no FIELD rule references an input column, using a static source");
    SourceSelection::Static
}
