//! Core data types for agile-pasta.
//!
//! - [`Table`] / [`Record`]: loaded input data, read-only during transformation
//! - [`Database`]: tables keyed by name, last registration wins
//! - [`QueryResult`]: headers plus rows, produced by selection and transformation
//! - [`Rule`] / [`OutputSpec`]: parsed rules and output column order
//! - [`TransformWarning`] / [`WarningSink`]: recoverable diagnostics

pub mod database;
pub mod query;
pub mod rule;
pub mod table;
pub mod warning;

pub use database::Database;
pub use query::QueryResult;
pub use rule::{OutputSpec, Rule};
pub use table::{Record, Table};
pub use warning::{IgnoreWarnings, TransformWarning, WarningSink};
