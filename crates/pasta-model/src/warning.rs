//! Recoverable conditions surfaced while loading rules and transforming data.
//!
//! None of these abort a run. They are handed to a [`WarningSink`] so callers
//! decide whether to log, collect, or count them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A non-fatal problem found during rule loading or transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformWarning {
    /// A rules line that could not be parsed and was skipped.
    MalformedRule {
        line_number: usize,
        line: String,
        reason: String,
    },
    /// FIELD rules reference input columns but no table could be selected.
    MissingSource { referenced: Vec<String> },
    /// Output columns with neither a FIELD rule nor a same-named source column.
    UnmappedColumns { columns: Vec<String> },
    /// A numeric operand did not parse in `rows` rows. Multiplications were
    /// left unevaluated; comparisons fell back to text order.
    UnparseableNumeric { expression: String, rows: usize },
}

impl TransformWarning {
    /// Short machine-friendly code, used in logs and reports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedRule { .. } => "malformed_rule",
            Self::MissingSource { .. } => "missing_source",
            Self::UnmappedColumns { .. } => "unmapped_columns",
            Self::UnparseableNumeric { .. } => "unparseable_numeric",
        }
    }
}

impl fmt::Display for TransformWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRule {
                line_number,
                line,
                reason,
            } => write!(f, "invalid rule ignored at line {line_number}: {line} ({reason})"),
            Self::MissingSource { referenced } => write!(
                f,
                "no source table could be selected for referenced fields: {}",
                referenced.join(", ")
            ),
            Self::UnmappedColumns { columns } => write!(
                f,
                "output fields with no transformation rule and no matching input header (will be empty): {}",
                columns.join(", ")
            ),
            Self::UnparseableNumeric { expression, rows } => write!(
                f,
                "non-numeric operand in `{expression}` for {rows} row(s), value used as text"
            ),
        }
    }
}

/// Side channel receiving warnings from the rule loader and the engine.
pub trait WarningSink {
    fn warn(&mut self, warning: TransformWarning);
}

impl WarningSink for Vec<TransformWarning> {
    fn warn(&mut self, warning: TransformWarning) {
        self.push(warning);
    }
}

impl<S: WarningSink + ?Sized> WarningSink for &mut S {
    fn warn(&mut self, warning: TransformWarning) {
        (**self).warn(warning);
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreWarnings;

impl WarningSink for IgnoreWarnings {
    fn warn(&mut self, _warning: TransformWarning) {}
}
