//! Transformation Orchestrator.

use std::time::Instant;

use pasta_model::{Database, OutputSpec, QueryResult, Rule, TransformWarning, WarningSink};
use tracing::{debug, info_span};

use crate::condition::CompiledCondition;
use crate::expression::CompiledExpression;
use crate::source::{SourceSelection, select_source};

/// How one output column gets its value.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnPlan {
    /// First FIELD rule targeting the column.
    Expression(CompiledExpression),
    /// Same-named source column.
    PassThrough(usize),
    /// Always empty.
    Unmapped,
}

/// Rules compiled against one set of source headers.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    filters: Vec<CompiledCondition>,
    columns: Vec<ColumnPlan>,
    unmapped: Vec<String>,
    /// Rule text per filter, then per column (empty unless an expression).
    texts: Vec<String>,
}

impl CompiledRules {
    pub fn compile(rules: &[Rule], output: &OutputSpec, source_headers: &[String]) -> Self {
        let mut texts = Vec::new();
        let filters = rules
            .iter()
            .filter_map(|rule| match rule {
                Rule::Global { condition, .. } => {
                    texts.push(condition.clone());
                    Some(CompiledCondition::compile(condition, source_headers))
                }
                Rule::Field { .. } => None,
            })
            .collect();

        let mut unmapped = Vec::new();
        let columns = output
            .headers
            .iter()
            .map(|header| {
                let rule = rules.iter().find_map(|rule| match rule {
                    Rule::Field {
                        target, expression, ..
                    } if target == header => Some(expression),
                    _ => None,
                });
                if let Some(expression) = rule {
                    texts.push(expression.clone());
                    return ColumnPlan::Expression(CompiledExpression::compile(
                        expression,
                        source_headers,
                    ));
                }
                texts.push(String::new());
                match source_headers.iter().position(|h| h == header) {
                    Some(idx) => ColumnPlan::PassThrough(idx),
                    None => {
                        unmapped.push(header.clone());
                        ColumnPlan::Unmapped
                    }
                }
            })
            .collect();

        Self {
            filters,
            columns,
            unmapped,
            texts,
        }
    }

    /// Whether a source row passes every GLOBAL rule.
    pub fn accepts<S: AsRef<str>>(&self, row: &[S]) -> bool {
        self.filters.iter().all(|filter| filter.evaluate(row))
    }

    /// Output values for one source row, in output header order.
    pub fn project<S: AsRef<str>>(&self, row: &[S]) -> Vec<String> {
        let mut fallbacks = vec![0; self.texts.len()];
        self.project_counted(row, &mut fallbacks)
    }

    /// Filters and projects one row. `fallbacks[i]` is bumped when rule text
    /// `i` (filters first, then columns) met a non-numeric operand.
    fn apply_row<S: AsRef<str>>(&self, row: &[S], fallbacks: &mut [usize]) -> Option<Vec<String>> {
        for (idx, filter) in self.filters.iter().enumerate() {
            let mut unparseable = false;
            let keep = filter.evaluate_tracked(row, &mut unparseable);
            if unparseable {
                bump(fallbacks, idx);
            }
            if !keep {
                return None;
            }
        }
        Some(self.project_counted(row, fallbacks))
    }

    fn project_counted<S: AsRef<str>>(&self, row: &[S], fallbacks: &mut [usize]) -> Vec<String> {
        let offset = self.filters.len();
        self.columns
            .iter()
            .enumerate()
            .map(|(column, plan)| match plan {
                ColumnPlan::Expression(expression) => {
                    let mut unparseable = false;
                    let value = expression.evaluate_tracked(row, &mut unparseable);
                    if unparseable {
                        bump(fallbacks, offset + column);
                    }
                    value
                }
                ColumnPlan::PassThrough(idx) => {
                    row.get(*idx).map_or("", |value| value.as_ref()).to_string()
                }
                ColumnPlan::Unmapped => String::new(),
            })
            .collect()
    }

    pub fn columns(&self) -> &[ColumnPlan] {
        &self.columns
    }

    /// Output headers with neither a FIELD rule nor a same-named source column.
    pub fn unmapped(&self) -> &[String] {
        &self.unmapped
    }
}

fn bump(counts: &mut [usize], idx: usize) {
    if let Some(count) = counts.get_mut(idx) {
        *count += 1;
    }
}

/// Filters the selected source with GLOBAL rules and projects every surviving
/// row onto the output headers.
///
/// Returns `None` when there are no output headers. Recoverable problems are
/// reported to `sink`; row order follows the source.
pub fn transform<S: WarningSink>(
    rules: &[Rule],
    output: &OutputSpec,
    database: &Database,
    mut sink: S,
) -> Option<QueryResult> {
    if output.is_empty() {
        debug!("no output headers, nothing to transform");
        return None;
    }
    let _span = info_span!("transform_rules", columns = output.len(), rules = rules.len()).entered();
    let start = Instant::now();

    let source = match select_source(rules, database) {
        SourceSelection::NoTables => return Some(QueryResult::empty(output.headers.clone())),
        SourceSelection::Missing { referenced, .. } => {
            sink.warn(TransformWarning::MissingSource { referenced });
            return Some(QueryResult::empty(output.headers.clone()));
        }
        selection => selection.into_source().unwrap_or_default(),
    };

    let compiled = CompiledRules::compile(rules, output, &source.headers);
    if !compiled.unmapped().is_empty() {
        sink.warn(TransformWarning::UnmappedColumns {
            columns: compiled.unmapped().to_vec(),
        });
    }

    let source_rows = source.rows.len();
    let mut fallbacks = vec![0; compiled.texts.len()];
    let rows: Vec<Vec<String>> = source
        .rows
        .iter()
        .filter_map(|row| compiled.apply_row(row.as_slice(), &mut fallbacks))
        .collect();
    for (expression, &count) in compiled.texts.iter().zip(&fallbacks) {
        if count > 0 {
            sink.warn(TransformWarning::UnparseableNumeric {
                expression: expression.clone(),
                rows: count,
            });
        }
    }

    debug!(
        source_rows,
        output_rows = rows.len(),
        duration_ms = start.elapsed().as_millis(),
        "rules applied"
    );
    Some(QueryResult::new(output.headers.clone(), rows))
}
