//! Rule engine for agile-pasta.
//!
//! Turns loaded tables into output rows:
//!
//! - **Rule Parser**: `GLOBAL|...` / `FIELD|...` lines, comments and
//!   malformed lines skipped with a warning
//! - **Source Selector**: first table whose columns FIELD rules reference, or a
//!   single empty row when every rule is static
//! - **Condition Evaluator**: `field op 'literal'`, numeric when both sides
//!   parse, optionally as `cond ? ACCEPT : REJECT`
//! - **Expression Evaluator**: ternaries, aliases, `+` concatenation, `*`
//!   multiplication, `UPPER` / `LOWER` / `TITLE`
//! - **Orchestrator**: AND of GLOBAL rules, then one value per output header
//!
//! Rules are compiled once per run against the source headers and then
//! applied row by row. Nothing here fails on bad rules or data; problems are
//! reported through a [`WarningSink`](pasta_model::WarningSink).
//!
//! # Example
//!
//! ```ignore
//! use pasta_transform::{TracingSink, load_rules, parse_output_headers, transform};
//!
//! let output = parse_output_headers("id|full_name");
//! let mut sink = TracingSink::new();
//! let rules = load_rules("FIELD|full_name|first_name + \" \" + last_name|", &mut sink);
//! let result = transform(&rules, &output, &database, &mut sink);
//! ```

mod check;
mod condition;
mod engine;
mod error;
mod expression;
mod parser;
mod query;
mod sink;
mod source;
mod words;

// === Error Types ===
pub use error::{Result, RuleError};

// === Parsing ===
pub use parser::{load_rules, parse_output_headers, parse_rule};

// === Evaluation ===
pub use condition::{
    BoundCondition, CompiledCondition, Comparison, SimpleCondition, evaluate_condition,
    evaluate_simple_condition,
};
pub use expression::{
    CompiledExpression, Function, Template, apply_rule, evaluate_expression, title_case,
};
pub use words::{contains_whole_word, is_word_char, whole_word_matches};

// === Orchestration ===
pub use engine::{ColumnPlan, CompiledRules, transform};
pub use source::{SourceSelection, referenced_columns, select_source};

// === Queries ===
pub use query::select_where;

// === Configuration Check ===
pub use check::{ConfigCheck, check_output_config};

// === Diagnostics ===
pub use sink::TracingSink;
