//! Condition Evaluator.
//!
//! One comparison grammar, `<field> <op> '<literal>'`, optionally wrapped in a
//! `<comparison> ? ACCEPT : REJECT` ternary for GLOBAL rules. Values compare
//! numerically only when both sides parse as numbers; otherwise they compare
//! as strings (byte-wise lexicographic order).
//!
//! Conditions are compiled once against the source headers ([`CompiledCondition`])
//! and then evaluated per row. [`evaluate_condition`] is the one-shot form.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Grammar
// =============================================================================

static SIMPLE_CONDITION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_]+)\s*(>=|<=|!=|=|>|<)\s*'([^']*)'$")
        .expect("Invalid simple condition regex")
});

static GLOBAL_TERNARY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s*\?\s*(ACCEPT|REJECT)\s*:\s*(ACCEPT|REJECT)$")
        .expect("Invalid ACCEPT/REJECT ternary regex")
});

const ACCEPT: &str = "ACCEPT";

/// Comparison operator of a simple condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl Comparison {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            ">=" => Some(Self::Ge),
            "<=" => Some(Self::Le),
            _ => None,
        }
    }

    fn holds(self, ordering: Option<Ordering>) -> bool {
        match (self, ordering) {
            (Self::Eq, Some(Ordering::Equal)) => true,
            (Self::Eq, _) => false,
            (Self::Ne, Some(Ordering::Equal)) => false,
            (Self::Ne, _) => true,
            (Self::Gt, Some(Ordering::Greater)) => true,
            (Self::Lt, Some(Ordering::Less)) => true,
            (Self::Ge, Some(Ordering::Greater | Ordering::Equal)) => true,
            (Self::Le, Some(Ordering::Less | Ordering::Equal)) => true,
            _ => false,
        }
    }
}

/// Parses a whole (trimmed) value as a finite base-10 number.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Compares a field value against a literal, numerically when both parse.
fn compare(value: &str, literal: &str, literal_number: Option<f64>, op: Comparison) -> bool {
    match (parse_number(value), literal_number) {
        (Some(left), Some(right)) => op.holds(left.partial_cmp(&right)),
        _ => op.holds(Some(value.cmp(literal))),
    }
}

// =============================================================================
// Simple conditions
// =============================================================================

/// `<field> <op> '<literal>'`, not yet bound to any headers.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleCondition {
    pub field: String,
    pub op: Comparison,
    pub literal: String,
}

impl SimpleCondition {
    /// Returns `None` when the text does not match the comparison grammar.
    pub fn parse(text: &str) -> Option<Self> {
        let captures = SIMPLE_CONDITION_REGEX.captures(text.trim())?;
        Some(Self {
            field: captures[1].to_string(),
            op: Comparison::from_symbol(&captures[2])?,
            literal: captures[3].to_string(),
        })
    }

    /// Resolves the field name to a column index of `headers`.
    pub fn bind(&self, headers: &[String]) -> BoundCondition {
        BoundCondition {
            column: headers.iter().position(|header| *header == self.field),
            op: self.op,
            literal: self.literal.clone(),
            literal_number: parse_number(&self.literal),
        }
    }
}

/// A simple condition with its column resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundCondition {
    /// `None` when the field is not a known header; such conditions are false.
    pub column: Option<usize>,
    pub op: Comparison,
    pub literal: String,
    literal_number: Option<f64>,
}

impl BoundCondition {
    pub fn evaluate<S: AsRef<str>>(&self, row: &[S]) -> bool {
        self.evaluate_tracked(row, &mut false)
    }

    /// Sets `unparseable` when the literal is numeric but the field value is not.
    pub(crate) fn evaluate_tracked<S: AsRef<str>>(&self, row: &[S], unparseable: &mut bool) -> bool {
        let Some(value) = self.column.and_then(|idx| row.get(idx)) else {
            return false;
        };
        let value = value.as_ref();
        if self.literal_number.is_some() && parse_number(value).is_none() {
            *unparseable = true;
        }
        compare(value, &self.literal, self.literal_number, self.op)
    }
}

/// Evaluates a bare comparison. Anything else, or an unknown field, is false.
pub fn evaluate_simple_condition<S: AsRef<str>>(text: &str, row: &[S], headers: &[String]) -> bool {
    SimpleCondition::parse(text).is_some_and(|condition| condition.bind(headers).evaluate(row))
}

// =============================================================================
// GLOBAL conditions
// =============================================================================

/// A GLOBAL rule condition compiled against source headers.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledCondition {
    /// `<comparison> ? ACCEPT|REJECT : ACCEPT|REJECT`; `true` means keep.
    Ternary {
        condition: Option<BoundCondition>,
        on_true: bool,
        on_false: bool,
    },
    Simple(BoundCondition),
    /// Text matching neither grammar. Rejects every row.
    NoMatch,
}

impl CompiledCondition {
    pub fn compile(text: &str, headers: &[String]) -> Self {
        let text = text.trim();
        if let Some(captures) = GLOBAL_TERNARY_REGEX.captures(text) {
            return Self::Ternary {
                condition: SimpleCondition::parse(&captures[1]).map(|c| c.bind(headers)),
                on_true: &captures[2] == ACCEPT,
                on_false: &captures[3] == ACCEPT,
            };
        }
        match SimpleCondition::parse(text) {
            Some(condition) => Self::Simple(condition.bind(headers)),
            None => Self::NoMatch,
        }
    }

    /// Whether the row is kept.
    pub fn evaluate<S: AsRef<str>>(&self, row: &[S]) -> bool {
        self.evaluate_tracked(row, &mut false)
    }

    pub(crate) fn evaluate_tracked<S: AsRef<str>>(&self, row: &[S], unparseable: &mut bool) -> bool {
        match self {
            Self::Ternary {
                condition,
                on_true,
                on_false,
            } => {
                let holds = condition
                    .as_ref()
                    .is_some_and(|c| c.evaluate_tracked(row, unparseable));
                if holds { *on_true } else { *on_false }
            }
            Self::Simple(condition) => condition.evaluate_tracked(row, unparseable),
            Self::NoMatch => false,
        }
    }
}

/// Evaluates a GLOBAL rule condition against one row.
pub fn evaluate_condition<S: AsRef<str>>(text: &str, row: &[S], headers: &[String]) -> bool {
    CompiledCondition::compile(text, headers).evaluate(row)
}
