//! Expression Evaluator.
//!
//! Resolution order for a FIELD rule expression:
//!
//! 1. `<comparison> ? <value1> : <value2>` picks one branch, strips one layer of
//!    matching quotes and returns it as-is.
//! 2. An expression that is exactly a header name returns that column.
//! 3. Anything else is a template: quoted literals (`"..."`, then legacy
//!    `'...'`) are kept verbatim, whole-word header names become column
//!    references. The rendered row text then selects one of concatenation
//!    (` + `), multiplication (` * `), `UPPER(`, `LOWER(`, `TITLE(`, or the
//!    text unchanged.

use std::sync::LazyLock;

use pasta_model::Rule;
use regex::Regex;

use crate::condition::{BoundCondition, SimpleCondition, parse_number};
use crate::words::is_word_char;

static FIELD_TERNARY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s*\?\s*(.+?)\s*:\s*(.+)$").expect("Invalid field ternary regex")
});

static DOUBLE_QUOTED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""[^"]*""#).expect("Invalid double-quoted literal regex"));

static SINGLE_QUOTED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'[^']*'").expect("Invalid single-quoted literal regex"));

const CONCAT_OPERATOR: &str = " + ";
const MULTIPLY_OPERATOR: &str = " * ";

fn trim_blanks(text: &str) -> &str {
    text.trim_matches(|c| c == ' ' || c == '\t')
}

/// Removes one layer of matching `"` or `'` quotes.
fn strip_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

// =============================================================================
// Functions
// =============================================================================

/// Built-in single-argument text functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Upper,
    Lower,
    Title,
}

impl Function {
    /// In dispatch order.
    const ALL: [Self; 3] = [Self::Upper, Self::Lower, Self::Title];

    pub fn name(self) -> &'static str {
        match self {
            Self::Upper => "UPPER",
            Self::Lower => "LOWER",
            Self::Title => "TITLE",
        }
    }

    pub fn apply(self, value: &str) -> String {
        match self {
            Self::Upper => value.to_uppercase(),
            Self::Lower => value.to_lowercase(),
            Self::Title => title_case(value),
        }
    }
}

/// Lowercases everything, then uppercases the first letter and every letter
/// directly after a space. Apostrophes and hyphens do not start a word.
pub fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut previous: Option<char> = None;
    for c in value.to_lowercase().chars() {
        let starts_word = previous.is_none_or(|p| p == ' ');
        if starts_word && c.is_alphabetic() {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
        previous = Some(c);
    }
    result
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    /// Authored text outside any quoted literal.
    Code(String),
    /// Contents of a quoted literal.
    Literal(String),
    Column(usize),
}

impl Piece {
    fn render<'a, S: AsRef<str>>(&'a self, row: &'a [S]) -> Fragment<'a> {
        match self {
            Self::Code(text) => Fragment::code(text),
            Self::Literal(text) => Fragment {
                text: text.as_str(),
                literal: true,
            },
            Self::Column(idx) => {
                Fragment::code(row.get(*idx).map_or("", |value| value.as_ref()))
            }
        }
    }
}

/// Rendered text of one piece. Only literal text keeps its edge blanks inside
/// a concatenation operand.
#[derive(Debug, Clone, Copy)]
struct Fragment<'a> {
    text: &'a str,
    literal: bool,
}

impl<'a> Fragment<'a> {
    fn code(text: &'a str) -> Self {
        Self {
            text,
            literal: false,
        }
    }

    fn is_blank(&self) -> bool {
        !self.literal && trim_blanks(self.text).is_empty()
    }
}

/// A general expression with literals and column references resolved.
///
/// The operator is chosen per row from the fully rendered text, so column
/// values and literal contents take part in dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pieces: Vec<Piece>,
}

impl Template {
    pub fn compile(text: &str, headers: &[String]) -> Self {
        Self {
            pieces: tokenize(text, headers),
        }
    }

    /// Whether the result depends on the row at all.
    pub fn is_constant(&self) -> bool {
        !self.pieces.iter().any(|p| matches!(p, Piece::Column(_)))
    }

    pub fn render<S: AsRef<str>>(&self, row: &[S]) -> String {
        self.render_tracked(row, &mut false)
    }

    /// Sets `unparseable` when a multiplication is left unevaluated.
    pub(crate) fn render_tracked<S: AsRef<str>>(&self, row: &[S], unparseable: &mut bool) -> String {
        let fragments: Vec<Fragment<'_>> = self.pieces.iter().map(|p| p.render(row)).collect();
        let text: String = fragments.iter().map(|f| f.text).collect();

        if text.contains(CONCAT_OPERATOR) {
            return concatenate(&fragments);
        }
        if text.contains(MULTIPLY_OPERATOR) {
            return multiply(&text).unwrap_or_else(|| {
                *unparseable = true;
                text
            });
        }
        match call(&text) {
            Some(value) => value,
            None => text,
        }
    }
}

/// Splits text into code and literal pieces, then resolves whole-word header
/// names inside code into column references.
///
/// A literal counts as a word character for its neighbours, so `name"x"` does
/// not reference `name`.
fn tokenize(text: &str, headers: &[String]) -> Vec<Piece> {
    let mut columns: Vec<(&str, usize)> = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        if !header.is_empty() && !columns.iter().any(|(name, _)| *name == header.as_str()) {
            columns.push((header.as_str(), idx));
        }
    }
    columns.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut spans: Vec<(&str, bool)> = Vec::new();
    let mut last = 0;
    for quoted in DOUBLE_QUOTED_REGEX.find_iter(text) {
        split_single_quoted(&text[last..quoted.start()], &mut spans);
        spans.push((&quoted.as_str()[1..quoted.len() - 1], true));
        last = quoted.end();
    }
    split_single_quoted(&text[last..], &mut spans);

    let mut pieces = Vec::new();
    for (i, &(span, is_literal)) in spans.iter().enumerate() {
        if is_literal {
            pieces.push(Piece::Literal(span.to_string()));
            continue;
        }
        let left_blocked = i > 0 && spans[i - 1].1;
        let right_blocked = spans.get(i + 1).is_some_and(|s| s.1);
        substitute_columns(span, left_blocked, right_blocked, &columns, &mut pieces);
    }
    pieces
}

fn split_single_quoted<'a>(code: &'a str, spans: &mut Vec<(&'a str, bool)>) {
    let mut last = 0;
    for quoted in SINGLE_QUOTED_REGEX.find_iter(code) {
        spans.push((&code[last..quoted.start()], false));
        spans.push((&quoted.as_str()[1..quoted.len() - 1], true));
        last = quoted.end();
    }
    spans.push((&code[last..], false));
}

fn substitute_columns(
    code: &str,
    left_blocked: bool,
    right_blocked: bool,
    columns: &[(&str, usize)],
    pieces: &mut Vec<Piece>,
) {
    let bounded = |start: usize, end: usize| {
        let before_ok = match code[..start].chars().next_back() {
            Some(c) => !is_word_char(c),
            None => !left_blocked,
        };
        let after_ok = match code[end..].chars().next() {
            Some(c) => !is_word_char(c),
            None => !right_blocked,
        };
        before_ok && after_ok
    };
    let push_code = |pieces: &mut Vec<Piece>, text: &str| {
        if !text.is_empty() {
            pieces.push(Piece::Code(text.to_string()));
        }
    };

    let mut text_start = 0;
    let mut pos = 0;
    while pos < code.len() {
        let hit = columns
            .iter()
            .find(|(name, _)| code[pos..].starts_with(name) && bounded(pos, pos + name.len()));
        match hit {
            Some(&(name, column)) => {
                push_code(pieces, &code[text_start..pos]);
                pieces.push(Piece::Column(column));
                pos += name.len();
                text_start = pos;
            }
            None => pos += code[pos..].chars().next().map_or(1, char::len_utf8),
        }
    }
    push_code(pieces, &code[text_start..]);
}

/// Joins `+`-separated operands.
///
/// An operand that is only whitespace contributes exactly one space. Other
/// operands lose blanks at their edges, except blanks inside a quoted literal.
fn concatenate(fragments: &[Fragment<'_>]) -> String {
    let mut operands: Vec<Vec<Fragment<'_>>> = vec![Vec::new()];
    for fragment in fragments {
        let mut parts = fragment.text.split('+');
        if let (Some(first), Some(current)) = (parts.next(), operands.last_mut()) {
            current.push(Fragment {
                text: first,
                ..*fragment
            });
        }
        for part in parts {
            operands.push(vec![Fragment {
                text: part,
                ..*fragment
            }]);
        }
    }

    let mut result = String::new();
    for operand in &operands {
        let text: String = operand.iter().map(|f| f.text).collect();
        if !text.is_empty() && text.chars().all(char::is_whitespace) {
            result.push(' ');
            continue;
        }

        let Some(first) = operand.iter().position(|f| !f.is_blank()) else {
            continue;
        };
        let last = operand.iter().rposition(|f| !f.is_blank()).unwrap_or(first);
        for (idx, fragment) in operand.iter().enumerate().take(last + 1).skip(first) {
            let mut text = fragment.text;
            if !fragment.literal && idx == first {
                text = text.trim_start_matches([' ', '\t']);
            }
            if !fragment.literal && idx == last {
                text = text.trim_end_matches([' ', '\t']);
            }
            result.push_str(text);
        }
    }
    result
}

/// `<left> * <right>` over whitespace-separated tokens; `None` if either side
/// is not a number.
fn multiply(text: &str) -> Option<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    match tokens.as_slice() {
        [left, "*", right, ..] => {
            let product = parse_number(left)? * parse_number(right)?;
            Some(product.to_string())
        }
        _ => None,
    }
}

/// A leading `UPPER(` / `LOWER(` / `TITLE(` call applied to the text up to the
/// first `)`. `None` when the text is not a call or the `)` is missing.
fn call(text: &str) -> Option<String> {
    let (function, rest) = Function::ALL.into_iter().find_map(|f| {
        text.strip_prefix(f.name())
            .and_then(|rest| rest.strip_prefix('('))
            .map(|rest| (f, rest))
    })?;
    let end = rest.find(')')?;
    Some(function.apply(&rest[..end]))
}

// =============================================================================
// Compiled expressions
// =============================================================================

/// A FIELD rule expression compiled against source headers.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledExpression {
    Ternary {
        condition: Option<BoundCondition>,
        when_true: String,
        when_false: String,
    },
    Column(usize),
    /// Expression whose value does not depend on the row.
    Constant(String),
    Template(Template),
}

impl CompiledExpression {
    pub fn compile(text: &str, headers: &[String]) -> Self {
        if let Some(captures) = FIELD_TERNARY_REGEX.captures(text) {
            let branch = |idx: usize| strip_quotes(trim_blanks(&captures[idx])).to_string();
            return Self::Ternary {
                condition: SimpleCondition::parse(trim_blanks(&captures[1]))
                    .map(|c| c.bind(headers)),
                when_true: branch(2),
                when_false: branch(3),
            };
        }

        if let Some(column) = headers.iter().position(|header| header == text) {
            return Self::Column(column);
        }

        let template = Template::compile(text, headers);
        if template.is_constant() {
            Self::Constant(template.render::<&str>(&[]))
        } else {
            Self::Template(template)
        }
    }

    pub fn evaluate<S: AsRef<str>>(&self, row: &[S]) -> String {
        self.evaluate_tracked(row, &mut false)
    }

    /// Sets `unparseable` when a numeric operand did not parse.
    pub(crate) fn evaluate_tracked<S: AsRef<str>>(&self, row: &[S], unparseable: &mut bool) -> String {
        match self {
            Self::Ternary {
                condition,
                when_true,
                when_false,
            } => {
                if condition
                    .as_ref()
                    .is_some_and(|c| c.evaluate_tracked(row, unparseable))
                {
                    when_true.clone()
                } else {
                    when_false.clone()
                }
            }
            Self::Column(idx) => row.get(*idx).map_or("", |value| value.as_ref()).to_string(),
            Self::Constant(value) => value.clone(),
            Self::Template(template) => template.render_tracked(row, unparseable),
        }
    }
}

/// Evaluates a FIELD expression against one row.
pub fn evaluate_expression<S: AsRef<str>>(text: &str, row: &[S], headers: &[String]) -> String {
    CompiledExpression::compile(text, headers).evaluate(row)
}

/// Value a FIELD rule produces for one row; `None` for GLOBAL rules.
pub fn apply_rule<S: AsRef<str>>(rule: &Rule, row: &[S], headers: &[String]) -> Option<String> {
    match rule {
        Rule::Field { expression, .. } => Some(evaluate_expression(expression, row, headers)),
        Rule::Global { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn employee() -> (Vec<String>, Vec<&'static str>) {
        (
            headers(&["id", "first_name", "last_name", "age", "salary", "name"]),
            vec!["1", "John", "Doe", "30", "75000", "Ann"],
        )
    }

    #[test]
    fn bare_alias_returns_column() {
        let (h, row) = employee();
        assert_eq!(evaluate_expression("first_name", &row, &h), "John");
        assert_eq!(CompiledExpression::compile("salary", &h), CompiledExpression::Column(4));
    }

    #[test]
    fn concatenation_keeps_literal_spacing() {
        let (h, row) = employee();
        assert_eq!(evaluate_expression(r#""Hello, " + name + "!""#, &row, &h), "Hello, Ann!");
        assert_eq!(
            evaluate_expression(r#"first_name + " " + last_name"#, &row, &h),
            "John Doe"
        );
        assert_eq!(
            evaluate_expression("last_name + ', ' + first_name", &row, &h),
            "Doe, John"
        );
        assert_eq!(evaluate_expression("first_name +   + last_name", &row, &h), "John Doe");
    }

    #[test]
    fn blank_operands_join_with_one_space() {
        let h = headers(&["first", "mid", "last"]);
        let row = ["John", "", "Doe"];
        assert_eq!(evaluate_expression("first + mid + last", &row, &h), "John Doe");
        assert_eq!(evaluate_expression(r#"first + "   " + last"#, &row, &h), "John Doe");
        assert_eq!(evaluate_expression("first + '\t' + last", &row, &h), "John Doe");

        let row = ["John", "Q", "Doe"];
        assert_eq!(evaluate_expression("first + mid + last", &row, &h), "JohnQDoe");
        assert_eq!(evaluate_expression(r#"first + " " + mid + ". " + last"#, &row, &h), "John Q. Doe");
    }

    #[test]
    fn literals_are_not_substituted() {
        let (h, row) = employee();
        assert_eq!(
            evaluate_expression(r#""name: " + name"#, &row, &h),
            "name: Ann"
        );
        assert_eq!(evaluate_expression(r#"UPPER("first_name")"#, &row, &h), "FIRST_NAME");
    }

    #[test]
    fn whole_word_substitution_only() {
        let h = headers(&["name", "first_name"]);
        let row = ["N", "F"];
        assert_eq!(evaluate_expression("first_name + name", &row, &h), "FN");
        assert_eq!(evaluate_expression("names", &row, &h), "names");
        assert_eq!(evaluate_expression("name_x", &row, &h), "name_x");
    }

    #[test]
    fn multiplication() {
        let (h, row) = employee();
        assert_eq!(evaluate_expression("age * 2", &row, &h), "60");
        assert_eq!(evaluate_expression("age * 1.5", &row, &h), "45");
        assert_eq!(evaluate_expression("first_name * 2", &row, &h), "John * 2");
    }

    #[test]
    fn operators_inside_rendered_text_dispatch() {
        let h = headers(&["formula", "label"]);
        assert_eq!(
            CompiledExpression::compile(r#""6 * 7""#, &h),
            CompiledExpression::Constant("42".to_string())
        );
        assert_eq!(evaluate_expression("formula", &["3 * 4", ""], &h), "3 * 4");
        assert_eq!(evaluate_expression("UPPER(label)", &["", "a)b"], &h), "A");
        assert_eq!(evaluate_expression(r#"UPPER("a)b")"#, &["", ""], &h), "A");
        assert_eq!(evaluate_expression("LOWER(label)", &["", "X + Y"], &h), "LOWER(XY)");
    }

    #[test]
    fn unevaluated_multiplication_is_tracked() {
        let (h, row) = employee();
        let doubled = CompiledExpression::compile("salary * 2", &h);

        let mut unparseable = false;
        assert_eq!(doubled.evaluate_tracked(&row, &mut unparseable), "150000");
        assert!(!unparseable);

        let blank = vec!["1", "John", "Doe", "30", "", "Ann"];
        assert_eq!(doubled.evaluate_tracked(&blank, &mut unparseable), " * 2");
        assert!(unparseable);
    }

    #[test]
    fn division_passes_through() {
        let (h, row) = employee();
        assert_eq!(evaluate_expression("salary / 12", &row, &h), "75000 / 12");
    }

    #[test]
    fn text_functions() {
        let (h, row) = employee();
        assert_eq!(evaluate_expression("UPPER(first_name)", &row, &h), "JOHN");
        assert_eq!(evaluate_expression("LOWER(last_name)", &row, &h), "doe");
        assert_eq!(evaluate_expression(r#"TITLE("bob o'neil")"#, &row, &h), "Bob O'neil");
        assert_eq!(evaluate_expression(r#"TITLE("mary-jane  SMITH")"#, &row, &h), "Mary-jane  Smith");
        assert_eq!(evaluate_expression("UPPER(first_name", &row, &h), "UPPER(John");
    }

    #[test]
    fn concatenation_wins_over_functions() {
        let (h, row) = employee();
        assert_eq!(
            evaluate_expression(r#"UPPER(first_name) + "!""#, &row, &h),
            "UPPER(John)!"
        );
    }

    #[test]
    fn ternary_picks_branch_without_further_evaluation() {
        let (h, row) = employee();
        let expr = r#"salary >= '75000' ? "High" : 'Low'"#;
        assert_eq!(evaluate_expression(expr, &row, &h), "High");
        let low = ["1", "Jane", "Smith", "25", "65000", "Jane"];
        assert_eq!(evaluate_expression(expr, &low, &h), "Low");
        assert_eq!(
            evaluate_expression("age > '18' ? UPPER(first_name) : none", &row, &h),
            "UPPER(first_name)"
        );
        assert_eq!(evaluate_expression("bogus ? a : b", &row, &h), "b");
    }

    #[test]
    fn static_expressions_fold_to_constants() {
        let h = headers(&["id"]);
        assert_eq!(
            CompiledExpression::compile(r#""Hi""#, &h),
            CompiledExpression::Constant("Hi".to_string())
        );
        assert!(matches!(
            CompiledExpression::compile("id + 1", &h),
            CompiledExpression::Template(_)
        ));
    }

    #[test]
    fn short_rows_read_as_empty() {
        let h = headers(&["a", "b"]);
        assert_eq!(evaluate_expression("b", &["x"], &h), "");
        assert_eq!(evaluate_expression("UPPER(b)", &["x"], &h), "");
        assert_eq!(evaluate_expression("a + b", &["x"], &h), "x ");
    }

    #[test]
    fn apply_rule_ignores_global_rules() {
        let (h, row) = employee();
        let rule = Rule::field("greeting", r#""Hello, " + name + "!""#);
        assert_eq!(apply_rule(&rule, &row, &h).as_deref(), Some("Hello, Ann!"));
        assert_eq!(apply_rule(&Rule::global("age > '1'"), &row, &h), None);
    }

    #[test]
    fn quote_stripping() {
        assert_eq!(strip_quotes(r#""x""#), "x");
        assert_eq!(strip_quotes("'x'"), "x");
        assert_eq!(strip_quotes("\""), "\"");
        assert_eq!(strip_quotes(r#""x'"#), r#""x'"#);
    }
}
