//! Rules and output headers file content.

use pasta_model::{OutputSpec, Rule, TransformWarning, WarningSink};
use tracing::debug;

use crate::error::{Result, RuleError};

const FIELD_SEPARATOR: char = '|';
const COMMENT_MARKER: char = '#';

fn trim_part(part: &str) -> &str {
    part.trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
}

/// Parses one rule line.
///
/// ```text
/// GLOBAL|<condition>|<description>
/// FIELD|<target>|<expression>[|<description>]
/// ```
pub fn parse_rule(line: &str) -> Result<Rule> {
    let parts: Vec<&str> = line.split(FIELD_SEPARATOR).map(trim_part).collect();
    if parts.len() < 3 {
        return Err(RuleError::TooFewFields { found: parts.len() });
    }

    match parts[0] {
        "GLOBAL" => Ok(Rule::Global {
            condition: parts[1].to_string(),
            description: parts[2].to_string(),
        }),
        "FIELD" => Ok(Rule::Field {
            target: parts[1].to_string(),
            expression: parts[2].to_string(),
            description: parts.get(3).map(|d| d.to_string()),
        }),
        keyword => Err(RuleError::UnknownKeyword {
            keyword: keyword.to_string(),
        }),
    }
}

/// Parses a whole rules file, skipping comments, blank lines and malformed
/// lines. Each malformed line is reported to `sink` with its 1-based number.
pub fn load_rules<S: WarningSink>(text: &str, mut sink: S) -> Vec<Rule> {
    let mut rules = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = match raw.find(COMMENT_MARKER) {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        let line = trim_part(line);
        if line.is_empty() {
            continue;
        }

        match parse_rule(line) {
            Ok(rule) => rules.push(rule),
            Err(error) => sink.warn(TransformWarning::MalformedRule {
                line_number: index + 1,
                line: line.to_string(),
                reason: error.to_string(),
            }),
        }
    }
    debug!(rules = rules.len(), "rules loaded");
    rules
}

/// Output column names from the first line of an output headers file.
pub fn parse_output_headers(text: &str) -> OutputSpec {
    let first_line = text.lines().next().unwrap_or_default();
    let first_line = first_line.strip_prefix('\u{feff}').unwrap_or(first_line);
    let headers = first_line
        .split(FIELD_SEPARATOR)
        .map(trim_part)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    OutputSpec::new(headers)
}
