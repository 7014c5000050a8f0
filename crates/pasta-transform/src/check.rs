//! Sanity check of one output configuration (headers file + rules file).

use pasta_model::{OutputSpec, Rule, TransformWarning};

use crate::parser::{load_rules, parse_output_headers};

/// What an output configuration parses to, and what is wrong with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigCheck {
    pub output: OutputSpec,
    pub rules: Vec<Rule>,
    /// One [`TransformWarning::MalformedRule`] per rejected rules line.
    pub malformed: Vec<TransformWarning>,
}

impl ConfigCheck {
    pub fn has_headers(&self) -> bool {
        !self.output.is_empty()
    }

    /// At least one output header and every rules line parses.
    pub fn passed(&self) -> bool {
        self.has_headers() && self.malformed.is_empty()
    }

    pub fn headers_problem(&self) -> Option<&'static str> {
        (!self.has_headers()).then_some("output headers file has no header names")
    }

    /// Human-readable problems, empty when the check passed.
    pub fn problems(&self) -> Vec<String> {
        let mut problems: Vec<String> = self
            .headers_problem()
            .map(str::to_string)
            .into_iter()
            .collect();
        problems.extend(self.malformed.iter().map(ToString::to_string));
        problems
    }
}

/// Parses both files and records every problem instead of stopping at the first.
pub fn check_output_config(headers_text: &str, rules_text: &str) -> ConfigCheck {
    let mut malformed: Vec<TransformWarning> = Vec::new();
    let rules = load_rules(rules_text, &mut malformed);
    ConfigCheck {
        output: parse_output_headers(headers_text),
        rules,
        malformed,
    }
}
