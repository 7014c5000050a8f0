use thiserror::Error;

/// Reasons a rules line is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("invalid rule format: expected at least 3 '|'-separated fields, found {found}")]
    TooFewFields { found: usize },
    #[error("unknown rule type: {keyword}")]
    UnknownKeyword { keyword: String },
}

pub type Result<T> = std::result::Result<T, RuleError>;
