use serde::{Deserialize, Serialize};

/// A parsed transformation rule.
///
/// Rules are kept in declaration order; for FIELD rules the first rule
/// targeting an output column wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Rule {
    /// Row filter, optionally written as `cond ? ACCEPT : REJECT`.
    Global {
        condition: String,
        description: String,
    },
    /// Value-producing expression for one output column.
    Field {
        target: String,
        expression: String,
        description: Option<String>,
    },
}

impl Rule {
    pub fn global(condition: impl Into<String>) -> Self {
        Self::Global {
            condition: condition.into(),
            description: String::new(),
        }
    }

    pub fn field(target: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::Field {
            target: target.into(),
            expression: expression.into(),
            description: None,
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global { .. })
    }

    /// Output column this rule produces, `None` for GLOBAL rules.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Global { .. } => None,
            Self::Field { target, .. } => Some(target),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Global { description, .. } if description.is_empty() => None,
            Self::Global { description, .. } => Some(description),
            Self::Field { description, .. } => description.as_deref(),
        }
    }
}

/// Ordered output column names for one output file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub headers: Vec<String>,
}

impl OutputSpec {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers }
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}
