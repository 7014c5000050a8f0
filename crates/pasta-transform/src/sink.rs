use pasta_model::{TransformWarning, WarningSink};
use tracing::warn;

/// Emits every warning as a `tracing` event and keeps it for reporting.
#[derive(Debug, Default)]
pub struct TracingSink {
    output: Option<String>,
    warnings: Vec<TransformWarning>,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags every event with the output configuration it belongs to.
    pub fn for_output(name: impl Into<String>) -> Self {
        Self {
            output: Some(name.into()),
            warnings: Vec::new(),
        }
    }

    pub fn warnings(&self) -> &[TransformWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<TransformWarning> {
        self.warnings
    }
}

impl WarningSink for TracingSink {
    fn warn(&mut self, warning: TransformWarning) {
        match &self.output {
            Some(output) => warn!(output = %output, code = warning.code(), "{warning}"),
            None => warn!(code = warning.code(), "{warning}"),
        }
        self.warnings.push(warning);
    }
}
