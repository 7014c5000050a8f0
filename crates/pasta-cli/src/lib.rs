//! CLI library components for agile-pasta.

pub mod logging;
pub mod pipeline;
pub mod types;
