//! Error types for output generation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while writing an output file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OutputError {
    /// The output file could not be created.
    #[error("Cannot create output file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing rows to the output file failed.
    #[error("Failed to write CSV {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;
