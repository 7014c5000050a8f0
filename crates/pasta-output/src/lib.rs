//! Output generation for agile-pasta.
//!
//! Transformation results are written as CSV next to the output headers file
//! they were produced for (`<prefix>.csv`).

mod error;
mod writer;

// === Error Types ===
pub use error::{OutputError, Result};

// === CSV ===
pub use writer::{escape_field, needs_quoting, write_csv, write_csv_to, write_csv_with_progress};
