//! PSV data ingestion for agile-pasta.
//!
//! - **PSV parsing**: headers files (first line) and data files (one record per
//!   non-blank line), fields split on `|` and trimmed
//! - **Discovery**: input `<prefix>.psv` / `<prefix>_Headers.psv` pairs and
//!   output `<prefix>_Headers.psv` / `<prefix>_Rules.psv` pairs, recursively
//! - **Loading**: one thread per input file, tables registered serially
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use pasta_ingest::{NoProgress, load_tables, scan_input_files};
//!
//! let files = scan_input_files(Path::new("data/input"))?;
//! let outcome = load_tables(&files, &NoProgress);
//! println!("{} records", outcome.database.total_records());
//! ```

mod discovery;
mod error;
mod loader;
mod psv;

// === Error Types ===
pub use error::{IngestError, Result};

// === PSV Reading ===
pub use psv::{read_headers, read_records, read_table, split_psv_line, trim_field, validate_encoding};

// === File Discovery ===
pub use discovery::{
    HEADERS_SUFFIX, InputFile, OutputConfig, PSV_EXTENSION, RULES_SUFFIX, format_file_size,
    scan_input_files, scan_output_files,
};

// === Loading ===
pub use loader::{LoadOutcome, LoadProgress, NoProgress, load_tables};
