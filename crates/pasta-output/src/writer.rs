//! CSV serialization of a [`QueryResult`].
//!
//! A field is quoted when it contains a comma, a double quote, CR or LF, or
//! starts or ends with whitespace; embedded quotes are doubled. The header
//! line is always written, even with no rows.

use std::borrow::Cow;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use pasta_model::QueryResult;
use tracing::debug;

use crate::error::{OutputError, Result};

/// Whether `field` must be quoted.
pub fn needs_quoting(field: &str) -> bool {
    field.contains([',', '"', '\n', '\r'])
        || field.starts_with(char::is_whitespace)
        || field.ends_with(char::is_whitespace)
}

/// Quotes `field` if needed, doubling embedded quotes.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if needs_quoting(field) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Writes `result` to any writer, calling `on_row` with the number of data
/// rows written so far. Returns the number of data rows.
pub fn write_csv_to<W, F>(result: &QueryResult, writer: W, mut on_row: F) -> csv::Result<usize>
where
    W: Write,
    F: FnMut(usize),
{
    // Fields are escaped up front; the writer must not quote them again.
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(writer);

    writer.write_record(result.headers.iter().map(|h| escape_field(h).into_owned()))?;
    for (idx, row) in result.rows.iter().enumerate() {
        writer.write_record(row.iter().map(|field| escape_field(field).into_owned()))?;
        on_row(idx + 1);
    }
    writer.flush()?;
    Ok(result.rows.len())
}

/// Writes `result` to `path`, reporting per-row progress.
pub fn write_csv_with_progress<F: FnMut(usize)>(
    result: &QueryResult,
    path: &Path,
    on_row: F,
) -> Result<usize> {
    let start = Instant::now();
    let file = File::create(path).map_err(|source| OutputError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = write_csv_to(result, file, on_row).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        rows,
        duration_ms = start.elapsed().as_millis(),
        "csv written"
    );
    Ok(rows)
}

/// Writes `result` to `path`.
pub fn write_csv(result: &QueryResult, path: &Path) -> Result<usize> {
    write_csv_with_progress(result, path, |_| {})
}
