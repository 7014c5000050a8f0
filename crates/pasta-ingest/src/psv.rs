//! Pipe-separated value parsing.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use pasta_model::{Record, Table};
use tracing::debug;

use crate::error::{IngestError, Result};

const UTF8_BOM: char = '\u{feff}';

/// Trims the whitespace PSV files tolerate around fields.
pub fn trim_field(value: &str) -> &str {
    value.trim_matches([' ', '\t', '\r', '\n'])
}

/// Splits one PSV line on `|`, trimming every field.
pub fn split_psv_line(line: &str) -> Vec<String> {
    line.split('|')
        .map(|field| trim_field(field).to_string())
        .collect()
}

/// Rejects files starting with a UTF-16 byte order mark.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| IngestError::file(path, e))?;
    let mut buffer = [0u8; 2];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes_read == 2 {
        if buffer == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }
    Ok(())
}

/// Reads the column names from the first line of a headers file.
pub fn read_headers(path: &Path) -> Result<Vec<String>> {
    validate_encoding(path)?;
    let file = File::open(path).map_err(|e| IngestError::file(path, e))?;
    let mut reader = BufReader::new(file);
    let mut line = String::new();
    let bytes = reader
        .read_line(&mut line)
        .map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
    if bytes == 0 {
        return Err(IngestError::EmptyHeaders {
            path: path.to_path_buf(),
        });
    }
    let line = trim_field(line.strip_prefix(UTF8_BOM).unwrap_or(&line));
    if line.is_empty() {
        return Ok(Vec::new());
    }
    Ok(split_psv_line(line))
}

/// Reads every non-blank line of a data file as a record.
///
/// `on_progress` receives the number of bytes consumed so far after each line.
pub fn read_records<F>(path: &Path, mut on_progress: F) -> Result<Vec<Record>>
where
    F: FnMut(u64),
{
    validate_encoding(path)?;
    let file = File::open(path).map_err(|e| IngestError::file(path, e))?;
    let mut reader = BufReader::new(file);
    let mut records = Vec::new();
    let mut line = String::new();
    let mut position = 0u64;
    let mut first = true;

    loop {
        line.clear();
        let bytes = reader
            .read_line(&mut line)
            .map_err(|e| IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })?;
        if bytes == 0 {
            break;
        }
        position += bytes as u64;

        let mut content = line.as_str();
        if first {
            content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
            first = false;
        }
        let content = trim_field(content);
        if !content.is_empty() {
            records.push(Record::new(split_psv_line(content)));
        }
        on_progress(position);
    }

    Ok(records)
}

/// Parses a data file and its headers file into a table named after the
/// data file stem.
pub fn read_table<F>(data_path: &Path, headers_path: &Path, on_progress: F) -> Result<Table>
where
    F: FnMut(u64),
{
    let headers = read_headers(headers_path)?;
    let records = read_records(data_path, on_progress)?;
    let name = data_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string();

    let short = records
        .iter()
        .filter(|record| record.len() != headers.len())
        .count();
    if short > 0 {
        debug!(
            table = %name,
            columns = headers.len(),
            mismatched_records = short,
            "records with a field count different from the header count"
        );
    }

    Ok(Table::new(name, headers, records).with_source_file(data_path))
}
