use std::collections::HashMap;
use std::path::PathBuf;

/// One line of a data file: ordered string fields with no intrinsic typing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub fields: Vec<String>,
}

impl Record {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Field at `index`, or `""` when the record is short.
    pub fn get(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Vec<String>> for Record {
    fn from(fields: Vec<String>) -> Self {
        Self { fields }
    }
}

/// A loaded input table.
///
/// Records may be shorter or longer than `headers`; readers treat missing
/// fields as empty and ignore extra ones.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub records: Vec<Record>,
    /// Data file this table was parsed from, if any.
    pub source_file: Option<PathBuf>,
    header_index: HashMap<String, usize>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>, records: Vec<Record>) -> Self {
        let header_index = build_header_index(&headers);
        Self {
            name: name.into(),
            headers,
            records,
            source_file: None,
            header_index,
        }
    }

    pub fn with_source_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_file = Some(path.into());
        self
    }

    /// Position of `header`, first occurrence wins.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.header_index.get(header).copied()
    }

    /// Value of `header` in record `record_idx`; `""` for unknown headers,
    /// out-of-range records, or short records.
    pub fn field(&self, record_idx: usize, header: &str) -> &str {
        let Some(record) = self.records.get(record_idx) else {
            return "";
        };
        match self.column_index(header) {
            Some(idx) => record.get(idx),
            None => "",
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Copy of `record` padded or truncated to the header width.
    pub fn normalized_row(&self, record: &Record) -> Vec<String> {
        (0..self.headers.len())
            .map(|idx| record.get(idx).to_string())
            .collect()
    }
}

fn build_header_index(headers: &[String]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(headers.len());
    for (position, header) in headers.iter().enumerate() {
        index.entry(header.clone()).or_insert(position);
    }
    index
}
