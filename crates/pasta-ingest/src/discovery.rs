//! File discovery for input and output folders.
//!
//! Input folders hold `<prefix>.psv` data files next to `<prefix>_Headers.psv`.
//! Output folders hold `<prefix>_Headers.psv` next to `<prefix>_Rules.psv`;
//! the generated CSV is written beside them as `<prefix>.csv`.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

pub const PSV_EXTENSION: &str = ".psv";
pub const HEADERS_SUFFIX: &str = "_Headers.psv";
pub const RULES_SUFFIX: &str = "_Rules.psv";

/// A data file paired with its headers file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub data_path: PathBuf,
    pub headers_path: PathBuf,
    pub size_bytes: u64,
    pub name_prefix: String,
}

/// An output headers file paired with its rules file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub headers_path: PathBuf,
    pub rules_path: PathBuf,
    pub name_prefix: String,
}

impl OutputConfig {
    /// Path of the CSV generated for this configuration.
    pub fn csv_path(&self) -> PathBuf {
        let dir = self.headers_path.parent().unwrap_or_else(|| Path::new(""));
        dir.join(format!("{}.csv", self.name_prefix))
    }
}

/// Recursively finds data files that have a sibling headers file.
///
/// Results are sorted by data file path.
pub fn scan_input_files(root: &Path) -> Result<Vec<InputFile>> {
    let mut files = Vec::new();
    for path in walk_files(root)? {
        let Some(filename) = file_name(&path) else {
            continue;
        };
        if filename.ends_with(HEADERS_SUFFIX) {
            continue;
        }
        let Some(prefix) = filename.strip_suffix(PSV_EXTENSION) else {
            continue;
        };
        let headers_path = sibling(&path, &format!("{prefix}{HEADERS_SUFFIX}"));
        if !headers_path.is_file() {
            tracing::debug!(path = %path.display(), "data file has no headers file, skipping");
            continue;
        }
        let size_bytes = std::fs::metadata(&path)
            .map_err(|e| IngestError::file(&path, e))?
            .len();
        files.push(InputFile {
            name_prefix: prefix.to_string(),
            data_path: path,
            headers_path,
            size_bytes,
        });
    }
    files.sort_by(|a, b| a.data_path.cmp(&b.data_path));
    Ok(files)
}

/// Recursively finds output headers files that have a sibling rules file.
///
/// Results are sorted by headers file path.
pub fn scan_output_files(root: &Path) -> Result<Vec<OutputConfig>> {
    let mut files = Vec::new();
    for path in walk_files(root)? {
        let Some(prefix) = file_name(&path).and_then(|name| name.strip_suffix(HEADERS_SUFFIX))
        else {
            continue;
        };
        let rules_path = sibling(&path, &format!("{prefix}{RULES_SUFFIX}"));
        if !rules_path.is_file() {
            continue;
        }
        files.push(OutputConfig {
            name_prefix: prefix.to_string(),
            headers_path: path.clone(),
            rules_path,
        });
    }
    files.sort_by(|a, b| a.headers_path.cmp(&b.headers_path));
    Ok(files)
}

/// Human-readable byte size with one decimal (e.g. `1.5 KB`).
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

fn sibling(path: &Path, name: &str) -> PathBuf {
    path.parent()
        .map(|dir| dir.join(name))
        .unwrap_or_else(|| PathBuf::from(name))
}

fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = std::fs::read_dir(&dir).map_err(|e| IngestError::DirectoryRead {
            path: dir.clone(),
            source: e,
        })?;
        for entry_result in entries {
            let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
                path: dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.is_file() {
                files.push(path);
            }
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_scan_input_files_pairs_and_recurses() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "employees.psv", "1|John\n");
        write(dir.path(), "employees_Headers.psv", "id|name");
        write(dir.path(), "nested/departments.psv", "10|Eng\n");
        write(dir.path(), "nested/departments_Headers.psv", "id|name");
        write(dir.path(), "orphan.psv", "1\n");
        write(dir.path(), "notes.txt", "ignored");

        let files = scan_input_files(dir.path()).unwrap();

        let prefixes: Vec<_> = files.iter().map(|f| f.name_prefix.as_str()).collect();
        assert_eq!(prefixes, vec!["employees", "departments"]);
        assert!(files.iter().all(|f| f.size_bytes > 0));
        assert!(files[1].headers_path.ends_with("nested/departments_Headers.psv"));
    }

    #[test]
    fn test_scan_output_files_requires_rules() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "summary_Headers.psv", "name|count");
        write(dir.path(), "summary_Rules.psv", "FIELD|name|first_name|Copy");
        write(dir.path(), "lonely_Headers.psv", "a");

        let files = scan_output_files(dir.path()).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name_prefix, "summary");
        assert_eq!(files[0].csv_path(), dir.path().join("summary.csv"));
    }

    #[test]
    fn test_scan_missing_directory() {
        let dir = TempDir::new().unwrap();
        let result = scan_input_files(&dir.path().join("nope"));
        assert!(matches!(result, Err(IngestError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512.0 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
    }
}
