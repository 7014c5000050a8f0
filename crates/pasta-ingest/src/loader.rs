//! Parallel loading of discovered input files into a [`Database`].

use std::path::PathBuf;
use std::time::Instant;

use pasta_model::{Database, Table};
use tracing::{debug, info, warn};

use crate::discovery::InputFile;
use crate::error::{IngestError, Result};
use crate::psv::read_table;

/// Outcome of loading a set of input files.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub database: Database,
    /// Files that could not be parsed, in discovery order.
    pub failures: Vec<(PathBuf, IngestError)>,
}

/// Observer for per-file byte progress during a load.
pub trait LoadProgress: Sync {
    /// Per-file callback handed to the parser; receives bytes consumed so far.
    type Tracker: FnMut(u64);

    fn start(&self, file: &InputFile) -> Self::Tracker;

    fn finish(&self, _file: &InputFile, _outcome: std::result::Result<usize, &IngestError>) {}
}

/// Progress observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl LoadProgress for NoProgress {
    type Tracker = fn(u64);

    fn start(&self, _file: &InputFile) -> Self::Tracker {
        |_| {}
    }
}

/// Loads every file on its own thread and registers the tables in discovery
/// order once all threads have finished.
///
/// A file that fails to parse is reported in [`LoadOutcome::failures`] and does
/// not stop the others.
pub fn load_tables<P: LoadProgress>(files: &[InputFile], progress: &P) -> LoadOutcome {
    let start = Instant::now();
    let results: Vec<Result<Table>> = std::thread::scope(|scope| {
        let handles: Vec<_> = files
            .iter()
            .map(|file| {
                scope.spawn(move || {
                    let tracker = progress.start(file);
                    let result = read_table(&file.data_path, &file.headers_path, tracker);
                    progress.finish(file, result.as_ref().map(Table::record_count));
                    result
                })
            })
            .collect();
        handles
            .into_iter()
            .zip(files)
            .map(|(handle, file)| {
                handle.join().unwrap_or_else(|_| {
                    Err(IngestError::LoaderPanicked {
                        path: file.data_path.clone(),
                    })
                })
            })
            .collect()
    });

    let mut outcome = LoadOutcome::default();
    for (file, result) in files.iter().zip(results) {
        match result {
            Ok(table) => {
                debug!(
                    table = %table.name,
                    records = table.record_count(),
                    columns = table.headers.len(),
                    "table loaded"
                );
                if outcome.database.insert(table).is_some() {
                    warn!(
                        table = %file.name_prefix,
                        path = %file.data_path.display(),
                        "table name loaded twice, keeping the last one"
                    );
                }
            }
            Err(error) => {
                warn!(path = %file.data_path.display(), %error, "failed to load input file");
                outcome.failures.push((file.data_path.clone(), error));
            }
        }
    }

    info!(
        files = files.len(),
        tables = outcome.database.len(),
        records = outcome.database.total_records(),
        duration_ms = start.elapsed().as_millis(),
        "input load complete"
    );
    outcome
}
