//! Terminal progress bars for the load and write stages.
//!
//! Bars draw to stderr and are hidden when stderr is not a terminal.

use std::collections::HashMap;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Mutex;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use pasta_ingest::{IngestError, InputFile, LoadProgress};

const BYTES_TEMPLATE: &str =
    "{msg:>20} [{bar:30.cyan/blue}] {bytes:>10}/{total_bytes:<10} {elapsed}";
const ROWS_TEMPLATE: &str = "{msg:>20} [{bar:30.green/white}] {pos:>8}/{len:<8} rows";
const PROGRESS_CHARS: &str = "=> ";

fn draw_target() -> ProgressDrawTarget {
    if io::stderr().is_terminal() {
        ProgressDrawTarget::stderr()
    } else {
        ProgressDrawTarget::hidden()
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .map(|style| style.progress_chars(PROGRESS_CHARS))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// One byte-based bar per input file, stacked while the files load in parallel.
pub struct LoadBars {
    multi: MultiProgress,
    bars: Mutex<HashMap<PathBuf, ProgressBar>>,
}

impl LoadBars {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(draw_target()),
            bars: Mutex::default(),
        }
    }
}

impl Default for LoadBars {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadProgress for LoadBars {
    type Tracker = Box<dyn FnMut(u64)>;

    fn start(&self, file: &InputFile) -> Self::Tracker {
        let bar = self.multi.add(ProgressBar::new(file.size_bytes));
        bar.set_style(style(BYTES_TEMPLATE));
        bar.set_message(file.name_prefix.clone());
        if let Ok(mut bars) = self.bars.lock() {
            bars.insert(file.data_path.clone(), bar.clone());
        }
        Box::new(move |position| bar.set_position(position))
    }

    fn finish(&self, file: &InputFile, outcome: Result<usize, &IngestError>) {
        let bar = self
            .bars
            .lock()
            .ok()
            .and_then(|mut bars| bars.remove(&file.data_path));
        let Some(bar) = bar else {
            return;
        };
        match outcome {
            Ok(records) => {
                bar.finish_with_message(format!("{} ({records} records)", file.name_prefix));
            }
            Err(_) => bar.abandon_with_message(format!("{} (failed)", file.name_prefix)),
        }
    }
}

/// Row-based bar for writing one CSV file.
pub fn row_bar(name: &str, rows: usize) -> ProgressBar {
    let bar = ProgressBar::with_draw_target(Some(rows as u64), draw_target());
    bar.set_style(style(ROWS_TEMPLATE));
    bar.set_message(name.to_string());
    bar
}
