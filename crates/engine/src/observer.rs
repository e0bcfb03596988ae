use std::path::{Path, PathBuf};

use crate::change::ChangeRecord;
use crate::error::SyncError;

/// Receives run events in entry order on the thread that called
/// [`SyncSession::run`](crate::SyncSession::run).
pub trait SyncObserver {
    /// Called once per entry with its change record, deletions included.
    fn on_itemize(&mut self, record: &ChangeRecord) {
        let _ = record;
    }

    /// Called after a destination entry has been deleted (or, in a dry run,
    /// would have been).
    fn on_delete(&mut self, path: &Path) {
        let _ = path;
    }

    /// Called for every entry that failed with a recoverable error.
    fn on_entry_error(&mut self, path: &Path, error: &SyncError) {
        let _ = (path, error);
    }
}

/// Observer that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl SyncObserver for NullObserver {}

/// Observer that keeps every event, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    /// Change records in the order they were reported.
    pub records: Vec<ChangeRecord>,
    /// Deleted paths in deletion order.
    pub deletions: Vec<PathBuf>,
    /// Failed entries with their rendered error.
    pub errors: Vec<(PathBuf, String)>,
}

impl CollectingObserver {
    /// Creates an empty observer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Itemize lines in report order.
    #[must_use]
    pub fn itemized_lines(&self) -> Vec<String> {
        self.records
            .iter()
            .map(crate::change::itemize::render)
            .collect()
    }
}

impl SyncObserver for CollectingObserver {
    fn on_itemize(&mut self, record: &ChangeRecord) {
        self.records.push(record.clone());
    }

    fn on_delete(&mut self, path: &Path) {
        self.deletions.push(path.to_path_buf());
    }

    fn on_entry_error(&mut self, path: &Path, error: &SyncError) {
        self.errors.push((path.to_path_buf(), error.to_string()));
    }
}
