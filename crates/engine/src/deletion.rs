//! Removal of destination-only entries.
//!
//! Deletions are applied children first. The entry list is path-ordered, so
//! a directory always precedes its descendants; running a batch in reverse
//! empties each directory before the directory itself is removed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flist::{EntryKind, FileEntry};
use logging::trace_del;

use crate::error::SyncError;

/// One destination entry scheduled for removal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Deletion {
    pub(crate) relative: PathBuf,
    pub(crate) full_path: PathBuf,
    pub(crate) kind: EntryKind,
}

impl From<&FileEntry> for Deletion {
    fn from(entry: &FileEntry) -> Self {
        Self {
            relative: entry.path().to_path_buf(),
            full_path: entry.full_path().to_path_buf(),
            kind: entry.kind(),
        }
    }
}

/// Returns the deletions in the order they must run: descendants before
/// their directories.
pub(crate) fn children_first(mut batch: Vec<Deletion>) -> Vec<Deletion> {
    batch.sort_by(|left, right| right.relative.cmp(&left.relative));
    batch
}

/// Removes one entry. A missing entry counts as removed, as does one whose
/// parent has since been replaced by a non-directory.
pub(crate) fn remove_entry(deletion: &Deletion, dry_run: bool) -> Result<(), SyncError> {
    trace_del!("deleting {}", deletion.relative.display());
    if dry_run {
        return Ok(());
    }

    let result = if deletion.kind.is_dir() {
        fs::remove_dir(&deletion.full_path)
    } else {
        fs::remove_file(&deletion.full_path)
    };
    match result {
        Ok(()) => Ok(()),
        Err(error)
            if matches!(
                error.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
            ) =>
        {
            Ok(())
        }
        Err(error) => Err(SyncError::io("delete", &deletion.full_path, error)),
    }
}

/// Clears whatever occupies `path` so an entry of a different type can be
/// created there.
pub(crate) fn remove_existing_destination(path: &Path, kind: EntryKind) -> Result<(), SyncError> {
    let result = if kind.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(SyncError::io("remove existing destination", path, error)),
    }
}
