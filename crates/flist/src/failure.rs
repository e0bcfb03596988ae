use std::io;
use std::path::{Path, PathBuf};

use walk::{EntryKind, WalkError};

/// An entry below a root that could not be enumerated.
///
/// The rest of the tree is still listed; the caller decides how to report
/// the gap.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanFailure {
    path: PathBuf,
    full_path: PathBuf,
    action: &'static str,
    entry_kind: Option<EntryKind>,
    kind: io::ErrorKind,
    message: String,
}

impl ScanFailure {
    pub(crate) fn from_walk(root: &Path, error: &WalkError) -> Self {
        let full_path = error.path().unwrap_or(root).to_path_buf();
        let path = full_path
            .strip_prefix(root)
            .map_or_else(|_| full_path.clone(), Path::to_path_buf);
        let (action, entry_kind) = match error {
            WalkError::ReadDir { .. } => ("read directory", Some(EntryKind::Directory)),
            _ => ("stat", None),
        };
        let message = match error {
            WalkError::Root { source, .. }
            | WalkError::ReadDir { source, .. }
            | WalkError::Stat { source, .. }
            | WalkError::CurrentDir { source } => source.to_string(),
        };
        Self {
            path,
            full_path,
            action,
            entry_kind,
            kind: error.io_kind(),
            message,
        }
    }

    pub(crate) fn read_link(path: PathBuf, full_path: PathBuf, source: &io::Error) -> Self {
        Self {
            path,
            full_path,
            action: "read link",
            entry_kind: Some(EntryKind::Symlink),
            kind: source.kind(),
            message: source.to_string(),
        }
    }

    /// Path relative to the root that was walked.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute path of the failing entry.
    #[must_use]
    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    /// What was being attempted, e.g. `"read directory"`.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        self.action
    }

    /// Kind of the entry, when it was learned before the failure.
    #[must_use]
    pub const fn entry_kind(&self) -> Option<EntryKind> {
        self.entry_kind
    }

    /// Kind of the OS error.
    #[must_use]
    pub const fn kind(&self) -> io::ErrorKind {
        self.kind
    }

    /// Rebuilds the OS error for reporting.
    #[must_use]
    pub fn to_io_error(&self) -> io::Error {
        io::Error::new(self.kind, self.message.clone())
    }

    /// Returns `true` when `path` is the failing entry or lies beneath it.
    #[must_use]
    pub fn covers(&self, path: &Path) -> bool {
        path.starts_with(&self.path)
    }
}
