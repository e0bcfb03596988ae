use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure while walking a tree.
#[derive(Debug, Error)]
pub enum WalkError {
    /// The root could not be inspected.
    #[error("cannot stat root {}: {source}", path.display())]
    Root {
        /// Root as given, made absolute.
        path: PathBuf,
        /// OS error.
        source: io::Error,
    },
    /// A directory could not be listed.
    #[error("cannot read directory {}: {source}", path.display())]
    ReadDir {
        /// The directory.
        path: PathBuf,
        /// OS error.
        source: io::Error,
    },
    /// An entry vanished or became unreadable between listing and stat.
    #[error("cannot stat {}: {source}", path.display())]
    Stat {
        /// The entry.
        path: PathBuf,
        /// OS error.
        source: io::Error,
    },
    /// A relative root needs the working directory.
    #[error("cannot resolve working directory: {source}")]
    CurrentDir {
        /// OS error.
        source: io::Error,
    },
}

impl WalkError {
    /// Path the failure concerns, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Root { path, .. } | Self::ReadDir { path, .. } | Self::Stat { path, .. } => {
                Some(path)
            }
            Self::CurrentDir { .. } => None,
        }
    }

    /// True when nothing below the root was reached.
    #[must_use]
    pub const fn is_root_failure(&self) -> bool {
        matches!(self, Self::Root { .. } | Self::CurrentDir { .. })
    }

    /// Kind of the underlying OS error.
    #[must_use]
    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            Self::Root { source, .. }
            | Self::ReadDir { source, .. }
            | Self::Stat { source, .. }
            | Self::CurrentDir { source } => source.kind(),
        }
    }
}
