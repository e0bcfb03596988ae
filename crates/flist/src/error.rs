use std::io;
use std::path::PathBuf;
use thiserror::Error;
use walk::WalkError;

/// Error raised while building a [`FileList`](crate::FileList).
#[derive(Debug, Error)]
pub enum FileListError {
    /// Traversal failed.
    #[error(transparent)]
    Walk(#[from] WalkError),
    /// A symbolic link's target could not be read.
    #[error("failed to read link '{}': {source}", path.display())]
    ReadLink {
        /// The link.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
}

impl FileListError {
    /// Returns `true` when the root itself could not be inspected.
    #[must_use]
    pub fn is_root_failure(&self) -> bool {
        matches!(self, Self::Walk(error) if error.is_root_failure())
    }
}
