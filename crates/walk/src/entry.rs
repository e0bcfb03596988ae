use std::fs::Metadata;
use std::path::{Path, PathBuf};

use crate::EntryKind;

/// One entry produced by a [`Walker`](crate::Walker).
#[derive(Debug)]
pub struct WalkEntry {
    pub(crate) path: PathBuf,
    pub(crate) relative: PathBuf,
    pub(crate) metadata: Metadata,
    pub(crate) kind: EntryKind,
    pub(crate) depth: usize,
}

impl WalkEntry {
    /// Absolute location on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location below the walk root; empty for the root.
    #[must_use]
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    /// `symlink_metadata` of the entry.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// File type, classified without following links.
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Number of directories between the root and this entry.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// True for the walk root.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.depth == 0
    }
}
