use std::path::PathBuf;

use crate::error::WalkError;
use crate::walker::Walker;

/// Options for walking one source or destination root.
#[derive(Clone, Debug)]
pub struct WalkBuilder {
    root: PathBuf,
    include_root: bool,
}

impl WalkBuilder {
    /// Starts a walk at `root`. The root entry is emitted by default.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include_root: true,
        }
    }

    /// Whether the first item is the root itself.
    #[must_use]
    pub const fn include_root(mut self, include: bool) -> Self {
        self.include_root = include;
        self
    }

    /// Inspects the root and opens it when it is a directory.
    pub fn build(self) -> Result<Walker, WalkError> {
        Walker::open(self.root, self.include_root)
    }
}
