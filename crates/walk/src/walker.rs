use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::vec;

use logging::{trace_flist, trace_io};

use crate::EntryKind;
use crate::entry::WalkEntry;
use crate::error::WalkError;

/// Depth-first iterator with name-sorted siblings.
///
/// A directory is listed only when the walk moves past its entry, so a
/// subtree pruned with [`Walker::skip_current_dir`] is never read. Errors
/// below the root are yielded in place and the walk carries on with the
/// next sibling.
#[derive(Debug)]
pub struct Walker {
    root: PathBuf,
    pending_root: Option<WalkEntry>,
    open: Vec<OpenDirectory>,
    /// Directory yielded last, listed on the next call unless skipped.
    unopened: Option<Unopened>,
}

#[derive(Debug)]
struct Unopened {
    path: PathBuf,
    relative: PathBuf,
    depth: usize,
}

#[derive(Debug)]
struct OpenDirectory {
    path: PathBuf,
    relative: PathBuf,
    depth: usize,
    names: vec::IntoIter<OsString>,
}

impl Walker {
    pub(crate) fn open(root: PathBuf, include_root: bool) -> Result<Self, WalkError> {
        let root = if root.is_absolute() {
            root
        } else {
            env::current_dir()
                .map_err(|source| WalkError::CurrentDir { source })?
                .join(root)
        };
        trace_flist!("walking {}", root.display());

        let metadata = fs::symlink_metadata(&root).map_err(|source| WalkError::Root {
            path: root.clone(),
            source,
        })?;
        let kind = EntryKind::from_file_type(metadata.file_type());

        let mut open = Vec::new();
        if kind.is_dir() {
            open.push(OpenDirectory::read(&root, PathBuf::new(), 0)?);
        }
        let pending_root = include_root.then(|| WalkEntry {
            path: root.clone(),
            relative: PathBuf::new(),
            metadata,
            kind,
            depth: 0,
        });

        Ok(Self {
            root,
            pending_root,
            open,
            unopened: None,
        })
    }

    /// Absolute path of the root being walked.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Skips the children of the directory yielded last.
    ///
    /// Has no effect when the last entry was not a directory.
    pub fn skip_current_dir(&mut self) {
        self.unopened = None;
    }

    fn visit(&mut self, parent: usize, name: &OsString) -> Result<WalkEntry, WalkError> {
        let directory = &self.open[parent];
        let path = directory.path.join(name);
        let relative = directory.relative.join(name);
        let depth = directory.depth + 1;
        trace_io!("stat {}", relative.display());

        let metadata = fs::symlink_metadata(&path).map_err(|source| WalkError::Stat {
            path: path.clone(),
            source,
        })?;
        let kind = EntryKind::from_file_type(metadata.file_type());
        if kind.is_dir() {
            self.unopened = Some(Unopened {
                path: path.clone(),
                relative: relative.clone(),
                depth,
            });
        }

        Ok(WalkEntry {
            path,
            relative,
            metadata,
            kind,
            depth,
        })
    }
}

impl Iterator for Walker {
    type Item = Result<WalkEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.pending_root.take() {
            return Some(Ok(root));
        }
        if let Some(Unopened {
            path,
            relative,
            depth,
        }) = self.unopened.take()
        {
            match OpenDirectory::read(&path, relative, depth) {
                Ok(directory) => self.open.push(directory),
                Err(error) => return Some(Err(error)),
            }
        }

        loop {
            let parent = self.open.len().checked_sub(1)?;
            let Some(name) = self.open[parent].names.next() else {
                self.open.pop();
                continue;
            };
            return Some(self.visit(parent, &name));
        }
    }
}

impl OpenDirectory {
    fn read(path: &Path, relative: PathBuf, depth: usize) -> Result<Self, WalkError> {
        let read_error = |source| WalkError::ReadDir {
            path: path.to_path_buf(),
            source,
        };
        let mut names = fs::read_dir(path)
            .map_err(read_error)?
            .map(|entry| entry.map(|entry| entry.file_name()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_error)?;
        names.sort();
        trace_io!("{} names in {}", names.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            relative,
            depth,
            names: names.into_iter(),
        })
    }
}
