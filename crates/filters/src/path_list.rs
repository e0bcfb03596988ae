use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use logging::{trace_filter, warn_entry};
use walk::EntryKind;

use crate::{FilterPredicate, FilterVerdict, PatternFileError};

/// Explicit set of paths to transfer, as read from `--files-from`.
///
/// A path is admitted when it is listed, when it is a directory leading to
/// a listed path, or when it lies below a listed directory.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PathList {
    listed: BTreeSet<PathBuf>,
    implied: BTreeSet<PathBuf>,
}

impl PathList {
    /// Parses one path per line. Blank lines and lines starting with `#` or
    /// `;` are skipped. Leading `/` and `./` are dropped, so every path is
    /// taken relative to the source root; lines with `..` are ignored.
    ///
    /// ```
    /// use filters::{EntryKind, FilterPredicate, PathList};
    /// use std::path::Path;
    ///
    /// let list = PathList::parse("# wanted\ndocs/readme.md\n/bin/\n");
    /// assert!(list.decide(Path::new("docs"), EntryKind::Directory).is_included());
    /// assert!(list.decide(Path::new("docs/readme.md"), EntryKind::File).is_included());
    /// assert!(list.decide(Path::new("bin/tool"), EntryKind::File).is_included());
    /// assert!(!list.decide(Path::new("docs/other.md"), EntryKind::File).is_included());
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut list = Self::default();
        for line in text.lines() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.trim().is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            match normalise(line) {
                Some(path) => list.insert(path),
                None => warn_entry!("ignoring files-from entry '{}'", line),
            }
        }
        list
    }

    /// Reads and parses a list file with [`PathList::parse`].
    pub fn read(path: &Path) -> Result<Self, PatternFileError> {
        let bytes = fs::read(path).map_err(|error| PatternFileError::new(path.to_path_buf(), error))?;
        let list = Self::parse(&String::from_utf8_lossy(&bytes));
        trace_filter!("loaded {} paths from {}", list.len(), path.display());
        Ok(list)
    }

    fn insert(&mut self, path: PathBuf) {
        let mut parent = path.parent();
        while let Some(dir) = parent.filter(|dir| !dir.as_os_str().is_empty()) {
            self.implied.insert(dir.to_path_buf());
            parent = dir.parent();
        }
        self.listed.insert(path);
    }

    /// Number of listed paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listed.len()
    }

    /// Returns `true` when nothing is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listed.is_empty()
    }

    /// Returns `true` when `relative` takes part in the transfer.
    #[must_use]
    pub fn admits(&self, relative: &Path, is_dir: bool) -> bool {
        if self.listed.contains(relative) || (is_dir && self.implied.contains(relative)) {
            return true;
        }
        relative
            .ancestors()
            .skip(1)
            .any(|ancestor| self.listed.contains(ancestor))
    }
}

impl FilterPredicate for PathList {
    fn decide(&self, relative: &Path, kind: EntryKind) -> FilterVerdict {
        self.admits(relative, kind.is_dir()).into()
    }
}

fn normalise(line: &str) -> Option<PathBuf> {
    let mut path = PathBuf::new();
    for component in Path::new(line).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => return None,
        }
    }
    (!path.as_os_str().is_empty()).then_some(path)
}
