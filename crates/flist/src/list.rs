use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use checksums::ChecksumChoice;
use filters::FilterPredicate;
use logging::{trace_filter, trace_flist, warn_entry};
use walk::{WalkBuilder, WalkEntry};

use crate::{FileEntry, FileListError, ScanFailure};

/// Ordered snapshot of one tree.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FileList {
    entries: Vec<FileEntry>,
    failures: Vec<ScanFailure>,
}

impl FileList {
    /// Builds a list from arbitrary entries, sorting them by path. Later
    /// duplicates replace earlier ones.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = FileEntry>) -> Self {
        let map: BTreeMap<PathBuf, FileEntry> = entries
            .into_iter()
            .map(|entry| (entry.path().to_path_buf(), entry))
            .collect();
        Self {
            entries: map.into_values().collect(),
            failures: Vec::new(),
        }
    }

    /// Walks `root` and records every entry `filter` includes.
    ///
    /// Excluded directories are pruned with their whole subtree and never
    /// read. When `root` is not a directory the list holds a single entry
    /// named after it.
    ///
    /// Only a root that cannot be inspected is an error. Entries below it
    /// that cannot be read are recorded in [`FileList::failures`] and the
    /// walk goes on.
    pub fn from_root(root: &Path, filter: &dyn FilterPredicate) -> Result<Self, FileListError> {
        let mut walker = WalkBuilder::new(root).build()?;
        let mut entries = Vec::new();
        let mut failures = Vec::new();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) if error.is_root_failure() => return Err(error.into()),
                Err(error) => {
                    trace_flist!("unreadable: {}", error);
                    failures.push(ScanFailure::from_walk(walker.root(), &error));
                    continue;
                }
            };
            let kind = entry.kind();
            let relative = if entry.is_root() {
                if kind.is_dir() {
                    continue;
                }
                match entry.path().file_name() {
                    Some(name) => PathBuf::from(name),
                    None => continue,
                }
            } else {
                entry.relative().to_path_buf()
            };

            if !filter.decide(&relative, kind).is_included() {
                trace_filter!("excluding {} {}", kind, relative.display());
                walker.skip_current_dir();
                continue;
            }
            match snapshot(&entry, relative) {
                Ok(snapshot) => entries.push(snapshot),
                Err(FileListError::ReadLink { path, source }) if !entry.is_root() => {
                    trace_flist!("unreadable link {}: {}", path.display(), source);
                    failures.push(ScanFailure::read_link(
                        entry.relative().to_path_buf(),
                        path,
                        &source,
                    ));
                }
                Err(error) => return Err(error),
            }
        }

        trace_flist!(
            "{} entries under {}, {} unreadable",
            entries.len(),
            root.display(),
            failures.len()
        );
        Ok(Self { entries, failures })
    }

    /// Like [`FileList::from_root`], but a root that does not exist yields an
    /// empty list. Used for destinations that are about to be created.
    pub fn from_destination_root(
        root: &Path,
        filter: &dyn FilterPredicate,
    ) -> Result<Self, FileListError> {
        match Self::from_root(root, filter) {
            Err(FileListError::Walk(error))
                if error.is_root_failure() && error.io_kind() == io::ErrorKind::NotFound =>
            {
                trace_flist!("destination {} does not exist yet", root.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Merges lists built from several roots. Entries of later lists replace
    /// entries of earlier lists with the same relative path.
    #[must_use]
    pub fn overlay(lists: impl IntoIterator<Item = Self>) -> Self {
        let mut failures = Vec::new();
        let mut merged = Self::from_entries(lists.into_iter().flat_map(|list| {
            failures.extend(list.failures);
            list.entries
        }));
        merged.failures = failures;
        merged
    }

    /// Returns a new snapshot whose regular files carry whole-file digests.
    ///
    /// Files that cannot be read are logged and left without a digest, so
    /// they never compare equal.
    #[must_use]
    pub fn with_checksums(self, choice: ChecksumChoice) -> Self {
        let files: Vec<PathBuf> = self
            .entries
            .iter()
            .filter(|entry| entry.kind().is_file())
            .map(|entry| entry.full_path().to_path_buf())
            .collect();
        let mut digests = digest_all(choice, &files).into_iter();

        let entries = self
            .entries
            .into_iter()
            .map(|entry| {
                if !entry.kind().is_file() {
                    return entry;
                }
                match digests.next() {
                    Some(Ok(digest)) => entry.with_checksum(digest),
                    Some(Err(error)) => {
                        warn_entry!("cannot checksum {}: {}", entry.full_path().display(), error);
                        entry
                    }
                    None => entry,
                }
            })
            .collect();
        Self {
            entries,
            failures: self.failures,
        }
    }

    /// Entries in path order.
    #[must_use]
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Entries below the root that could not be read, in walk order.
    #[must_use]
    pub fn failures(&self) -> &[ScanFailure] {
        &self.failures
    }

    /// Consumes the list, returning the entries in path order.
    #[must_use]
    pub fn into_entries(self) -> Vec<FileEntry> {
        self.entries
    }

    /// Looks up an entry by relative path.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&FileEntry> {
        self.entries
            .binary_search_by(|entry| entry.path().cmp(path))
            .ok()
            .map(|index| &self.entries[index])
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Estimated size of the list on the wire.
    #[must_use]
    pub fn serialized_size(&self) -> u64 {
        self.entries.iter().map(FileEntry::serialized_len).sum()
    }
}

fn snapshot(entry: &WalkEntry, relative: PathBuf) -> Result<FileEntry, FileListError> {
    FileEntry::from_metadata(relative, entry.path().to_path_buf(), entry.metadata()).map_err(
        |source| FileListError::ReadLink {
            path: entry.path().to_path_buf(),
            source,
        },
    )
}

#[cfg(feature = "parallel")]
fn digest_all(choice: ChecksumChoice, paths: &[PathBuf]) -> Vec<io::Result<Vec<u8>>> {
    checksums::parallel::digest_files(choice, paths)
}

#[cfg(not(feature = "parallel"))]
fn digest_all(choice: ChecksumChoice, paths: &[PathBuf]) -> Vec<io::Result<Vec<u8>>> {
    paths
        .iter()
        .map(|path| checksums::digest_file(choice, path))
        .collect()
}
