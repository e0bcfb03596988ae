use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walk::EntryKind;

/// Immutable snapshot of one filesystem entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileEntry {
    path: PathBuf,
    full_path: PathBuf,
    size: u64,
    mtime: SystemTime,
    kind: EntryKind,
    link_target: Option<PathBuf>,
    checksum: Option<Vec<u8>>,
}

impl FileEntry {
    /// Creates an entry from its parts.
    ///
    /// `path` is relative to the tree root, `full_path` locates the entry on
    /// disk.
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        full_path: impl Into<PathBuf>,
        size: u64,
        mtime: SystemTime,
        kind: EntryKind,
    ) -> Self {
        Self {
            path: path.into(),
            full_path: full_path.into(),
            size,
            mtime,
            kind,
            link_target: None,
            checksum: None,
        }
    }

    /// Builds an entry from `symlink_metadata` output, reading the link
    /// target for symlinks.
    pub(crate) fn from_metadata(
        path: PathBuf,
        full_path: PathBuf,
        metadata: &fs::Metadata,
    ) -> std::io::Result<Self> {
        let kind = EntryKind::from_file_type(metadata.file_type());
        let mtime = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let size = if kind.is_file() { metadata.len() } else { 0 };
        let link_target = if kind == EntryKind::Symlink {
            Some(fs::read_link(&full_path)?)
        } else {
            None
        };
        Ok(Self {
            path,
            full_path,
            size,
            mtime,
            kind,
            link_target,
            checksum: None,
        })
    }

    /// Returns a copy carrying a symlink target.
    #[must_use]
    pub fn with_link_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.link_target = Some(target.into());
        self
    }

    /// Returns a copy carrying a precomputed content checksum.
    #[must_use]
    pub fn with_checksum(mut self, checksum: Vec<u8>) -> Self {
        self.checksum = Some(checksum);
        self
    }

    /// Path relative to the tree root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of the entry on disk.
    #[must_use]
    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    /// Size in bytes. Zero for anything but regular files.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Modification time.
    #[must_use]
    pub const fn mtime(&self) -> SystemTime {
        self.mtime
    }

    /// Entry type.
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Target of a symbolic link.
    #[must_use]
    pub fn link_target(&self) -> Option<&Path> {
        self.link_target.as_deref()
    }

    /// Whole-file digest, present only on lists built with
    /// [`FileList::with_checksums`](crate::FileList::with_checksums).
    #[must_use]
    pub fn checksum(&self) -> Option<&[u8]> {
        self.checksum.as_deref()
    }

    /// Bytes this entry occupies in a serialized file list: the path, a
    /// terminator, 8-byte size and mtime fields, and a one-byte type code.
    #[must_use]
    pub fn serialized_len(&self) -> u64 {
        self.path.as_os_str().len() as u64 + 1 + 8 + 8 + 1
    }
}
