use std::fmt;
use std::fs::FileType;

/// Type of a filesystem entry.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Block or character device.
    Device,
    /// FIFO, socket, or anything else.
    Special,
}

impl EntryKind {
    /// Classifies a [`FileType`] as reported by `symlink_metadata`.
    #[must_use]
    pub fn from_file_type(file_type: FileType) -> Self {
        if file_type.is_file() {
            return Self::File;
        }
        if file_type.is_dir() {
            return Self::Directory;
        }
        if file_type.is_symlink() {
            return Self::Symlink;
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            if file_type.is_block_device() || file_type.is_char_device() {
                return Self::Device;
            }
        }
        Self::Special
    }

    /// Returns `true` for [`EntryKind::Directory`].
    #[must_use]
    pub const fn is_dir(self) -> bool {
        matches!(self, Self::Directory)
    }

    /// Returns `true` for [`EntryKind::File`].
    #[must_use]
    pub const fn is_file(self) -> bool {
        matches!(self, Self::File)
    }

    /// Single-byte code used when sizing serialized file lists.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::File => b'f',
            Self::Directory => b'd',
            Self::Symlink => b'L',
            Self::Device => b'D',
            Self::Special => b'S',
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::Device => "device",
            Self::Special => "special",
        })
    }
}
