//! Per-entry change records.
//!
//! A [`ChangeRecord`] is produced once for every entry the run looks at and
//! never mutated afterwards. [`itemize`] turns it into the fixed-width change
//! code printed by `--itemize-changes`.

pub mod itemize;

use std::path::{Path, PathBuf};

use flist::EntryKind;

/// What happened to an entry (itemize position 0).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UpdateKind {
    /// `<` - content sent to a remote receiver.
    Sent,
    /// `>` - content received into the destination.
    Received,
    /// `c` - local creation or change without a content transfer.
    LocalChange,
    /// `.` - nothing was updated.
    Unchanged,
    /// `*` - an informational message such as a deletion.
    Message,
}

impl UpdateKind {
    /// Glyph printed in position 0.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Sent => '<',
            Self::Received => '>',
            Self::LocalChange => 'c',
            Self::Unchanged => '.',
            Self::Message => '*',
        }
    }
}

/// Attribute differences observed between source and destination.
///
/// Permissions, owner and group are never compared; their flags stay clear.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AttributeChanges {
    checksum: bool,
    size: bool,
    time: bool,
    perms: bool,
    owner: bool,
    group: bool,
}

impl AttributeChanges {
    /// No differences.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            checksum: false,
            size: false,
            time: false,
            perms: false,
            owner: false,
            group: false,
        }
    }

    /// Sets the checksum flag.
    #[must_use]
    pub const fn with_checksum(mut self, changed: bool) -> Self {
        self.checksum = changed;
        self
    }

    /// Sets the size flag.
    #[must_use]
    pub const fn with_size(mut self, changed: bool) -> Self {
        self.size = changed;
        self
    }

    /// Sets the modification-time flag.
    #[must_use]
    pub const fn with_time(mut self, changed: bool) -> Self {
        self.time = changed;
        self
    }

    /// Content checksum differs.
    #[must_use]
    pub const fn checksum(self) -> bool {
        self.checksum
    }

    /// Size differs.
    #[must_use]
    pub const fn size(self) -> bool {
        self.size
    }

    /// Modification time differs.
    #[must_use]
    pub const fn time(self) -> bool {
        self.time
    }

    /// Permissions differ.
    #[must_use]
    pub const fn perms(self) -> bool {
        self.perms
    }

    /// Owner differs.
    #[must_use]
    pub const fn owner(self) -> bool {
        self.owner
    }

    /// Group differs.
    #[must_use]
    pub const fn group(self) -> bool {
        self.group
    }

    /// Returns `true` when no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        !(self.checksum || self.size || self.time || self.perms || self.owner || self.group)
    }
}

/// Classification of one entry's outcome.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChangeRecord {
    path: PathBuf,
    update: UpdateKind,
    kind: EntryKind,
    changes: AttributeChanges,
    created: bool,
}

impl ChangeRecord {
    /// An entry that did not exist on the destination.
    #[must_use]
    pub fn created(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            update: content_update(kind),
            kind,
            changes: AttributeChanges::none(),
            created: true,
        }
    }

    /// An existing entry whose content or target was replaced.
    #[must_use]
    pub fn updated(path: impl Into<PathBuf>, kind: EntryKind, changes: AttributeChanges) -> Self {
        Self {
            path: path.into(),
            update: content_update(kind),
            kind,
            changes,
            created: false,
        }
    }

    /// An entry left as it was. `changes` may still carry a time difference
    /// for directories, whose times are restored at the end of the run.
    #[must_use]
    pub fn unchanged(path: impl Into<PathBuf>, kind: EntryKind, changes: AttributeChanges) -> Self {
        Self {
            path: path.into(),
            update: UpdateKind::Unchanged,
            kind,
            changes,
            created: false,
        }
    }

    /// A destination entry removed because the source no longer has it.
    #[must_use]
    pub fn deleted(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            update: UpdateKind::Message,
            kind,
            changes: AttributeChanges::none(),
            created: false,
        }
    }

    /// Relative path of the entry.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Update kind.
    #[must_use]
    pub const fn update(&self) -> UpdateKind {
        self.update
    }

    /// Entry type.
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Attribute differences.
    #[must_use]
    pub const fn changes(&self) -> AttributeChanges {
        self.changes
    }

    /// Returns `true` for newly created entries.
    #[must_use]
    pub const fn is_created(&self) -> bool {
        self.created
    }

    /// Returns `true` for deletion messages.
    #[must_use]
    pub const fn is_deletion(&self) -> bool {
        matches!(self.update, UpdateKind::Message)
    }

    /// Fixed-width change code, see [`itemize::classify`].
    #[must_use]
    pub fn code(&self) -> String {
        itemize::classify(self)
    }
}

const fn content_update(kind: EntryKind) -> UpdateKind {
    match kind {
        EntryKind::File => UpdateKind::Received,
        _ => UpdateKind::LocalChange,
    }
}
