use std::path::Path;

use walk::EntryKind;

use crate::FilterSet;

/// Outcome of consulting a [`FilterPredicate`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FilterVerdict {
    /// The entry takes part in the transfer.
    Include,
    /// The entry, and for directories everything below it, is skipped.
    Exclude,
}

impl FilterVerdict {
    /// Returns `true` for [`FilterVerdict::Include`].
    #[must_use]
    pub const fn is_included(self) -> bool {
        matches!(self, Self::Include)
    }
}

impl From<bool> for FilterVerdict {
    fn from(included: bool) -> Self {
        if included { Self::Include } else { Self::Exclude }
    }
}

/// Per-path include/exclude decision consulted while building file lists.
pub trait FilterPredicate {
    /// Decides whether `relative` (a path below the transfer root) is
    /// transferred.
    fn decide(&self, relative: &Path, kind: EntryKind) -> FilterVerdict;
}

impl FilterPredicate for FilterSet {
    fn decide(&self, relative: &Path, kind: EntryKind) -> FilterVerdict {
        self.allows(relative, kind.is_dir()).into()
    }
}

impl<F> FilterPredicate for F
where
    F: Fn(&Path, EntryKind) -> FilterVerdict,
{
    fn decide(&self, relative: &Path, kind: EntryKind) -> FilterVerdict {
        self(relative, kind)
    }
}
