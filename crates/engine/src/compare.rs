//! Per-pair transfer decisions.
//!
//! The comparator runs single-threaded over the ordered pair list. It only
//! looks at the snapshots taken during enumeration, so it never touches the
//! filesystem.

use std::time::{Duration, SystemTime};

use flist::{EntryKind, EntryPair, FileEntry};

use crate::options::SyncOptions;

/// Outcome of comparing one [`EntryPair`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    /// Destination already matches.
    Skip,
    /// Replace or create the destination from the full source content.
    TransferWhole,
    /// Update the destination by matching against its existing blocks.
    TransferDelta,
    /// Remove the destination-only entry.
    Delete,
}

impl Decision {
    /// Returns `true` for either transfer variant.
    #[must_use]
    pub const fn is_transfer(self) -> bool {
        matches!(self, Self::TransferWhole | Self::TransferDelta)
    }
}

/// Decides what to do with `pair` under `options`.
#[must_use]
pub fn decide(pair: &EntryPair, options: &SyncOptions) -> Decision {
    match pair {
        EntryPair::SourceOnly(_) => Decision::TransferWhole,
        EntryPair::DestinationOnly(_) => {
            if options.delete().is_some() {
                Decision::Delete
            } else {
                Decision::Skip
            }
        }
        EntryPair::Both {
            source,
            destination,
        } => decide_existing(source, destination, options),
    }
}

fn decide_existing(source: &FileEntry, destination: &FileEntry, options: &SyncOptions) -> Decision {
    if source.kind() != destination.kind() {
        return Decision::TransferWhole;
    }

    match source.kind() {
        EntryKind::Directory | EntryKind::Device | EntryKind::Special => Decision::Skip,
        EntryKind::Symlink => {
            if source.link_target() == destination.link_target() {
                Decision::Skip
            } else {
                Decision::TransferWhole
            }
        }
        EntryKind::File => {
            if should_skip_file(source, destination, options) {
                Decision::Skip
            } else if options.whole_file() {
                Decision::TransferWhole
            } else {
                Decision::TransferDelta
            }
        }
    }
}

/// Quick check, checksum and update rules for two regular files.
pub(crate) fn should_skip_file(
    source: &FileEntry,
    destination: &FileEntry,
    options: &SyncOptions,
) -> bool {
    if options.update() && destination.mtime() > source.mtime() {
        return true;
    }

    if options.checksum() {
        if source.size() != destination.size() {
            return false;
        }
        return matches!(
            (source.checksum(), destination.checksum()),
            (Some(left), Some(right)) if left == right
        );
    }

    if source.size() != destination.size() {
        return false;
    }

    if options.size_only() {
        return true;
    }

    if options.ignore_times() {
        return false;
    }

    system_time_within_window(source.mtime(), destination.mtime(), options.modify_window())
}

/// Returns `true` when `a` and `b` are no more than `window` apart. A zero
/// window requires exact equality.
pub(crate) fn system_time_within_window(a: SystemTime, b: SystemTime, window: Duration) -> bool {
    if window.is_zero() {
        return a.eq(&b);
    }

    match a.duration_since(b) {
        Ok(diff) => diff <= window,
        Err(_) => matches!(b.duration_since(a), Ok(diff) if diff <= window),
    }
}
