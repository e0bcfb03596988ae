use std::cmp::Ordering;
use std::path::Path;

use crate::FileEntry;

/// A source entry and/or a destination entry sharing one relative path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EntryPair {
    /// Present on both sides.
    Both {
        /// Source side.
        source: FileEntry,
        /// Destination side.
        destination: FileEntry,
    },
    /// Present only in the source; will be created.
    SourceOnly(FileEntry),
    /// Present only in the destination; a deletion candidate.
    DestinationOnly(FileEntry),
}

impl EntryPair {
    /// Relative path shared by both sides.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Both { source, .. } | Self::SourceOnly(source) => source.path(),
            Self::DestinationOnly(destination) => destination.path(),
        }
    }

    /// Source side, if present.
    #[must_use]
    pub const fn source(&self) -> Option<&FileEntry> {
        match self {
            Self::Both { source, .. } | Self::SourceOnly(source) => Some(source),
            Self::DestinationOnly(_) => None,
        }
    }

    /// Destination side, if present.
    #[must_use]
    pub const fn destination(&self) -> Option<&FileEntry> {
        match self {
            Self::Both { destination, .. } | Self::DestinationOnly(destination) => {
                Some(destination)
            }
            Self::SourceOnly(_) => None,
        }
    }
}

/// Merges two path-sorted entry sequences into pairs, preserving path order.
#[must_use]
pub fn pair_entries(source: Vec<FileEntry>, destination: Vec<FileEntry>) -> Vec<EntryPair> {
    let mut pairs = Vec::with_capacity(source.len().max(destination.len()));
    let mut source = source.into_iter().peekable();
    let mut destination = destination.into_iter().peekable();

    loop {
        let order = match (source.peek(), destination.peek()) {
            (Some(s), Some(d)) => s.path().cmp(d.path()),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => break,
        };
        let pair = match order {
            Ordering::Less => source.next().map(EntryPair::SourceOnly),
            Ordering::Greater => destination.next().map(EntryPair::DestinationOnly),
            Ordering::Equal => source
                .next()
                .zip(destination.next())
                .map(|(source, destination)| EntryPair::Both {
                    source,
                    destination,
                }),
        };
        pairs.extend(pair);
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    use walk::EntryKind;

    fn file(path: &str) -> FileEntry {
        FileEntry::new(path, path, 1, SystemTime::UNIX_EPOCH, EntryKind::File)
    }

    #[test]
    fn merges_by_path() {
        let pairs = pair_entries(
            vec![file("a"), file("b"), file("d")],
            vec![file("b"), file("c"), file("d/x")],
        );
        let shapes: Vec<_> = pairs
            .iter()
            .map(|pair| {
                let shape = match pair {
                    EntryPair::Both { .. } => "both",
                    EntryPair::SourceOnly(_) => "source",
                    EntryPair::DestinationOnly(_) => "destination",
                };
                (pair.path().to_str().expect("utf8"), shape)
            })
            .collect();
        assert_eq!(
            shapes,
            [
                ("a", "source"),
                ("b", "both"),
                ("c", "destination"),
                ("d", "source"),
                ("d/x", "destination"),
            ]
        );
    }

    #[test]
    fn accessors_follow_shape() {
        let pair = EntryPair::DestinationOnly(file("gone"));
        assert!(pair.source().is_none());
        assert_eq!(pair.destination().map(FileEntry::path), Some(Path::new("gone")));
    }

    #[test]
    fn empty_inputs_produce_no_pairs() {
        assert!(pair_entries(Vec::new(), Vec::new()).is_empty());
    }
}
