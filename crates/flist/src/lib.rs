#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `flist` is the entry model of dsync. It snapshots a tree into an ordered
//! [`FileList`] of immutable [`FileEntry`] records and pairs a source list
//! with a destination list by relative path.
//!
//! # Design
//!
//! - [`FileList::from_root`] walks a root with [`walk::WalkBuilder`], consults
//!   a [`filters::FilterPredicate`] for every entry, and prunes the subtrees of
//!   excluded directories.
//! - Entries below a root that cannot be read do not abort the listing;
//!   they are collected as [`ScanFailure`] values next to the entries.
//! - [`FileList::overlay`] merges several source roots; later roots replace
//!   entries of earlier ones with the same relative path.
//! - [`FileList::with_checksums`] produces a new snapshot carrying whole-file
//!   digests for `--checksum` comparisons.
//! - [`pair_entries`] merges two sorted lists into [`EntryPair`] values.
//!
//! # Invariants
//!
//! - Entries are sorted by relative path (component-wise, which is also the
//!   depth-first walk order) and paths are unique within a list.
//! - Relative paths use `/` separators and never contain `..`.
//!
//! # Examples
//!
//! ```
//! use filters::FilterSet;
//! use flist::{EntryPair, FileList, pair_entries};
//! use std::fs;
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! let src = temp.path().join("src");
//! let dst = temp.path().join("dst");
//! fs::create_dir_all(&src)?;
//! fs::create_dir_all(&dst)?;
//! fs::write(src.join("new.txt"), b"hello")?;
//! fs::write(dst.join("old.txt"), b"bye")?;
//!
//! let filter = FilterSet::default();
//! let source = FileList::from_root(&src, &filter)?;
//! let destination = FileList::from_root(&dst, &filter)?;
//! let pairs = pair_entries(source.into_entries(), destination.into_entries());
//!
//! assert!(matches!(pairs[0], EntryPair::SourceOnly(_)));
//! assert!(matches!(pairs[1], EntryPair::DestinationOnly(_)));
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod entry;
mod error;
mod failure;
mod list;
mod pair;

pub use entry::FileEntry;
pub use error::FileListError;
pub use failure::ScanFailure;
pub use list::FileList;
pub use pair::{EntryPair, pair_entries};
pub use walk::EntryKind;
