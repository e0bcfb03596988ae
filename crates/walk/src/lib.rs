#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `walk` provides the deterministic filesystem traversal dsync uses when
//! building file lists. The walker enumerates every entry beneath a root
//! without following symbolic links and yields siblings in lexicographic
//! order, so two walks over identical trees produce identical sequences
//! regardless of the order the operating system returns directory entries.
//!
//! # Design
//!
//! - [`WalkBuilder`] decides whether the root itself is emitted.
//! - [`Walker`] yields [`WalkEntry`] values depth first; a directory's
//!   contents come before its next sibling. Callers prune an excluded
//!   directory with [`Walker::skip_current_dir`].
//! - [`EntryKind`] classifies each entry once, from `symlink_metadata`.
//! - [`WalkError`] carries the failing path and the OS error.
//!
//! # Invariants
//!
//! - Relative paths never contain `..` segments and never escape the root.
//! - Symbolic links are reported as [`EntryKind::Symlink`] and never
//!   traversed, so cycles are impossible.
//! - Only a failure to inspect or list the root stops the walk. A directory
//!   or entry below it that cannot be read is yielded as an error and the
//!   walk resumes with the next sibling.
//! - A directory is listed after its entry has been yielded, never for a
//!   subtree the caller skipped.
//!
//! # Examples
//!
//! ```
//! use walk::WalkBuilder;
//! use std::fs;
//! use std::path::PathBuf;
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! let root = temp.path().join("src");
//! fs::create_dir_all(root.join("nested"))?;
//! fs::write(root.join("file.txt"), b"data")?;
//! fs::write(root.join("nested/more.txt"), b"data")?;
//!
//! let walker = WalkBuilder::new(&root).include_root(false).build()?;
//! let paths = walker
//!     .map(|entry| entry.map(|entry| entry.relative().to_path_buf()))
//!     .collect::<Result<Vec<_>, _>>()?;
//!
//! assert_eq!(
//!     paths,
//!     [
//!         PathBuf::from("file.txt"),
//!         PathBuf::from("nested"),
//!         PathBuf::from("nested/more.txt"),
//!     ]
//! );
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod builder;
mod entry;
mod error;
mod kind;
mod walker;

pub use builder::WalkBuilder;
pub use entry::WalkEntry;
pub use error::WalkError;
pub use kind::EntryKind;
pub use walker::Walker;
