#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `filters` turns ordered `--include`/`--exclude` rules into the per-path
//! yes/no predicate consulted while building file lists. Patterns honour
//! anchored matches (leading `/`), directory-only rules (trailing `/`), and
//! recursive wildcards.
//!
//! # Design
//!
//! - [`FilterRule`] captures the action and pattern text. It is cheap to build
//!   and can be parsed from the `+ PATTERN` / `- PATTERN` short form.
//! - [`FilterSet`] owns the compiled glob matchers for each rule. A rule that
//!   excludes a directory also excludes everything beneath it.
//! - [`FilterPredicate`] is the seam the file-list builder depends on. It is
//!   implemented by [`FilterSet`] and by any
//!   `Fn(&Path, EntryKind) -> FilterVerdict` closure.
//! - [`parse_pattern_lines`] and [`read_pattern_file`] load
//!   `--exclude-from`/`--include-from` files.
//! - [`PathList`] restricts a transfer to the paths named by `--files-from`
//!   and the directories leading to them.
//!
//! # Invariants
//!
//! - Rules are evaluated in definition order. The first matching rule wins;
//!   a path no rule matches is included.
//! - A leading `/` anchors a rule to the transfer root. Other patterns match
//!   at any depth by implicitly prefixing `**/`.
//! - `*` never crosses a `/`; `**` does.
//!
//! # Examples
//!
//! ```
//! use filters::{FilterRule, FilterSet};
//! use std::path::Path;
//!
//! let rules = [
//!     FilterRule::include("keep.tmp"),
//!     FilterRule::exclude("*.tmp"),
//!     FilterRule::exclude("target/"),
//! ];
//! let filters = FilterSet::from_rules(rules).expect("filters compile");
//!
//! assert!(filters.allows(Path::new("notes.txt"), false));
//! assert!(filters.allows(Path::new("keep.tmp"), false));
//! assert!(!filters.allows(Path::new("scratch.tmp"), false));
//! assert!(!filters.allows(Path::new("target/debug/app"), false));
//! ```

mod action;
mod compiled;
mod error;
mod path_list;
mod patterns;
mod predicate;
mod rule;
mod set;

pub use action::FilterAction;
pub use error::{FilterError, PatternFileError};
pub use path_list::PathList;
pub use patterns::{parse_pattern_lines, read_pattern_file};
pub use predicate::{FilterPredicate, FilterVerdict};
pub use rule::FilterRule;
pub use set::FilterSet;
pub use walk::EntryKind;
