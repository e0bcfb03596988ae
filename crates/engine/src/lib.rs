#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `engine` synchronises a destination directory tree from one or more
//! source roots. It builds on the lower crates of the workspace:
//!
//! - `flist` enumerates both sides and pairs them by relative path;
//! - [`decide`] compares each pair and picks a [`Decision`];
//! - `signature` and `matching` turn a changed file into a delta script
//!   against its old destination copy;
//! - the writer applies the script to a staging file, verifies the whole-file
//!   digest and renames it over the destination.
//!
//! # Design
//!
//! - [`SyncOptions`] is validated once through [`SyncOptionsBuilder`] and is
//!   read-only afterwards.
//! - [`SyncSession::run`] decides every entry on the calling thread and hands
//!   regular files to a bounded worker pool. Results, including
//!   [`ChangeRecord`]s for itemized output, reach the [`SyncObserver`] in path
//!   order.
//! - [`StatsAggregator`] collects counters from all workers without locks and
//!   produces an immutable [`RunStats`] snapshot.
//! - Failures are [`SyncError`]s. Recoverable ones are counted and the run
//!   continues; fatal ones stop the run. [`SyncError::exit_code`] and
//!   [`RunSummary::exit_code`] map outcomes to process exit codes.
//!
//! # Invariants
//!
//! - A destination file is either left untouched or replaced by a file whose
//!   whole-file digest matches the source.
//! - A dry run reports the same change records and statistics as the real
//!   run would, and modifies nothing.
//! - Deletions remove descendants before their directories.
//!
//! # Examples
//!
//! ```
//! use engine::{AttributeChanges, ChangeRecord, EntryKind};
//! use engine::change::itemize::classify;
//!
//! let record = ChangeRecord::updated(
//!     "notes.txt",
//!     EntryKind::File,
//!     AttributeChanges::none().with_size(true).with_time(true),
//! );
//! assert_eq!(classify(&record), ">f.st......");
//! ```

pub mod change;
mod compare;
mod deletion;
mod error;
mod observer;
mod options;
mod pool;
mod session;
mod stats;
mod transfer;
mod writer;

pub use change::{AttributeChanges, ChangeRecord, UpdateKind};
pub use compare::{Decision, decide};
pub use error::{
    CANCELLED_EXIT_CODE, CONFIGURATION_EXIT_CODE, ErrorSeverity, FILE_IO_EXIT_CODE,
    PARTIAL_TRANSFER_EXIT_CODE, PROTOCOL_EXIT_CODE, SUCCESS_EXIT_CODE, SyncError, SyncErrorKind,
};
pub use flist::EntryKind;
pub use observer::{CollectingObserver, NullObserver, SyncObserver};
pub use options::{
    BuilderError, CompressChoice, CompressChoiceError, DeleteTiming, MAX_BLOCK_SIZE, SyncOptions,
    SyncOptionsBuilder,
};
pub use pool::CancellationToken;
pub use session::{RunSummary, SyncSession};
pub use stats::{RunStats, StatsAggregator};
pub use transfer::{DELTA_FILE_OVERHEAD, TOKEN_HEADER_LEN};
