#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` is the command-line front-end of dsync. It parses arguments with a
//! [`clap`](https://docs.rs/clap/) builder, turns them into
//! [`engine::SyncOptions`] and a filter set, runs one
//! [`engine::SyncSession`] and renders itemized changes and statistics.
//!
//! # Design
//!
//! [`run`] takes the argument iterator together with handles for standard
//! output and error, so the whole front-end can be driven from tests without
//! spawning a process. Itemize lines and the `--stats` block go to standard
//! output; diagnostics go to standard error, either as `dsync error:` lines
//! or through the `logging` crate's tracing subscriber.
//!
//! # Errors
//!
//! Usage errors exit with code `1`. Transfer outcomes map to the engine's
//! exit codes: `0` for success, `23` when some entries failed, and `11`, `12`
//! or `20` for fatal enumeration, corrupt delta or cancellation errors.
//!
//! # Examples
//!
//! ```
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let status = cli::run(["dsync", "--version"], &mut stdout, &mut stderr);
//!
//! assert_eq!(status, 0);
//! assert!(String::from_utf8_lossy(&stdout).starts_with("dsync "));
//! assert!(stderr.is_empty());
//! ```

mod frontend;

pub use frontend::stats_format;
pub use frontend::{exit_code_from, run};
