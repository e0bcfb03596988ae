#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` centralises how dsync emits diagnostics. Every subsystem logs
//! through a small set of target-scoped macros (`trace_copy!`, `trace_delta!`,
//! ...) so that a single verbosity level chosen on the command line decides
//! which categories reach stderr.
//!
//! # Design
//!
//! - [`VerbosityConfig`] maps the number of `-v` flags to a
//!   [`tracing_subscriber::EnvFilter`] directive.
//! - [`init_tracing`] installs a formatting subscriber writing to stderr. The
//!   `DSYNC_LOG` environment variable overrides the derived directive.
//! - The macros in this crate expand to `tracing` events with fixed targets
//!   under the `dsync::` prefix, which keeps filtering stable even when
//!   modules move between crates.
//!
//! Itemized change lines and the statistics block are program output and are
//! written by the CLI directly; they never pass through this crate.
//!
//! # Examples
//!
//! ```
//! use logging::{VerbosityConfig, trace_copy};
//!
//! let config = VerbosityConfig::from_verbose_level(1);
//! assert_eq!(config.directive(), "info");
//! trace_copy!("copied {}", "notes.txt");
//! ```

mod config;
mod tracing_bridge;
mod tracing_macros;

pub use config::VerbosityConfig;
pub use tracing_bridge::{LOG_ENV_VAR, build_filter, init_tracing};

#[doc(hidden)]
pub use tracing;
