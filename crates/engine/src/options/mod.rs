//! Run policy consumed by [`SyncSession`](crate::SyncSession).
//!
//! Options are immutable once built. Use [`SyncOptions::builder`] to assemble
//! them; the builder rejects contradictory or out-of-range settings before
//! any filesystem work begins.

mod builder;

use std::fmt;
use std::num::{NonZeroU32, NonZeroU64, NonZeroUsize};
use std::str::FromStr;
use std::time::Duration;

use checksums::ChecksumChoice;
use thiserror::Error;

pub use builder::{BuilderError, MAX_BLOCK_SIZE, SyncOptionsBuilder};

/// Controls when deletion sweeps run relative to content transfers.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DeleteTiming {
    /// Remove extraneous entries before copying new content.
    Before,
    /// Remove extraneous entries as the ordered entry list reaches them.
    During,
    /// Remove extraneous entries after every transfer has finished.
    #[default]
    After,
}

impl DeleteTiming {
    /// Name used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::During => "during",
            Self::After => "after",
        }
    }
}

impl fmt::Display for DeleteTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compression codec requested for the transport.
///
/// The engine never compresses anything itself; the choice is validated and
/// carried through so an external transport can honour it.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum CompressChoice {
    /// No compression.
    #[default]
    None,
    /// zlib deflate.
    Zlib,
    /// Zstandard.
    Zstd,
    /// LZ4.
    Lz4,
    /// Let the transport negotiate.
    Auto,
}

impl CompressChoice {
    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Zlib => "zlib",
            Self::Zstd => "zstd",
            Self::Lz4 => "lz4",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for CompressChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a compression name is not recognised.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unknown compression choice '{name}' (expected none, zlib, zstd, lz4 or auto)")]
pub struct CompressChoiceError {
    name: String,
}

impl CompressChoiceError {
    /// The rejected name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for CompressChoice {
    type Err = CompressChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "zlib" => Ok(Self::Zlib),
            "zstd" => Ok(Self::Zstd),
            "lz4" => Ok(Self::Lz4),
            "auto" => Ok(Self::Auto),
            _ => Err(CompressChoiceError { name: s.to_owned() }),
        }
    }
}

/// Validated policy for one synchronisation run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyncOptions {
    pub(crate) checksum: bool,
    pub(crate) size_only: bool,
    pub(crate) update: bool,
    pub(crate) whole_file: bool,
    pub(crate) ignore_times: bool,
    pub(crate) modify_window: Duration,
    pub(crate) delete: Option<DeleteTiming>,
    pub(crate) dry_run: bool,
    pub(crate) in_place: bool,
    pub(crate) checksum_choice: ChecksumChoice,
    pub(crate) compress_choice: CompressChoice,
    pub(crate) block_size: Option<NonZeroU32>,
    pub(crate) bandwidth_limit: Option<NonZeroU64>,
    pub(crate) workers: NonZeroUsize,
    pub(crate) itemize: bool,
    pub(crate) stats: bool,
}

impl SyncOptions {
    /// Starts a builder populated with defaults.
    #[must_use]
    pub fn builder() -> SyncOptionsBuilder {
        SyncOptionsBuilder::new()
    }

    /// Compare whole-file checksums instead of size and time.
    #[must_use]
    pub const fn checksum(&self) -> bool {
        self.checksum
    }

    /// Compare size alone.
    #[must_use]
    pub const fn size_only(&self) -> bool {
        self.size_only
    }

    /// Skip entries whose destination is strictly newer.
    #[must_use]
    pub const fn update(&self) -> bool {
        self.update
    }

    /// Never attempt delta matching.
    #[must_use]
    pub const fn whole_file(&self) -> bool {
        self.whole_file
    }

    /// Transfer even when size and time match.
    #[must_use]
    pub const fn ignore_times(&self) -> bool {
        self.ignore_times
    }

    /// Tolerance applied when comparing modification times.
    #[must_use]
    pub const fn modify_window(&self) -> Duration {
        self.modify_window
    }

    /// Deletion timing, or `None` when extraneous entries are kept.
    #[must_use]
    pub const fn delete(&self) -> Option<DeleteTiming> {
        self.delete
    }

    /// Report decisions without touching the destination.
    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Overwrite destination files directly instead of staging.
    #[must_use]
    pub const fn in_place(&self) -> bool {
        self.in_place
    }

    /// Strong checksum used for block signatures and whole-file digests.
    #[must_use]
    pub const fn checksum_choice(&self) -> ChecksumChoice {
        self.checksum_choice
    }

    /// Compression requested for an external transport.
    #[must_use]
    pub const fn compress_choice(&self) -> CompressChoice {
        self.compress_choice
    }

    /// Forced block length, if any.
    #[must_use]
    pub const fn block_size(&self) -> Option<NonZeroU32> {
        self.block_size
    }

    /// Transfer-rate ceiling in bytes per second.
    #[must_use]
    pub const fn bandwidth_limit(&self) -> Option<NonZeroU64> {
        self.bandwidth_limit
    }

    /// Number of transfer workers.
    #[must_use]
    pub const fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    /// Emit per-entry change records.
    #[must_use]
    pub const fn itemize(&self) -> bool {
        self.itemize
    }

    /// Emit the statistics summary.
    #[must_use]
    pub const fn stats(&self) -> bool {
        self.stats
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptionsBuilder::new().into_options()
    }
}
