//! Builder pattern for constructing [`SyncOptions`].
//!
//! # Example
//!
//! ```rust
//! use engine::{DeleteTiming, SyncOptions};
//!
//! let options = SyncOptions::builder()
//!     .delete(true)
//!     .delete_timing(DeleteTiming::Before)
//!     .itemize(true)
//!     .build()
//!     .expect("valid options");
//! assert_eq!(options.delete(), Some(DeleteTiming::Before));
//! ```

use std::num::{NonZeroU32, NonZeroU64, NonZeroUsize};
use std::thread;
use std::time::Duration;

use checksums::ChecksumChoice;

use super::{CompressChoice, DeleteTiming, SyncOptions};

/// Largest accepted `--block-size`.
pub const MAX_BLOCK_SIZE: u32 = 128 * 1024;

/// Errors that can occur when building [`SyncOptions`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BuilderError {
    /// Conflicting options were specified.
    ConflictingOptions {
        /// Description of the first conflicting option.
        option1: &'static str,
        /// Description of the second conflicting option.
        option2: &'static str,
    },
    /// An option value is out of range.
    ValueOutOfRange {
        /// Name of the option with invalid value.
        option: &'static str,
        /// Description of the valid range.
        range: String,
    },
}

impl std::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConflictingOptions { option1, option2 } => {
                write!(f, "conflicting options: {option1} and {option2}")
            }
            Self::ValueOutOfRange { option, range } => {
                write!(f, "value out of range for {option}: expected {range}")
            }
        }
    }
}

impl std::error::Error for BuilderError {}

/// Builder for constructing [`SyncOptions`] with validation.
#[derive(Clone, Debug)]
pub struct SyncOptionsBuilder {
    // Comparison
    checksum: bool,
    size_only: bool,
    update: bool,
    whole_file: bool,
    ignore_times: bool,
    modify_window: Duration,

    // Deletion
    delete: bool,
    delete_timing: DeleteTiming,

    // Writing
    dry_run: bool,
    in_place: bool,

    // Algorithms
    checksum_choice: ChecksumChoice,
    compress_choice: CompressChoice,

    // Tuning
    block_size: Option<u32>,
    bandwidth_limit: Option<NonZeroU64>,
    workers: Option<usize>,

    // Output
    itemize: bool,
    stats: bool,
}

impl Default for SyncOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncOptionsBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            checksum: false,
            size_only: false,
            update: false,
            whole_file: false,
            ignore_times: false,
            modify_window: Duration::ZERO,
            delete: false,
            delete_timing: DeleteTiming::default(),
            dry_run: false,
            in_place: false,
            checksum_choice: ChecksumChoice::default(),
            compress_choice: CompressChoice::default(),
            block_size: None,
            bandwidth_limit: None,
            workers: None,
            itemize: false,
            stats: false,
        }
    }

    /// Compare whole-file checksums instead of size and time.
    pub const fn checksum(mut self, enabled: bool) -> Self {
        self.checksum = enabled;
        self
    }

    /// Compare size alone.
    pub const fn size_only(mut self, enabled: bool) -> Self {
        self.size_only = enabled;
        self
    }

    /// Skip files that are newer on the destination.
    pub const fn update(mut self, enabled: bool) -> Self {
        self.update = enabled;
        self
    }

    /// Send whole files without delta matching.
    pub const fn whole_file(mut self, enabled: bool) -> Self {
        self.whole_file = enabled;
        self
    }

    /// Don't skip files that match size and time.
    pub const fn ignore_times(mut self, enabled: bool) -> Self {
        self.ignore_times = enabled;
        self
    }

    /// Modification times within this window compare equal.
    pub const fn modify_window(mut self, window: Duration) -> Self {
        self.modify_window = window;
        self
    }

    /// Delete extraneous destination entries.
    pub const fn delete(mut self, enabled: bool) -> Self {
        self.delete = enabled;
        self
    }

    /// When deletions happen. Has no effect unless [`Self::delete`] is set.
    pub const fn delete_timing(mut self, timing: DeleteTiming) -> Self {
        self.delete_timing = timing;
        self
    }

    /// Report without modifying the destination.
    pub const fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Update destination files in place.
    pub const fn in_place(mut self, enabled: bool) -> Self {
        self.in_place = enabled;
        self
    }

    /// Strong checksum algorithm.
    pub const fn checksum_choice(mut self, choice: ChecksumChoice) -> Self {
        self.checksum_choice = choice;
        self
    }

    /// Compression algorithm passed to the transport.
    pub const fn compress_choice(mut self, choice: CompressChoice) -> Self {
        self.compress_choice = choice;
        self
    }

    /// Forces the delta block length.
    pub const fn block_size(mut self, size: Option<u32>) -> Self {
        self.block_size = size;
        self
    }

    /// Transfer-rate ceiling in bytes per second.
    pub const fn bandwidth_limit(mut self, limit: Option<NonZeroU64>) -> Self {
        self.bandwidth_limit = limit;
        self
    }

    /// Worker count. `None` uses the available parallelism.
    pub const fn workers(mut self, workers: Option<usize>) -> Self {
        self.workers = workers;
        self
    }

    /// Emit itemized change records.
    pub const fn itemize(mut self, enabled: bool) -> Self {
        self.itemize = enabled;
        self
    }

    /// Emit the statistics summary.
    pub const fn stats(mut self, enabled: bool) -> Self {
        self.stats = enabled;
        self
    }

    /// Validates the settings and builds the options.
    pub fn build(self) -> Result<SyncOptions, BuilderError> {
        self.validate()?;
        Ok(self.into_options())
    }

    fn validate(&self) -> Result<(), BuilderError> {
        if self.size_only && self.checksum {
            return Err(BuilderError::ConflictingOptions {
                option1: "size_only",
                option2: "checksum",
            });
        }

        if let Some(size) = self.block_size
            && !(1..=MAX_BLOCK_SIZE).contains(&size)
        {
            return Err(BuilderError::ValueOutOfRange {
                option: "block_size",
                range: format!("1..={MAX_BLOCK_SIZE}"),
            });
        }

        if self.workers == Some(0) {
            return Err(BuilderError::ValueOutOfRange {
                option: "workers",
                range: "at least 1".to_owned(),
            });
        }

        Ok(())
    }

    pub(super) fn into_options(self) -> SyncOptions {
        let workers = self
            .workers
            .and_then(NonZeroUsize::new)
            .unwrap_or_else(default_workers);
        SyncOptions {
            checksum: self.checksum,
            size_only: self.size_only,
            update: self.update,
            whole_file: self.whole_file,
            ignore_times: self.ignore_times,
            modify_window: self.modify_window,
            delete: self.delete.then_some(self.delete_timing),
            dry_run: self.dry_run,
            in_place: self.in_place,
            checksum_choice: self.checksum_choice,
            compress_choice: self.compress_choice,
            block_size: self.block_size.and_then(NonZeroU32::new),
            bandwidth_limit: self.bandwidth_limit,
            workers,
            itemize: self.itemize,
            stats: self.stats,
        }
    }
}

fn default_workers() -> NonZeroUsize {
    thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_only_conflicts_with_checksum() {
        let error = SyncOptions::builder()
            .size_only(true)
            .checksum(true)
            .build()
            .expect_err("conflict");
        assert_eq!(
            error,
            BuilderError::ConflictingOptions {
                option1: "size_only",
                option2: "checksum",
            }
        );
        assert_eq!(
            error.to_string(),
            "conflicting options: size_only and checksum"
        );
    }

    #[test]
    fn block_size_bounds_are_inclusive() {
        assert!(SyncOptions::builder().block_size(Some(1)).build().is_ok());
        assert!(
            SyncOptions::builder()
                .block_size(Some(MAX_BLOCK_SIZE))
                .build()
                .is_ok()
        );
        let error = SyncOptions::builder()
            .block_size(Some(MAX_BLOCK_SIZE + 1))
            .build()
            .expect_err("too large");
        assert!(matches!(
            error,
            BuilderError::ValueOutOfRange {
                option: "block_size",
                ..
            }
        ));
        assert!(SyncOptions::builder().block_size(Some(0)).build().is_err());
    }

    #[test]
    fn zero_workers_rejected() {
        let error = SyncOptions::builder()
            .workers(Some(0))
            .build()
            .expect_err("zero");
        assert!(error.to_string().contains("workers"));
    }

    #[test]
    fn delete_timing_only_applies_when_deleting() {
        let options = SyncOptions::builder()
            .delete_timing(DeleteTiming::During)
            .build()
            .expect("options");
        assert_eq!(options.delete(), None);

        let options = SyncOptions::builder()
            .delete(true)
            .delete_timing(DeleteTiming::During)
            .build()
            .expect("options");
        assert_eq!(options.delete(), Some(DeleteTiming::During));
    }

    #[test]
    fn dry_run_and_in_place_may_combine() {
        let options = SyncOptions::builder()
            .dry_run(true)
            .in_place(true)
            .workers(Some(3))
            .build()
            .expect("options");
        assert!(options.dry_run());
        assert!(options.in_place());
        assert_eq!(options.workers().get(), 3);
    }
}
