//! Block sizing.
//!
//! Small files share one block length. Past that the length grows with the
//! square root of the file size, so the signature stays a small and roughly
//! constant fraction of the data it describes.

use core::num::{NonZeroU8, NonZeroU32};
use core::ops::Range;

use checksums::ChecksumChoice;
use thiserror::Error;

/// Block length for every file up to `DEFAULT_BLOCK_LENGTH²` bytes.
pub const DEFAULT_BLOCK_LENGTH: u32 = 700;
/// Ceiling for both the heuristic and `--block-size`.
pub const MAX_BLOCK_LENGTH: u32 = 1 << 17;

/// Inputs to [`calculate_signature_layout`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SignatureLayoutParams {
    file_length: u64,
    forced_block_length: Option<NonZeroU32>,
    checksum: ChecksumChoice,
}

impl SignatureLayoutParams {
    /// Describes a file of `file_length` bytes.
    #[must_use]
    pub const fn new(
        file_length: u64,
        forced_block_length: Option<NonZeroU32>,
        checksum: ChecksumChoice,
    ) -> Self {
        Self {
            file_length,
            forced_block_length,
            checksum,
        }
    }

    /// Size of the file being described.
    #[must_use]
    pub const fn file_length(self) -> u64 {
        self.file_length
    }

    /// Override from `--block-size`, if any.
    #[must_use]
    pub const fn forced_block_length(self) -> Option<NonZeroU32> {
        self.forced_block_length
    }

    /// Strong checksum the blocks will carry.
    #[must_use]
    pub const fn checksum(self) -> ChecksumChoice {
        self.checksum
    }
}

/// How a file is cut into blocks.
///
/// Every block has `block_length` bytes except the last, which holds
/// `remainder` bytes when the size is not a multiple of the block length.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SignatureLayout {
    block_length: NonZeroU32,
    remainder: u32,
    block_count: u64,
    strong_sum_length: NonZeroU8,
}

impl SignatureLayout {
    /// Assembles a layout without validation.
    #[must_use]
    pub const fn from_raw_parts(
        block_length: NonZeroU32,
        remainder: u32,
        block_count: u64,
        strong_sum_length: NonZeroU8,
    ) -> Self {
        Self {
            block_length,
            remainder,
            block_count,
            strong_sum_length,
        }
    }

    /// Bytes per full block.
    #[must_use]
    pub const fn block_length(self) -> NonZeroU32 {
        self.block_length
    }

    /// Bytes in a trailing partial block, or 0.
    #[must_use]
    pub const fn remainder(self) -> u32 {
        self.remainder
    }

    /// Number of blocks, counting a trailing partial one.
    #[must_use]
    pub const fn block_count(self) -> u64 {
        self.block_count
    }

    /// Bytes of strong checksum stored per block.
    #[must_use]
    pub const fn strong_sum_length(self) -> NonZeroU8 {
        self.strong_sum_length
    }

    /// Bytes in the final block; 0 when there are no blocks.
    #[must_use]
    pub const fn last_block_length(self) -> u32 {
        match (self.block_count, self.remainder) {
            (0, _) => 0,
            (_, 0) => self.block_length.get(),
            (_, partial) => partial,
        }
    }

    /// Byte range of block `index` in the original file.
    #[must_use]
    pub fn block_range(self, index: u64) -> Option<Range<u64>> {
        if index >= self.block_count {
            return None;
        }
        let start = index * u64::from(self.block_length.get());
        let len = if index + 1 == self.block_count {
            self.last_block_length()
        } else {
            self.block_length.get()
        };
        Some(start..start + u64::from(len))
    }

    /// Sum of all block lengths.
    #[must_use]
    pub fn file_size(self) -> u64 {
        self.block_count
            .checked_sub(1)
            .map_or(0, |full| full * u64::from(self.block_length.get()))
            + u64::from(self.last_block_length())
    }
}

/// Why a file cannot be described by a layout.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum SignatureLayoutError {
    /// Sizes past `i64::MAX` are not supported.
    #[error("file of {length} bytes is too large to sign")]
    FileTooLarge {
        /// Offending size.
        length: u64,
    },
    /// The block index would not fit in 31 bits.
    #[error("{blocks} blocks of {block_length} bytes exceed the block index range")]
    BlockCountOverflow {
        /// Chosen block length.
        block_length: u32,
        /// Resulting block count.
        blocks: u64,
    },
}

/// Picks the block length for a file and derives the block count.
///
/// A forced length wins over the heuristic but is still capped at
/// [`MAX_BLOCK_LENGTH`].
#[doc(alias = "--block-size")]
pub fn calculate_signature_layout(
    params: SignatureLayoutParams,
) -> Result<SignatureLayout, SignatureLayoutError> {
    let length = params.file_length();
    if i64::try_from(length).is_err() {
        return Err(SignatureLayoutError::FileTooLarge { length });
    }

    let block_length = params
        .forced_block_length()
        .map_or_else(|| heuristic_block_length(length), NonZeroU32::get)
        .min(MAX_BLOCK_LENGTH);
    let block_length = NonZeroU32::new(block_length).unwrap_or(NonZeroU32::MIN);
    let per_block = u64::from(block_length.get());

    let remainder = (length % per_block) as u32;
    let block_count = length.div_ceil(per_block);
    if block_count > i32::MAX as u64 {
        return Err(SignatureLayoutError::BlockCountOverflow {
            block_length: block_length.get(),
            blocks: block_count,
        });
    }

    let strong_len = u8::try_from(params.checksum().digest_len()).unwrap_or(u8::MAX);
    Ok(SignatureLayout {
        block_length,
        remainder,
        block_count,
        strong_sum_length: NonZeroU8::new(strong_len).unwrap_or(NonZeroU8::MIN),
    })
}

/// `isqrt(length)` rounded down to a multiple of 8, within
/// `DEFAULT_BLOCK_LENGTH..=MAX_BLOCK_LENGTH`.
fn heuristic_block_length(length: u64) -> u32 {
    let root = length.isqrt() & !7;
    root.clamp(u64::from(DEFAULT_BLOCK_LENGTH), u64::from(MAX_BLOCK_LENGTH)) as u32
}
