use std::io;

use thiserror::Error;

/// Errors raised while applying a delta script.
#[derive(Debug, Error)]
pub enum DeltaError {
    /// A match token referenced a block outside the signature.
    #[error("corrupt delta: block {index} referenced but signature has {block_count} block(s)")]
    CorruptDelta {
        /// Block index carried by the token.
        index: u64,
        /// Number of blocks in the destination layout.
        block_count: u64,
    },
    /// A match token's length disagrees with the referenced block.
    #[error("corrupt delta: block {index} is {expected} byte(s) but token copies {actual}")]
    BlockLengthMismatch {
        /// Block index carried by the token.
        index: u64,
        /// Length of the block in the layout.
        expected: u64,
        /// Length recorded in the token.
        actual: u64,
    },
    /// Reading the basis or writing the output failed.
    #[error("delta application I/O failed: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
}

impl DeltaError {
    /// Reports whether the error comes from the token stream rather than I/O.
    #[must_use]
    pub const fn is_corrupt(&self) -> bool {
        matches!(
            self,
            Self::CorruptDelta { .. } | Self::BlockLengthMismatch { .. }
        )
    }
}
