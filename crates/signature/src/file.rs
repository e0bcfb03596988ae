//! crates/signature/src/file.rs
//!
//! Aggregated file signature container.

use checksums::ChecksumChoice;

use crate::block::SignatureBlock;
use crate::layout::SignatureLayout;

/// Bytes used to transmit one weak digest.
const WEAK_DIGEST_WIRE_LEN: u64 = 4;

/// Ordered block signatures for one file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileSignature {
    layout: SignatureLayout,
    checksum: ChecksumChoice,
    blocks: Vec<SignatureBlock>,
    total_bytes: u64,
}

impl FileSignature {
    /// Creates a signature from raw components.
    #[must_use]
    pub const fn from_raw_parts(
        layout: SignatureLayout,
        checksum: ChecksumChoice,
        blocks: Vec<SignatureBlock>,
        total_bytes: u64,
    ) -> Self {
        Self {
            layout,
            checksum,
            blocks,
            total_bytes,
        }
    }

    /// Signature of empty content.
    #[must_use]
    pub const fn empty(layout: SignatureLayout, checksum: ChecksumChoice) -> Self {
        Self::from_raw_parts(layout, checksum, Vec::new(), 0)
    }

    /// Returns the layout used to generate the signature.
    #[inline]
    #[must_use]
    pub const fn layout(&self) -> SignatureLayout {
        self.layout
    }

    /// Strong checksum algorithm the blocks were hashed with.
    #[inline]
    #[must_use]
    pub const fn checksum(&self) -> ChecksumChoice {
        self.checksum
    }

    /// Returns the list of block entries in the order they were generated.
    #[inline]
    #[must_use]
    pub fn blocks(&self) -> &[SignatureBlock] {
        &self.blocks
    }

    /// Returns the total number of bytes covered by the blocks.
    #[inline]
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Reports whether the signature has no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Bytes needed to transmit the block digests to the sender.
    #[must_use]
    pub fn wire_len(&self) -> u64 {
        let per_block = WEAK_DIGEST_WIRE_LEN + u64::from(self.layout.strong_sum_length().get());
        self.blocks.len() as u64 * per_block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checksums::RollingDigest;
    use std::num::{NonZeroU8, NonZeroU32};

    fn test_layout() -> SignatureLayout {
        SignatureLayout::from_raw_parts(
            NonZeroU32::new(700).expect("non-zero"),
            50,
            2,
            NonZeroU8::new(16).expect("non-zero"),
        )
    }

    #[test]
    fn wire_len_counts_weak_and_strong_bytes() {
        let blocks = vec![
            SignatureBlock::from_raw_parts(0, RollingDigest::from_bytes(&[0; 700]), vec![0; 16]),
            SignatureBlock::from_raw_parts(1, RollingDigest::from_bytes(&[0; 50]), vec![0; 16]),
        ];
        let sig = FileSignature::from_raw_parts(test_layout(), ChecksumChoice::Md5, blocks, 750);
        assert_eq!(sig.wire_len(), 2 * 20);
        assert_eq!(sig.total_bytes(), 750);
        assert!(!sig.is_empty());
    }

    #[test]
    fn empty_signature_has_no_wire_cost() {
        let sig = FileSignature::empty(test_layout(), ChecksumChoice::Xxh3);
        assert!(sig.is_empty());
        assert_eq!(sig.wire_len(), 0);
        assert_eq!(sig.checksum(), ChecksumChoice::Xxh3);
    }
}
