use checksums::RollingDigest;

/// One block of the destination file as the matcher sees it.
///
/// The rolling digest also records the block's byte length, so a short final
/// block needs no separate field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignatureBlock {
    index: u64,
    rolling: RollingDigest,
    strong: Vec<u8>,
}

impl SignatureBlock {
    /// Pairs a block index with its weak and strong checksums.
    #[must_use]
    pub const fn from_raw_parts(index: u64, rolling: RollingDigest, strong: Vec<u8>) -> Self {
        Self {
            index,
            rolling,
            strong,
        }
    }

    /// Position of the block in the file, starting at 0.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Weak checksum.
    #[inline]
    #[must_use]
    pub const fn rolling(&self) -> RollingDigest {
        self.rolling
    }

    /// Strong checksum, truncated to the layout's strong length.
    #[inline]
    #[must_use]
    pub fn strong(&self) -> &[u8] {
        &self.strong
    }

    /// Bytes covered.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rolling.len()
    }

    /// Only an empty file could produce one, and empty files have no blocks.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rolling.is_empty()
    }
}
