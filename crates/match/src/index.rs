use checksums::{ChecksumChoice, RollingDigest};
use rustc_hash::FxHashMap;
use signature::{FileSignature, SignatureBlock, SignatureLayout};

/// Lookup table from weak digest to the signature blocks that share it.
#[derive(Clone, Debug)]
pub struct DeltaSignatureIndex {
    layout: SignatureLayout,
    checksum: ChecksumChoice,
    blocks: Vec<SignatureBlock>,
    lookup: FxHashMap<u32, Vec<usize>>,
}

impl DeltaSignatureIndex {
    /// Builds an index for `signature`. Returns `None` when it has no blocks.
    #[must_use]
    pub fn from_signature(signature: &FileSignature) -> Option<Self> {
        if signature.is_empty() {
            return None;
        }

        let blocks = signature.blocks().to_vec();
        let mut lookup: FxHashMap<u32, Vec<usize>> = FxHashMap::default();
        for (position, block) in blocks.iter().enumerate() {
            lookup
                .entry(block.rolling().value())
                .or_default()
                .push(position);
        }

        Some(Self {
            layout: signature.layout(),
            checksum: signature.checksum(),
            blocks,
            lookup,
        })
    }

    /// Layout of the indexed destination content.
    #[must_use]
    pub const fn layout(&self) -> SignatureLayout {
        self.layout
    }

    /// Returns the block length used by the signature.
    #[must_use]
    pub fn block_length(&self) -> usize {
        self.layout.block_length().get() as usize
    }

    /// Length of the final block when it is shorter than a full block.
    #[must_use]
    pub fn tail_length(&self) -> Option<usize> {
        match self.layout.remainder() {
            0 => None,
            remainder => Some(remainder as usize),
        }
    }

    /// Returns the block stored at `position`.
    #[must_use]
    pub fn block(&self, position: usize) -> &SignatureBlock {
        &self.blocks[position]
    }

    /// Number of indexed blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always `false`; empty signatures are never indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Finds a block whose weak digest, length and strong digest all match
    /// `window`.
    ///
    /// The strong digest of the window is computed at most once, and only
    /// when a candidate of the right length exists.
    #[must_use]
    pub fn find_match(&self, digest: RollingDigest, window: &[u8]) -> Option<usize> {
        let candidates = self.lookup.get(&digest.value())?;
        let mut strong: Option<Vec<u8>> = None;
        for &position in candidates {
            let block = &self.blocks[position];
            if block.len() != window.len() {
                continue;
            }
            let window_strong = strong.get_or_insert_with(|| self.checksum.digest(window));
            if window_strong.as_slice() == block.strong() {
                return Some(position);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signature::{SignatureLayoutParams, calculate_signature_layout, signature_from_bytes};
    use std::num::NonZeroU32;

    fn index_for(data: &[u8], block: u32) -> Option<DeltaSignatureIndex> {
        let layout = calculate_signature_layout(SignatureLayoutParams::new(
            data.len() as u64,
            NonZeroU32::new(block),
            ChecksumChoice::Md5,
        ))
        .expect("layout");
        let signature = signature_from_bytes(data, layout, ChecksumChoice::Md5).expect("signature");
        DeltaSignatureIndex::from_signature(&signature)
    }

    #[test]
    fn empty_signature_has_no_index() {
        assert!(index_for(&[], 16).is_none());
    }

    #[test]
    fn finds_each_block_by_content() {
        let data: Vec<u8> = (0..64u8).collect();
        let index = index_for(&data, 16).expect("index");
        assert_eq!(index.len(), 4);
        assert_eq!(index.tail_length(), None);
        for position in 0..4 {
            let window = &data[position * 16..(position + 1) * 16];
            let found = index.find_match(RollingDigest::from_bytes(window), window);
            assert_eq!(found, Some(position));
        }
    }

    #[test]
    fn weak_collision_is_rejected_by_strong_digest() {
        let data = b"abcdefgh".to_vec();
        let index = index_for(&data, 8).expect("index");
        // Reuse the block's weak digest so only the strong digest can reject.
        let impostor = b"abcdefhg";
        let digest = index.block(0).rolling();
        assert_eq!(index.find_match(digest, impostor), None);
    }

    #[test]
    fn tail_block_requires_exact_length() {
        let data: Vec<u8> = (0..20u8).collect();
        let index = index_for(&data, 16).expect("index");
        assert_eq!(index.tail_length(), Some(4));
        let tail = &data[16..];
        assert_eq!(
            index.find_match(RollingDigest::from_bytes(tail), tail),
            Some(1)
        );
    }
}
