//! Building signatures from a reader or an in-memory buffer.

use std::io::{self, Read};

use checksums::{ChecksumChoice, RollingDigest};
use logging::trace_delta;
use rayon::prelude::*;
use thiserror::Error;

use crate::block::SignatureBlock;
use crate::file::FileSignature;
use crate::layout::SignatureLayout;

/// Block count from which [`signature_from_bytes`] hashes blocks in parallel.
const PARALLEL_BLOCK_THRESHOLD: u64 = 64;

/// A signature could not be built for the given input.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Reading the destination failed.
    #[error("reading file for signature: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
    /// Input length does not match the layout.
    #[error("layout describes {expected} byte(s) but input holds {actual}")]
    LengthMismatch {
        /// Length implied by the layout.
        expected: u64,
        /// Length of the supplied input.
        actual: u64,
    },
    /// The file grew while it was being read.
    #[error("file is longer than its signature layout")]
    TrailingData,
    /// The block table would not fit in memory on this platform.
    #[error("{0} signature blocks do not fit in memory")]
    TooManyBlocks(u64),
}

fn block_signature(index: u64, chunk: &[u8], checksum: ChecksumChoice) -> SignatureBlock {
    SignatureBlock::from_raw_parts(index, RollingDigest::from_bytes(chunk), checksum.digest(chunk))
}

/// Generates a file signature by reading `reader` block by block.
///
/// The reader must yield exactly the number of bytes implied by `layout`.
pub fn generate_file_signature<R: Read>(
    mut reader: R,
    layout: SignatureLayout,
    checksum: ChecksumChoice,
) -> Result<FileSignature, SignatureError> {
    let block_len = layout.block_length().get() as usize;
    let block_count = layout.block_count();
    let capacity =
        usize::try_from(block_count).map_err(|_| SignatureError::TooManyBlocks(block_count))?;

    let mut blocks = Vec::with_capacity(capacity);
    let mut buffer = vec![0u8; block_len];
    let mut total_bytes: u64 = 0;

    for index in 0..block_count {
        let target_len = if index + 1 == block_count {
            layout.last_block_length() as usize
        } else {
            block_len
        };

        let chunk = &mut buffer[..target_len];
        reader.read_exact(chunk)?;
        total_bytes += target_len as u64;
        blocks.push(block_signature(index, chunk, checksum));
    }

    let mut extra = [0u8; 1];
    if reader.read(&mut extra)? != 0 {
        return Err(SignatureError::TrailingData);
    }

    trace_delta!(blocks = blocks.len(), total_bytes, "generated signature from reader");
    Ok(FileSignature::from_raw_parts(
        layout,
        checksum,
        blocks,
        total_bytes,
    ))
}

/// Builds the signature of an in-memory buffer.
///
/// Blocks are hashed on the rayon pool when the layout has at least
/// `PARALLEL_BLOCK_THRESHOLD` blocks; the result is identical either way.
pub fn signature_from_bytes(
    data: &[u8],
    layout: SignatureLayout,
    checksum: ChecksumChoice,
) -> Result<FileSignature, SignatureError> {
    let expected = layout.file_size();
    if expected != data.len() as u64 {
        return Err(SignatureError::LengthMismatch {
            expected,
            actual: data.len() as u64,
        });
    }

    let block_len = layout.block_length().get() as usize;
    let blocks: Vec<SignatureBlock> = if layout.block_count() >= PARALLEL_BLOCK_THRESHOLD {
        data.par_chunks(block_len)
            .enumerate()
            .map(|(index, chunk)| block_signature(index as u64, chunk, checksum))
            .collect()
    } else {
        data.chunks(block_len)
            .enumerate()
            .map(|(index, chunk)| block_signature(index as u64, chunk, checksum))
            .collect()
    };

    trace_delta!(blocks = blocks.len(), total_bytes = expected, "generated signature");
    Ok(FileSignature::from_raw_parts(
        layout, checksum, blocks, expected,
    ))
}
