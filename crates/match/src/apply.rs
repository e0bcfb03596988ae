use std::cmp::min;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::ops::Range;

use logging::trace_delta;
use signature::SignatureLayout;

use crate::error::DeltaError;
use crate::script::{DeltaScript, DeltaToken};

const COPY_BUFFER_LEN: usize = 64 * 1024;

fn checked_range(layout: SignatureLayout, index: u64, len: usize) -> Result<Range<u64>, DeltaError> {
    let range = layout
        .block_range(index)
        .ok_or(DeltaError::CorruptDelta {
            index,
            block_count: layout.block_count(),
        })?;
    let expected = range.end - range.start;
    if expected != len as u64 {
        return Err(DeltaError::BlockLengthMismatch {
            index,
            expected,
            actual: len as u64,
        });
    }
    Ok(range)
}

/// Replays `script` against the pre-transfer destination content `basis`.
///
/// Pure function: the basis is only read and the output is a new buffer.
/// A basis shorter than `layout` describes is an I/O error, as it is when
/// streaming with [`apply_delta_to_writer`].
pub fn apply_delta(
    basis: &[u8],
    layout: SignatureLayout,
    script: &DeltaScript,
) -> Result<Vec<u8>, DeltaError> {
    let mut output = Vec::with_capacity(script.total_bytes() as usize);
    for token in script.tokens() {
        match token {
            DeltaToken::Literal(bytes) => output.extend_from_slice(bytes),
            DeltaToken::Match { index, len } => {
                let range = checked_range(layout, *index, *len)?;
                let block = basis
                    .get(range.start as usize..range.end as usize)
                    .ok_or_else(|| {
                        DeltaError::Io(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            format!("basis ends before block {index}"),
                        ))
                    })?;
                output.extend_from_slice(block);
            }
        }
    }
    Ok(output)
}

/// Streams the reconstruction of `script` into `output`, reading matched
/// blocks from `basis`.
///
/// `basis` and `output` must be distinct storage. Returns the number of
/// bytes written.
pub fn apply_delta_to_writer<R, W>(
    mut basis: R,
    mut output: W,
    layout: SignatureLayout,
    script: &DeltaScript,
) -> Result<u64, DeltaError>
where
    R: Read + Seek,
    W: Write,
{
    trace_delta!(
        "applying delta: {} tokens, {} total bytes, {} literal bytes",
        script.tokens().len(),
        script.total_bytes(),
        script.literal_bytes()
    );

    let mut buffer = vec![0u8; COPY_BUFFER_LEN];
    let mut basis_position: Option<u64> = None;
    let mut written = 0u64;

    for token in script.tokens() {
        match token {
            DeltaToken::Literal(bytes) => {
                output.write_all(bytes)?;
                written += bytes.len() as u64;
            }
            DeltaToken::Match { index, len } => {
                let range = checked_range(layout, *index, *len)?;
                if basis_position != Some(range.start) {
                    basis.seek(SeekFrom::Start(range.start))?;
                }

                let mut remaining = *len;
                while remaining > 0 {
                    let chunk = min(remaining, buffer.len());
                    basis.read_exact(&mut buffer[..chunk])?;
                    output.write_all(&buffer[..chunk])?;
                    remaining -= chunk;
                }
                basis_position = Some(range.end);
                written += *len as u64;
            }
        }
    }
    output.flush()?;
    Ok(written)
}
