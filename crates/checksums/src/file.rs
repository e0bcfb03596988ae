//! Whole-file digests used by `--checksum` comparisons and post-apply
//! verification.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use logging::trace_io;

use crate::ChecksumChoice;

const READ_BUFFER_LEN: usize = 64 * 1024;

/// Streams `reader` through the selected strong checksum.
pub fn digest_reader<R: Read>(choice: ChecksumChoice, reader: &mut R) -> io::Result<Vec<u8>> {
    let mut hasher = choice.hasher();
    let mut buffer = vec![0u8; READ_BUFFER_LEN];
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buffer[..n]),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(hasher.finalize())
}

/// Digest of the file at `path`.
pub fn digest_file(choice: ChecksumChoice, path: &Path) -> io::Result<Vec<u8>> {
    trace_io!("hashing {} with {}", path.display(), choice);
    let mut file = File::open(path)?;
    digest_reader(choice, &mut file)
}
