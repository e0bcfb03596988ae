//! Destination writes.
//!
//! Staged writes go to a temporary file beside the destination and are
//! renamed over it only after the content has been verified, so an
//! interrupted run never exposes a half-written file. In-place writes
//! overwrite the destination directly and give up that guarantee.

use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use checksums::ChecksumChoice;
use logging::trace_io;
use matching::{DeltaScript, apply_delta, apply_delta_to_writer};
use signature::SignatureLayout;
use tempfile::NamedTempFile;

use crate::error::SyncError;

const STAGING_PREFIX: &str = ".dsync-";

/// Temporary file that replaces `final_path` on commit and disappears when
/// dropped uncommitted.
pub(crate) struct StagedFile {
    temp: NamedTempFile,
    final_path: PathBuf,
}

impl StagedFile {
    pub(crate) fn new(destination: &Path) -> Result<Self, SyncError> {
        let parent = destination
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let temp = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(parent)
            .map_err(|error| SyncError::io("create staging file for", destination, error))?;
        trace_io!("staging {} at {}", destination.display(), temp.path().display());
        Ok(Self {
            temp,
            final_path: destination.to_path_buf(),
        })
    }

    pub(crate) fn staging_path(&self) -> &Path {
        self.temp.path()
    }

    pub(crate) fn commit(self) -> Result<(), SyncError> {
        let final_path = self.final_path;
        self.temp
            .persist(&final_path)
            .map(drop)
            .map_err(|error| SyncError::io("rename staging file onto", final_path, error.error))
    }
}

/// Where reconstructed content goes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum WriteMode {
    Staged,
    InPlace,
}

/// Outcome of one write attempt.
pub(crate) enum Written {
    /// Content is in place and verified.
    Verified,
    /// Content did not match the expected digest; the destination is
    /// untouched in staged mode.
    Mismatch,
}

/// Writes `content` verbatim to `destination`.
pub(crate) fn write_whole(
    destination: &Path,
    content: &[u8],
    mode: WriteMode,
) -> Result<(), SyncError> {
    match mode {
        WriteMode::InPlace => fs::write(destination, content)
            .map_err(|error| SyncError::io("write", destination, error)),
        WriteMode::Staged => {
            let mut staged = StagedFile::new(destination)?;
            write_all(staged.temp.as_file_mut(), content)
                .map_err(|error| SyncError::io("write", destination, error))?;
            staged.commit()
        }
    }
}

/// Replays `script` against the current content of `destination` and
/// stores the result if its digest equals `expected`.
pub(crate) fn write_delta(
    destination: &Path,
    layout: SignatureLayout,
    script: &DeltaScript,
    choice: ChecksumChoice,
    expected: &[u8],
    mode: WriteMode,
) -> Result<Written, SyncError> {
    match mode {
        WriteMode::InPlace => {
            let basis =
                fs::read(destination).map_err(|error| SyncError::io("read", destination, error))?;
            let output = apply_delta(&basis, layout, script)
                .map_err(|error| SyncError::delta(destination, error))?;
            if choice.digest(&output) != expected {
                return Ok(Written::Mismatch);
            }
            fs::write(destination, &output)
                .map_err(|error| SyncError::io("write", destination, error))?;
            Ok(Written::Verified)
        }
        WriteMode::Staged => {
            let basis = fs::File::open(destination)
                .map_err(|error| SyncError::io("open", destination, error))?;
            let mut staged = StagedFile::new(destination)?;
            {
                let mut output = BufWriter::new(staged.temp.as_file_mut());
                apply_delta_to_writer(BufReader::new(basis), &mut output, layout, script)
                    .map_err(|error| SyncError::delta(destination, error))?;
                output
                    .flush()
                    .map_err(|error| SyncError::io("write", destination, error))?;
            }
            let digest = checksums::digest_file(choice, staged.staging_path())
                .map_err(|error| SyncError::io("verify", destination, error))?;
            if digest != expected {
                return Ok(Written::Mismatch);
            }
            staged.commit()?;
            Ok(Written::Verified)
        }
    }
}

fn write_all(file: &mut fs::File, content: &[u8]) -> io::Result<()> {
    file.write_all(content)?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use matching::{DeltaGenerator, DeltaSignatureIndex};
    use signature::{SignatureLayoutParams, calculate_signature_layout, signature_from_bytes};
    use std::num::NonZeroU32;

    fn delta_for(basis: &[u8], source: &[u8]) -> (SignatureLayout, DeltaScript) {
        let choice = ChecksumChoice::Md5;
        let layout = calculate_signature_layout(SignatureLayoutParams::new(
            basis.len() as u64,
            NonZeroU32::new(4),
            choice,
        ))
        .expect("layout");
        let signature = signature_from_bytes(basis, layout, choice).expect("signature");
        let index = DeltaSignatureIndex::from_signature(&signature);
        (layout, DeltaGenerator::new().generate(source, index.as_ref()))
    }

    fn leftover_staging(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(STAGING_PREFIX))
            .collect()
    }

    #[test]
    fn staged_whole_write_replaces_destination() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("file");
        fs::write(&path, b"old").expect("seed");
        write_whole(&path, b"brand new", WriteMode::Staged).expect("write");
        assert_eq!(fs::read(&path).expect("read"), b"brand new");
        assert!(leftover_staging(temp.path()).is_empty());
    }

    #[test]
    fn staged_delta_write_verifies_and_commits() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("file");
        let basis = b"abcdefghijkl";
        let source = b"abcdXXXXijklmn";
        fs::write(&path, basis).expect("seed");
        let (layout, script) = delta_for(basis, source);
        let expected = ChecksumChoice::Md5.digest(source);

        let written = write_delta(
            &path,
            layout,
            &script,
            ChecksumChoice::Md5,
            &expected,
            WriteMode::Staged,
        )
        .expect("write");
        assert!(matches!(written, Written::Verified));
        assert_eq!(fs::read(&path).expect("read"), source);
        assert!(leftover_staging(temp.path()).is_empty());
    }

    #[test]
    fn mismatch_leaves_staged_destination_untouched() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("file");
        let basis = b"abcdefgh";
        fs::write(&path, basis).expect("seed");
        let (layout, script) = delta_for(basis, b"abcdefgh!");

        let written = write_delta(
            &path,
            layout,
            &script,
            ChecksumChoice::Md5,
            b"not the digest",
            WriteMode::Staged,
        )
        .expect("write");
        assert!(matches!(written, Written::Mismatch));
        assert_eq!(fs::read(&path).expect("read"), basis);
        assert!(leftover_staging(temp.path()).is_empty());
    }

    #[test]
    fn in_place_delta_write_overwrites_destination() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("file");
        let basis = b"0123456789";
        let source = b"4567012389";
        fs::write(&path, basis).expect("seed");
        let (layout, script) = delta_for(basis, source);
        let expected = ChecksumChoice::Md5.digest(source);

        let written = write_delta(
            &path,
            layout,
            &script,
            ChecksumChoice::Md5,
            &expected,
            WriteMode::InPlace,
        )
        .expect("write");
        assert!(matches!(written, Written::Verified));
        assert_eq!(fs::read(&path).expect("read"), source);
    }

    #[test]
    fn in_place_delta_on_shrunken_basis_is_recoverable() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("file");
        let basis = b"0123456789ab";
        let source = b"89ab01234567";
        let (layout, script) = delta_for(basis, source);
        fs::write(&path, b"0123").expect("shrunken basis");
        let expected = ChecksumChoice::Md5.digest(source);

        let error = write_delta(
            &path,
            layout,
            &script,
            ChecksumChoice::Md5,
            &expected,
            WriteMode::InPlace,
        )
        .err()
        .expect("short basis");
        assert!(!error.is_fatal());
        assert_eq!(error.exit_code(), crate::error::PARTIAL_TRANSFER_EXIT_CODE);
        assert_eq!(fs::read(&path).expect("read"), b"0123");
    }

    #[test]
    fn staging_requires_existing_parent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("missing/file");
        let error = write_whole(&path, b"x", WriteMode::Staged).expect_err("no parent");
        assert!(!error.is_fatal());
    }
}
