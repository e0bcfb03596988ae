//! Per-file transfer task.
//!
//! A task reads the source, builds the destination signature when a delta is
//! requested, encodes the delta, charges the bandwidth limiter and writes the
//! result. Tasks are independent of each other and run on the worker pool;
//! the only shared state is the statistics aggregator and the limiter.

use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use bandwidth::SharedLimiter;
use filetime::FileTime;
use logging::{trace_copy, trace_delta, trace_io, warn_entry};
use matching::{DeltaGenerator, DeltaScript, DeltaSignatureIndex, whole_file_script};
use signature::{
    SignatureLayout, SignatureLayoutParams, calculate_signature_layout, generate_file_signature,
};

use crate::error::SyncError;
use crate::options::SyncOptions;
use crate::stats::StatsAggregator;
use crate::writer::{self, WriteMode, Written};

/// Bytes charged for each token header on the wire.
pub const TOKEN_HEADER_LEN: u64 = 4;
/// Bytes a receiver sends to acknowledge one delta-synchronised file.
pub const DELTA_FILE_OVERHEAD: u64 = 8;

/// One regular file to transfer.
#[derive(Clone, Debug)]
pub(crate) struct FileTask {
    pub(crate) relative: PathBuf,
    pub(crate) source: PathBuf,
    pub(crate) destination: PathBuf,
    pub(crate) mtime: SystemTime,
    pub(crate) delta: bool,
}

/// Shared, read-only state handed to every task.
#[derive(Clone, Copy)]
pub(crate) struct TransferContext<'a> {
    pub(crate) options: &'a SyncOptions,
    pub(crate) stats: &'a StatsAggregator,
    pub(crate) limiter: Option<&'a SharedLimiter>,
}

impl TransferContext<'_> {
    fn throttle(&self, bytes: u64) {
        if let Some(limiter) = self.limiter
            && bytes > 0
        {
            let slept = limiter.consume(usize::try_from(bytes).unwrap_or(usize::MAX));
            if !slept.is_noop() {
                trace_io!(
                    "throttled {} bytes: asked {:?}, slept {:?}",
                    bytes,
                    slept.requested(),
                    slept.actual()
                );
            }
        }
    }

    const fn write_mode(&self) -> WriteMode {
        if self.options.in_place() {
            WriteMode::InPlace
        } else {
            WriteMode::Staged
        }
    }
}

/// Byte accounting for a finished task.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct FileOutcome {
    pub(crate) source_bytes: u64,
    pub(crate) literal_bytes: u64,
    pub(crate) matched_bytes: u64,
    pub(crate) bytes_sent: u64,
    pub(crate) bytes_received: u64,
    pub(crate) retried: bool,
}

struct Encoded {
    script: DeltaScript,
    layout: Option<SignatureLayout>,
    signature_bytes: u64,
    /// Whole-file digest of the source, checked after a delta is applied.
    source_digest: Option<Vec<u8>>,
}

/// Runs `task` and records its statistics on success.
pub(crate) fn transfer_file(
    task: &FileTask,
    context: TransferContext<'_>,
) -> Result<FileOutcome, SyncError> {
    let source =
        fs::read(&task.source).map_err(|error| SyncError::io("read", &task.source, error))?;
    let encoded = encode(task, &source, context)?;
    complete(task, &source, &encoded, context)
}

/// Charges, writes and records an encoded file.
fn complete(
    task: &FileTask,
    source: &[u8],
    encoded: &Encoded,
    context: TransferContext<'_>,
) -> Result<FileOutcome, SyncError> {
    let script = &encoded.script;

    let mut outcome = FileOutcome {
        source_bytes: source.len() as u64,
        literal_bytes: script.literal_bytes(),
        matched_bytes: script.matched_bytes(),
        bytes_sent: script.literal_bytes() + TOKEN_HEADER_LEN * script.tokens().len() as u64,
        bytes_received: 0,
        retried: false,
    };
    if encoded.layout.is_some() {
        outcome.bytes_received = encoded.signature_bytes + DELTA_FILE_OVERHEAD;
    }
    context.throttle(script.literal_bytes());

    if !context.options.dry_run() {
        outcome.retried = store(task, source, encoded, context)?;
        if outcome.retried {
            let resent = source.len() as u64 + TOKEN_HEADER_LEN;
            outcome.bytes_sent += resent;
            context.throttle(source.len() as u64);
        }
        filetime::set_file_mtime(&task.destination, FileTime::from_system_time(task.mtime))
            .map_err(|error| SyncError::io("set modification time on", &task.destination, error))?;
    }

    trace_copy!(
        "{} ({} literal, {} matched)",
        task.relative.display(),
        outcome.literal_bytes,
        outcome.matched_bytes
    );
    context.stats.record_transferred(
        outcome.source_bytes,
        outcome.literal_bytes,
        outcome.matched_bytes,
    );
    context
        .stats
        .record_transport_bytes(outcome.bytes_sent, outcome.bytes_received);
    Ok(outcome)
}

fn encode(
    task: &FileTask,
    source: &[u8],
    context: TransferContext<'_>,
) -> Result<Encoded, SyncError> {
    let whole = || Encoded {
        script: whole_file_script(source),
        layout: None,
        signature_bytes: 0,
        source_digest: None,
    };
    if !task.delta {
        return Ok(whole());
    }

    let basis = fs::File::open(&task.destination)
        .map_err(|error| SyncError::io("open", &task.destination, error))?;
    let basis_len = basis
        .metadata()
        .map_err(|error| SyncError::io("stat", &task.destination, error))?
        .len();
    if basis_len == 0 {
        return Ok(whole());
    }

    let choice = context.options.checksum_choice();
    let layout = calculate_signature_layout(SignatureLayoutParams::new(
        basis_len,
        context.options.block_size(),
        choice,
    ))
    .map_err(|error| SyncError::layout(&task.destination, error))?;
    let signature = generate_file_signature(BufReader::new(basis), layout, choice)
        .map_err(|error| SyncError::signature(&task.destination, error))?;
    context.throttle(signature.wire_len());

    let index = DeltaSignatureIndex::from_signature(&signature);
    let script = DeltaGenerator::new().generate(source, index.as_ref());
    trace_delta!(
        "{}: {} blocks of {} bytes, {} tokens",
        task.relative.display(),
        layout.block_count(),
        layout.block_length(),
        script.tokens().len()
    );
    Ok(Encoded {
        script,
        layout: Some(layout),
        signature_bytes: signature.wire_len(),
        source_digest: Some(choice.digest(source)),
    })
}

/// Writes the encoded file. Returns `true` when verification failed and the
/// file had to be resent whole.
fn store(
    task: &FileTask,
    source: &[u8],
    encoded: &Encoded,
    context: TransferContext<'_>,
) -> Result<bool, SyncError> {
    let mode = context.write_mode();
    let (Some(layout), Some(expected)) = (encoded.layout, encoded.source_digest.as_deref())
    else {
        writer::write_whole(&task.destination, source, mode)?;
        return Ok(false);
    };

    let choice = context.options.checksum_choice();
    match writer::write_delta(
        &task.destination,
        layout,
        &encoded.script,
        choice,
        expected,
        mode,
    )? {
        Written::Verified => Ok(false),
        Written::Mismatch => {
            warn_entry!(
                "{} failed verification, retrying as whole file",
                task.relative.display()
            );
            writer::write_whole(&task.destination, source, mode)?;
            verify(&task.destination, choice, expected)?;
            Ok(true)
        }
    }
}

fn verify(path: &Path, choice: checksums::ChecksumChoice, expected: &[u8]) -> Result<(), SyncError> {
    let digest =
        checksums::digest_file(choice, path).map_err(|error| SyncError::io("verify", path, error))?;
    if digest == expected {
        Ok(())
    } else {
        Err(SyncError::verification_failed(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::set_file_mtime;
    use std::time::Duration;

    fn task(root: &Path, name: &str, delta: bool) -> FileTask {
        FileTask {
            relative: PathBuf::from(name),
            source: root.join("src").join(name),
            destination: root.join("dst").join(name),
            mtime: SystemTime::UNIX_EPOCH + Duration::from_secs(1_234_567),
            delta,
        }
    }

    fn layout_dirs() -> tempfile::TempDir {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir(temp.path().join("src")).expect("src");
        fs::create_dir(temp.path().join("dst")).expect("dst");
        temp
    }

    #[test]
    fn appended_byte_reuses_existing_block() {
        let temp = layout_dirs();
        let original = vec![b'a'; 100];
        let mut updated = original.clone();
        updated.push(b'!');
        fs::write(temp.path().join("src/B"), &updated).expect("src");
        fs::write(temp.path().join("dst/B"), &original).expect("dst");

        let options = SyncOptions::builder()
            .block_size(Some(100))
            .build()
            .expect("options");
        let stats = StatsAggregator::new();
        let context = TransferContext {
            options: &options,
            stats: &stats,
            limiter: None,
        };
        let task = task(temp.path(), "B", true);
        let outcome = transfer_file(&task, context).expect("transfer");

        assert_eq!(outcome.matched_bytes, 100);
        assert_eq!(outcome.literal_bytes, 1);
        assert_eq!(outcome.bytes_sent, 1 + 2 * TOKEN_HEADER_LEN);
        assert!(outcome.bytes_received > DELTA_FILE_OVERHEAD);
        assert!(!outcome.retried);
        assert_eq!(fs::read(&task.destination).expect("read"), updated);

        let mtime = fs::metadata(&task.destination)
            .expect("meta")
            .modified()
            .expect("mtime");
        assert_eq!(mtime, task.mtime);
        assert_eq!(stats.snapshot().files_transferred, 1);
    }

    #[test]
    fn whole_file_creates_destination() {
        let temp = layout_dirs();
        fs::write(temp.path().join("src/C"), vec![7u8; 50]).expect("src");

        let options = SyncOptions::default();
        let stats = StatsAggregator::new();
        let context = TransferContext {
            options: &options,
            stats: &stats,
            limiter: None,
        };
        let task = task(temp.path(), "C", false);
        let outcome = transfer_file(&task, context).expect("transfer");

        assert_eq!(outcome.literal_bytes, 50);
        assert_eq!(outcome.matched_bytes, 0);
        assert_eq!(outcome.bytes_sent, 50 + TOKEN_HEADER_LEN);
        assert_eq!(outcome.bytes_received, 0);
        assert_eq!(fs::read(&task.destination).expect("read"), vec![7u8; 50]);
    }

    #[test]
    fn dry_run_computes_without_writing() {
        let temp = layout_dirs();
        fs::write(temp.path().join("src/D"), b"new content").expect("src");
        fs::write(temp.path().join("dst/D"), b"old content").expect("dst");
        set_file_mtime(
            temp.path().join("dst/D"),
            FileTime::from_unix_time(10, 0),
        )
        .expect("mtime");

        let options = SyncOptions::builder().dry_run(true).build().expect("options");
        let stats = StatsAggregator::new();
        let context = TransferContext {
            options: &options,
            stats: &stats,
            limiter: None,
        };
        let task = task(temp.path(), "D", true);
        let outcome = transfer_file(&task, context).expect("transfer");

        assert_eq!(outcome.source_bytes, 11);
        assert_eq!(fs::read(&task.destination).expect("read"), b"old content");
        let mtime = FileTime::from_last_modification_time(
            &fs::metadata(&task.destination).expect("meta"),
        );
        assert_eq!(mtime.unix_seconds(), 10);
        assert_eq!(stats.snapshot().files_transferred, 1);
    }

    #[test]
    fn empty_destination_falls_back_to_whole_file() {
        let temp = layout_dirs();
        fs::write(temp.path().join("src/E"), b"xyz").expect("src");
        fs::write(temp.path().join("dst/E"), b"").expect("dst");

        let options = SyncOptions::default();
        let stats = StatsAggregator::new();
        let context = TransferContext {
            options: &options,
            stats: &stats,
            limiter: None,
        };
        let outcome = transfer_file(&task(temp.path(), "E", true), context).expect("transfer");
        assert_eq!(outcome.bytes_received, 0);
        assert_eq!(outcome.literal_bytes, 3);
    }

    #[test]
    fn unreadable_source_is_recoverable() {
        let temp = layout_dirs();
        let options = SyncOptions::default();
        let stats = StatsAggregator::new();
        let context = TransferContext {
            options: &options,
            stats: &stats,
            limiter: None,
        };
        let error = transfer_file(&task(temp.path(), "missing", false), context)
            .expect_err("missing source");
        assert!(!error.is_fatal());
        assert_eq!(stats.snapshot().files_transferred, 0);
    }

    /// Encoding for `AAAABBBB -> BBBBAAAA` whose script copies block 0 twice.
    fn misdirected_encoding(options: &SyncOptions, source: &[u8]) -> Encoded {
        use matching::DeltaToken;
        use std::num::{NonZeroU8, NonZeroU32};

        Encoded {
            script: DeltaScript::from_tokens(vec![
                DeltaToken::Match { index: 0, len: 4 },
                DeltaToken::Match { index: 0, len: 4 },
            ]),
            layout: Some(SignatureLayout::from_raw_parts(
                NonZeroU32::new(4).expect("block"),
                0,
                2,
                NonZeroU8::new(16).expect("strong"),
            )),
            signature_bytes: 0,
            source_digest: Some(options.checksum_choice().digest(source)),
        }
    }

    #[test]
    fn failed_verification_resends_whole_file() {
        let temp = layout_dirs();
        let source = b"BBBBAAAA";
        fs::write(temp.path().join("src/R"), source).expect("src");
        fs::write(temp.path().join("dst/R"), b"AAAABBBB").expect("dst");

        let options = SyncOptions::default();
        let stats = StatsAggregator::new();
        let context = TransferContext {
            options: &options,
            stats: &stats,
            limiter: None,
        };
        let task = task(temp.path(), "R", true);
        let encoded = misdirected_encoding(&options, source);
        let outcome = complete(&task, source, &encoded, context).expect("retry succeeds");

        assert!(outcome.retried);
        assert_eq!(fs::read(&task.destination).expect("read"), source);
        let script_bytes = 2 * TOKEN_HEADER_LEN;
        let resent = source.len() as u64 + TOKEN_HEADER_LEN;
        assert_eq!(outcome.bytes_sent, script_bytes + resent);
        assert_eq!(outcome.bytes_received, DELTA_FILE_OVERHEAD);
        assert_eq!(stats.snapshot().bytes_sent, script_bytes + resent);
    }

    #[test]
    fn resend_that_still_mismatches_is_recoverable() {
        let temp = layout_dirs();
        let source = b"BBBBAAAA";
        fs::write(temp.path().join("src/V"), source).expect("src");
        fs::write(temp.path().join("dst/V"), b"AAAABBBB").expect("dst");

        let options = SyncOptions::default();
        let stats = StatsAggregator::new();
        let context = TransferContext {
            options: &options,
            stats: &stats,
            limiter: None,
        };
        let task = task(temp.path(), "V", true);
        let mut encoded = misdirected_encoding(&options, source);
        encoded.source_digest = Some(vec![0u8; 16]);

        let error = complete(&task, source, &encoded, context).expect_err("still mismatched");
        assert!(matches!(
            error.kind(),
            crate::error::SyncErrorKind::VerificationFailed { .. }
        ));
        assert!(!error.is_fatal());
        assert_eq!(stats.snapshot().files_transferred, 0);
    }

    #[test]
    fn limiter_sees_literal_payload() {
        let temp = layout_dirs();
        fs::write(temp.path().join("src/L"), vec![1u8; 600]).expect("src");

        let options = SyncOptions::default();
        let stats = StatsAggregator::new();
        let limiter = SharedLimiter::new(std::num::NonZeroU64::new(1 << 30).expect("rate"));
        let context = TransferContext {
            options: &options,
            stats: &stats,
            limiter: Some(&limiter),
        };
        transfer_file(&task(temp.path(), "L", false), context).expect("transfer");
        assert_eq!(limiter.total_registered(), 600);
    }
}
