use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use flist::FileListError;
use matching::DeltaError;
use signature::{SignatureError, SignatureLayoutError};

use crate::options::BuilderError;

/// Exit code for a clean run.
pub const SUCCESS_EXIT_CODE: i32 = 0;
/// Exit code for invalid options or unreadable configuration inputs.
pub const CONFIGURATION_EXIT_CODE: i32 = 1;
/// Exit code for run-level I/O failures such as an unreadable root.
pub const FILE_IO_EXIT_CODE: i32 = 11;
/// Exit code for a delta referencing blocks the basis does not have.
pub const PROTOCOL_EXIT_CODE: i32 = 12;
/// Exit code for an interrupted run.
pub const CANCELLED_EXIT_CODE: i32 = 20;
/// Exit code for a run that completed with per-entry failures.
pub const PARTIAL_TRANSFER_EXIT_CODE: i32 = 23;

/// How an error affects the rest of the run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorSeverity {
    /// The entry is marked failed and the run continues.
    Recoverable,
    /// The run stops; work already committed is kept.
    Fatal,
    /// The run never started.
    Configuration,
}

/// Error produced while planning or executing a synchronisation run.
#[derive(Debug)]
pub struct SyncError {
    kind: SyncErrorKind,
}

impl SyncError {
    fn new(kind: SyncErrorKind) -> Self {
        Self { kind }
    }

    /// Constructs a per-entry I/O error with action context.
    #[must_use]
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::new(SyncErrorKind::Io {
            action,
            path: path.into(),
            source,
        })
    }

    /// Constructs a run-level I/O error, for example when the destination
    /// root cannot be created.
    #[must_use]
    pub fn root_io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::new(SyncErrorKind::RootIo {
            action,
            path: path.into(),
            source,
        })
    }

    /// Constructs an error for a tree that could not be enumerated.
    #[must_use]
    pub fn enumeration(root: impl Into<PathBuf>, source: FileListError) -> Self {
        Self::new(SyncErrorKind::Enumeration {
            root: root.into(),
            source,
        })
    }

    /// Wraps invalid options.
    #[must_use]
    pub fn options(source: BuilderError) -> Self {
        Self::new(SyncErrorKind::Options(source))
    }

    /// Constructs a configuration error with a free-form message.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(SyncErrorKind::Configuration {
            message: message.into(),
        })
    }

    /// Wraps a signature generation failure for `path`.
    #[must_use]
    pub fn signature(path: impl Into<PathBuf>, source: SignatureError) -> Self {
        Self::new(SyncErrorKind::Signature {
            path: path.into(),
            source,
        })
    }

    /// Wraps a block layout failure for `path`.
    #[must_use]
    pub fn layout(path: impl Into<PathBuf>, source: SignatureLayoutError) -> Self {
        Self::new(SyncErrorKind::Layout {
            path: path.into(),
            source,
        })
    }

    /// Wraps a delta application failure. Corrupt deltas are fatal; I/O
    /// failures while applying are per-entry.
    #[must_use]
    pub fn delta(path: impl Into<PathBuf>, source: DeltaError) -> Self {
        let path = path.into();
        match source {
            DeltaError::Io(source) => Self::io("apply delta to", path, source),
            source => Self::new(SyncErrorKind::CorruptDelta { path, source }),
        }
    }

    /// Reconstructed content did not match the source digest.
    #[must_use]
    pub fn verification_failed(path: impl Into<PathBuf>) -> Self {
        Self::new(SyncErrorKind::VerificationFailed { path: path.into() })
    }

    /// The run was interrupted.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::new(SyncErrorKind::Cancelled)
    }

    /// The worker pool could not be started.
    #[must_use]
    pub fn worker_pool(source: rayon::ThreadPoolBuildError) -> Self {
        Self::new(SyncErrorKind::WorkerPool(source))
    }

    /// Classifies the error.
    #[must_use]
    pub const fn severity(&self) -> ErrorSeverity {
        match self.kind {
            SyncErrorKind::Io { .. }
            | SyncErrorKind::Signature { .. }
            | SyncErrorKind::Layout { .. }
            | SyncErrorKind::VerificationFailed { .. } => ErrorSeverity::Recoverable,
            SyncErrorKind::Options(_) | SyncErrorKind::Configuration { .. } => {
                ErrorSeverity::Configuration
            }
            SyncErrorKind::RootIo { .. }
            | SyncErrorKind::Enumeration { .. }
            | SyncErrorKind::CorruptDelta { .. }
            | SyncErrorKind::Cancelled
            | SyncErrorKind::WorkerPool(_) => ErrorSeverity::Fatal,
        }
    }

    /// Returns `true` when the run must stop.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self.severity(), ErrorSeverity::Recoverable)
    }

    /// Process exit status for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self.kind {
            SyncErrorKind::Options(_) | SyncErrorKind::Configuration { .. } => {
                CONFIGURATION_EXIT_CODE
            }
            SyncErrorKind::CorruptDelta { .. } => PROTOCOL_EXIT_CODE,
            SyncErrorKind::Cancelled => CANCELLED_EXIT_CODE,
            SyncErrorKind::RootIo { .. }
            | SyncErrorKind::Enumeration { .. }
            | SyncErrorKind::WorkerPool(_) => FILE_IO_EXIT_CODE,
            SyncErrorKind::Io { .. }
            | SyncErrorKind::Signature { .. }
            | SyncErrorKind::Layout { .. }
            | SyncErrorKind::VerificationFailed { .. } => PARTIAL_TRANSFER_EXIT_CODE,
        }
    }

    /// Path the error refers to, when there is one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.kind {
            SyncErrorKind::Io { path, .. }
            | SyncErrorKind::RootIo { path, .. }
            | SyncErrorKind::Signature { path, .. }
            | SyncErrorKind::Layout { path, .. }
            | SyncErrorKind::CorruptDelta { path, .. }
            | SyncErrorKind::VerificationFailed { path } => Some(path),
            SyncErrorKind::Enumeration { root, .. } => Some(root),
            SyncErrorKind::Options(_)
            | SyncErrorKind::Configuration { .. }
            | SyncErrorKind::Cancelled
            | SyncErrorKind::WorkerPool(_) => None,
        }
    }

    /// Provides access to the underlying error kind.
    #[must_use]
    pub fn kind(&self) -> &SyncErrorKind {
        &self.kind
    }

    /// Consumes the error and returns its kind.
    #[must_use]
    pub fn into_kind(self) -> SyncErrorKind {
        self.kind
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SyncErrorKind::Io {
                action,
                path,
                source,
            }
            | SyncErrorKind::RootIo {
                action,
                path,
                source,
            } => write!(f, "failed to {action} '{}': {source}", path.display()),
            SyncErrorKind::Enumeration { root, source } => {
                write!(f, "cannot enumerate '{}': {source}", root.display())
            }
            SyncErrorKind::Options(source) => write!(f, "{source}"),
            SyncErrorKind::Configuration { message } => f.write_str(message),
            SyncErrorKind::Signature { path, source } => {
                write!(f, "cannot build signature for '{}': {source}", path.display())
            }
            SyncErrorKind::Layout { path, source } => {
                write!(f, "cannot lay out blocks for '{}': {source}", path.display())
            }
            SyncErrorKind::CorruptDelta { path, source } => {
                write!(f, "corrupt delta for '{}': {source}", path.display())
            }
            SyncErrorKind::VerificationFailed { path } => write!(
                f,
                "'{}' failed verification after whole-file retry",
                path.display()
            ),
            SyncErrorKind::Cancelled => f.write_str("run cancelled"),
            SyncErrorKind::WorkerPool(source) => {
                write!(f, "cannot start transfer workers: {source}")
            }
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            SyncErrorKind::Io { source, .. } | SyncErrorKind::RootIo { source, .. } => Some(source),
            SyncErrorKind::Enumeration { source, .. } => Some(source),
            SyncErrorKind::Options(source) => Some(source),
            SyncErrorKind::Signature { source, .. } => Some(source),
            SyncErrorKind::Layout { source, .. } => Some(source),
            SyncErrorKind::CorruptDelta { source, .. } => Some(source),
            SyncErrorKind::WorkerPool(source) => Some(source),
            SyncErrorKind::Configuration { .. }
            | SyncErrorKind::VerificationFailed { .. }
            | SyncErrorKind::Cancelled => None,
        }
    }
}

/// Classification of synchronisation failures.
#[derive(Debug)]
pub enum SyncErrorKind {
    /// Filesystem interaction for one entry failed.
    Io {
        /// Action being performed.
        action: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// Filesystem interaction that the whole run depends on failed.
    RootIo {
        /// Action being performed.
        action: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// A source or destination tree could not be listed.
    Enumeration {
        /// Root of the tree.
        root: PathBuf,
        /// Underlying error.
        source: FileListError,
    },
    /// Options failed validation.
    Options(BuilderError),
    /// Some other configuration input was rejected.
    Configuration {
        /// Human readable reason.
        message: String,
    },
    /// The destination signature could not be produced.
    Signature {
        /// Destination file.
        path: PathBuf,
        /// Underlying error.
        source: SignatureError,
    },
    /// The destination could not be split into blocks.
    Layout {
        /// Destination file.
        path: PathBuf,
        /// Underlying error.
        source: SignatureLayoutError,
    },
    /// A delta referenced data outside the basis file.
    CorruptDelta {
        /// Destination file.
        path: PathBuf,
        /// Underlying error.
        source: DeltaError,
    },
    /// The written file did not match the source even after a retry.
    VerificationFailed {
        /// Destination file.
        path: PathBuf,
    },
    /// The run was cancelled.
    Cancelled,
    /// The worker pool failed to start.
    WorkerPool(rayon::ThreadPoolBuildError),
}
