//! Run orchestration.
//!
//! A run enumerates the source roots and the destination, pairs the two
//! ordered lists, decides every pair on the calling thread and then executes
//! the decisions:
//!
//! 1. deletions scheduled before transfers;
//! 2. directories, symlinks and unchanged entries in path order on the
//!    calling thread, regular files on the worker pool, with results reported
//!    in path order;
//! 3. deletions scheduled after transfers;
//! 4. directory modification times restored from the source.
//!
//! In a dry run every step computes and reports exactly the same outcome but
//! the destination is never modified.

use std::fs;
use std::io;
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bandwidth::SharedLimiter;
use filetime::FileTime;
use filters::FilterPredicate;
use flist::{EntryKind, EntryPair, FileEntry, FileList, ScanFailure, pair_entries};
use logging::{trace_copy, trace_del, trace_flist, warn_entry};

use crate::change::{AttributeChanges, ChangeRecord};
use crate::compare::{Decision, decide, system_time_within_window};
use crate::deletion::{Deletion, children_first, remove_entry, remove_existing_destination};
use crate::error::{PARTIAL_TRANSFER_EXIT_CODE, SUCCESS_EXIT_CODE, SyncError};
use crate::observer::SyncObserver;
use crate::options::{DeleteTiming, SyncOptions};
use crate::pool::{CancellationToken, Submitter, WorkerPool};
use crate::stats::{RunStats, StatsAggregator};
use crate::transfer::{FileTask, TransferContext, transfer_file};

/// Executes synchronisation runs under one set of options.
///
/// ```no_run
/// use std::path::{Path, PathBuf};
/// use std::sync::Arc;
/// use engine::{CollectingObserver, StatsAggregator, SyncOptions, SyncSession};
/// use filters::FilterSet;
///
/// let options = SyncOptions::builder().itemize(true).build()?;
/// let session = SyncSession::new(options, Arc::new(StatsAggregator::new()), None);
/// let mut observer = CollectingObserver::new();
/// let summary = session.run(
///     &[PathBuf::from("src")],
///     Path::new("dst"),
///     &FilterSet::default(),
///     &mut observer,
/// )?;
/// println!("{} files transferred", summary.stats().files_transferred);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct SyncSession {
    options: SyncOptions,
    stats: Arc<StatsAggregator>,
    limiter: Option<SharedLimiter>,
    cancellation: CancellationToken,
}

impl SyncSession {
    /// Creates a session. When no limiter is supplied and the options carry
    /// a bandwidth limit, the session creates its own.
    #[must_use]
    pub fn new(
        options: SyncOptions,
        stats: Arc<StatsAggregator>,
        limiter: Option<SharedLimiter>,
    ) -> Self {
        let limiter = limiter.or_else(|| options.bandwidth_limit().map(SharedLimiter::new));
        Self {
            options,
            stats,
            limiter,
            cancellation: CancellationToken::new(),
        }
    }

    /// Replaces the cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Token that cancels runs of this session.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Options in effect.
    #[must_use]
    pub const fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Shared statistics aggregator.
    #[must_use]
    pub const fn stats(&self) -> &Arc<StatsAggregator> {
        &self.stats
    }

    /// Synchronises `destination` from `source_roots`.
    ///
    /// Entries of later roots replace entries of earlier roots with the same
    /// relative path. Recoverable per-entry failures are reported to
    /// `observer` and counted; the run continues. Fatal failures stop the
    /// run and are returned after in-flight work has finished.
    pub fn run(
        &self,
        source_roots: &[PathBuf],
        destination: &Path,
        filter: &dyn FilterPredicate,
        observer: &mut dyn SyncObserver,
    ) -> Result<RunSummary, SyncError> {
        let started = Instant::now();
        if source_roots.is_empty() {
            return Err(SyncError::configuration("at least one source root is required"));
        }
        self.check_cancelled()?;

        let plan = self.plan(source_roots, destination, filter)?;
        let mut reporter = Reporter::new(observer, &self.stats);
        for failure in &plan.failures {
            reporter.deliver(EntryResult::unreadable(failure));
        }

        if self.options.delete() == Some(DeleteTiming::Before) {
            self.delete_batch(plan.deletions(), &mut reporter)?;
        }
        self.transfer_phase(&plan, &mut reporter)?;
        if self.options.delete() == Some(DeleteTiming::After) {
            self.delete_batch(plan.deletions(), &mut reporter)?;
        }
        self.restore_directory_times(&plan, &mut reporter);

        Ok(RunSummary {
            stats: self.stats.snapshot(),
            elapsed: started.elapsed(),
        })
    }

    fn check_cancelled(&self) -> Result<(), SyncError> {
        if self.cancellation.is_cancelled() {
            Err(SyncError::cancelled())
        } else {
            Ok(())
        }
    }

    fn plan(
        &self,
        source_roots: &[PathBuf],
        destination: &Path,
        filter: &dyn FilterPredicate,
    ) -> Result<Plan, SyncError> {
        let mut lists = Vec::with_capacity(source_roots.len());
        for root in source_roots {
            let list =
                FileList::from_root(root, filter).map_err(|error| SyncError::enumeration(root, error))?;
            lists.push(list);
        }
        let mut source = FileList::overlay(lists);
        let mut existing = FileList::from_destination_root(destination, filter)
            .map_err(|error| SyncError::enumeration(destination, error))?;

        if self.options.checksum() {
            source = source.with_checksums(self.options.checksum_choice());
            existing = existing.with_checksums(self.options.checksum_choice());
        }

        let unreadable_sources = source.failures().to_vec();
        let mut failures = unreadable_sources.clone();
        failures.extend_from_slice(existing.failures());

        self.stats.record_file_list(source.serialized_size());
        for entry in source.entries() {
            self.stats.record_considered(entry.kind(), entry.size());
        }

        if !self.options.dry_run() {
            fs::create_dir_all(destination).map_err(|error| {
                SyncError::root_io("create destination directory", destination, error)
            })?;
        }

        let items: Vec<PlannedEntry> = pair_entries(source.into_entries(), existing.into_entries())
            .into_iter()
            .map(|pair| {
                let mut decision = decide(&pair, &self.options);
                if decision == Decision::Delete
                    && unreadable_sources
                        .iter()
                        .any(|failure| failure.covers(pair.path()))
                {
                    trace_del!("keeping {}: source side unreadable", pair.path().display());
                    decision = Decision::Skip;
                }
                PlannedEntry {
                    decision,
                    target: destination.join(pair.path()),
                    pair,
                }
            })
            .collect();
        trace_flist!(
            "{} entries planned for {}",
            items.len(),
            destination.display()
        );
        Ok(Plan { items, failures })
    }

    fn delete_batch(
        &self,
        batch: Vec<Deletion>,
        reporter: &mut Reporter<'_>,
    ) -> Result<(), SyncError> {
        for deletion in children_first(batch) {
            self.check_cancelled()?;
            reporter.deliver(self.delete_one(&deletion));
        }
        reporter.take_fatal()
    }

    fn delete_one(&self, deletion: &Deletion) -> EntryResult {
        EntryResult {
            record: ChangeRecord::deleted(&deletion.relative, deletion.kind),
            outcome: remove_entry(deletion, self.options.dry_run()),
        }
    }

    fn transfer_phase(&self, plan: &Plan, reporter: &mut Reporter<'_>) -> Result<(), SyncError> {
        let pool = WorkerPool::new(self.options.workers())?;
        let context = TransferContext {
            options: &self.options,
            stats: &self.stats,
            limiter: self.limiter.as_ref(),
        };
        let during = self.options.delete() == Some(DeleteTiming::During);
        let mut cancelled = false;

        pool.run(|submitter| {
            let mut pending: Vec<Deletion> = Vec::new();
            for item in &plan.items {
                if self.cancellation.is_cancelled() {
                    cancelled = true;
                    break;
                }
                if reporter.has_fatal() {
                    break;
                }

                if item.decision == Decision::Delete {
                    if during && let Some(entry) = item.pair.destination() {
                        pending.push(Deletion::from(entry));
                    }
                    continue;
                }
                for deletion in children_first(mem::take(&mut pending)) {
                    submitter.push_ready(self.delete_one(&deletion));
                }

                self.dispatch(item, context, submitter);
                for result in submitter.drain_ready() {
                    reporter.deliver(result);
                }
            }

            if !cancelled && !reporter.has_fatal() {
                for deletion in children_first(pending) {
                    submitter.push_ready(self.delete_one(&deletion));
                }
            }
            for result in submitter.finish() {
                reporter.deliver(result);
            }
        });

        if cancelled {
            return Err(SyncError::cancelled());
        }
        reporter.take_fatal()
    }

    fn dispatch<'scope>(
        &self,
        item: &PlannedEntry,
        context: TransferContext<'scope>,
        submitter: &mut Submitter<'_, 'scope, EntryResult>,
    ) {
        let Some(source) = item.pair.source() else {
            return;
        };
        let existing = item.pair.destination();

        if item.decision == Decision::Skip {
            submitter.push_ready(EntryResult::ok(self.unchanged_record(source, existing)));
            return;
        }

        let replaced = existing.filter(|entry| entry.kind() != source.kind());
        if let Some(old) = replaced
            && !self.options.dry_run()
            && let Err(error) = remove_existing_destination(&item.target, old.kind())
        {
            submitter.push_ready(EntryResult::failed(source, error));
            return;
        }
        let created = existing.is_none() || replaced.is_some();

        match source.kind() {
            EntryKind::File => {
                let record = match existing {
                    Some(existing) if !created => ChangeRecord::updated(
                        source.path(),
                        EntryKind::File,
                        self.file_changes(source, existing),
                    ),
                    _ => ChangeRecord::created(source.path(), EntryKind::File),
                };
                let task = FileTask {
                    relative: source.path().to_path_buf(),
                    source: source.full_path().to_path_buf(),
                    destination: item.target.clone(),
                    mtime: source.mtime(),
                    delta: item.decision == Decision::TransferDelta && !created,
                };
                submitter.submit(move || EntryResult {
                    outcome: transfer_file(&task, context).map(drop),
                    record,
                });
            }
            EntryKind::Directory => {
                submitter.push_ready(self.create_directory(source, &item.target));
            }
            EntryKind::Symlink => {
                submitter.push_ready(self.replace_symlink(source, &item.target, created));
            }
            EntryKind::Device | EntryKind::Special => {
                warn_entry!(
                    "skipping non-regular file \"{}\"",
                    source.path().display()
                );
            }
        }
    }

    fn unchanged_record(&self, source: &FileEntry, existing: Option<&FileEntry>) -> ChangeRecord {
        let time_changed = source.kind().is_dir()
            && existing.is_some_and(|existing| {
                !system_time_within_window(
                    source.mtime(),
                    existing.mtime(),
                    self.options.modify_window(),
                )
            });
        ChangeRecord::unchanged(
            source.path(),
            source.kind(),
            AttributeChanges::none().with_time(time_changed),
        )
    }

    fn file_changes(&self, source: &FileEntry, existing: &FileEntry) -> AttributeChanges {
        AttributeChanges::none()
            .with_checksum(self.options.checksum() && source.checksum() != existing.checksum())
            .with_size(source.size() != existing.size())
            .with_time(!system_time_within_window(
                source.mtime(),
                existing.mtime(),
                self.options.modify_window(),
            ))
    }

    fn create_directory(&self, source: &FileEntry, target: &Path) -> EntryResult {
        let record = ChangeRecord::created(source.path(), EntryKind::Directory);
        if self.options.dry_run() {
            return EntryResult::ok(record);
        }
        match fs::create_dir(target) {
            Ok(()) => {
                trace_copy!("created directory {}", source.path().display());
                EntryResult::ok(record)
            }
            Err(error) if error.kind() == io::ErrorKind::AlreadyExists => EntryResult::ok(record),
            Err(error) => EntryResult::failed(source, SyncError::io("create directory", target, error)),
        }
    }

    fn replace_symlink(&self, source: &FileEntry, target: &Path, created: bool) -> EntryResult {
        let record = if created {
            ChangeRecord::created(source.path(), EntryKind::Symlink)
        } else {
            ChangeRecord::updated(
                source.path(),
                EntryKind::Symlink,
                AttributeChanges::none().with_checksum(true),
            )
        };
        let Some(link_target) = source.link_target() else {
            return EntryResult::failed(
                source,
                SyncError::io(
                    "read link",
                    source.full_path(),
                    io::Error::new(io::ErrorKind::InvalidData, "symbolic link without target"),
                ),
            );
        };
        if self.options.dry_run() {
            return EntryResult::ok(record);
        }

        if !created && let Err(error) = remove_existing_destination(target, EntryKind::Symlink) {
            return EntryResult::failed(source, error);
        }
        match create_symlink(link_target, target) {
            Ok(()) => {
                trace_copy!(
                    "{} -> {}",
                    source.path().display(),
                    link_target.display()
                );
                EntryResult::ok(record)
            }
            Err(error) => EntryResult::failed(source, SyncError::io("create symlink", target, error)),
        }
    }

    fn restore_directory_times(&self, plan: &Plan, reporter: &mut Reporter<'_>) {
        if self.options.dry_run() {
            return;
        }
        for item in plan.items.iter().rev() {
            let Some(source) = item.pair.source() else {
                continue;
            };
            if !source.kind().is_dir() {
                continue;
            }
            match filetime::set_file_mtime(&item.target, FileTime::from_system_time(source.mtime())) {
                Ok(()) => {}
                Err(error) if error.kind() == io::ErrorKind::NotFound => {}
                Err(error) => reporter.deliver(EntryResult::failed(
                    source,
                    SyncError::io("set modification time on", &item.target, error),
                )),
            }
        }
    }
}

/// Result of a completed run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    stats: RunStats,
    elapsed: Duration,
}

impl RunSummary {
    /// Final statistics.
    #[must_use]
    pub const fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Wall-clock duration of the run.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Returns `true` when at least one entry failed.
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.stats.entries_failed > 0
    }

    /// `0` for a clean run, `23` when entries failed.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.has_failures() {
            PARTIAL_TRANSFER_EXIT_CODE
        } else {
            SUCCESS_EXIT_CODE
        }
    }

    /// Transport throughput over the run.
    #[must_use]
    pub fn bytes_per_second(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();
        let bytes = self.stats.transport_bytes() as f64;
        if seconds > 0.0 { bytes / seconds } else { bytes }
    }
}

struct PlannedEntry {
    pair: EntryPair,
    decision: Decision,
    target: PathBuf,
}

struct Plan {
    items: Vec<PlannedEntry>,
    /// Entries that could not be enumerated on either side.
    failures: Vec<ScanFailure>,
}

impl Plan {
    fn deletions(&self) -> Vec<Deletion> {
        self.items
            .iter()
            .filter(|item| item.decision == Decision::Delete)
            .filter_map(|item| item.pair.destination())
            .map(Deletion::from)
            .collect()
    }
}

struct EntryResult {
    record: ChangeRecord,
    outcome: Result<(), SyncError>,
}

impl EntryResult {
    fn unreadable(failure: &ScanFailure) -> Self {
        Self {
            record: ChangeRecord::unchanged(
                failure.path(),
                failure.entry_kind().unwrap_or(EntryKind::File),
                AttributeChanges::none(),
            ),
            outcome: Err(SyncError::io(
                failure.action(),
                failure.full_path(),
                failure.to_io_error(),
            )),
        }
    }

    const fn ok(record: ChangeRecord) -> Self {
        Self {
            record,
            outcome: Ok(()),
        }
    }

    fn failed(source: &FileEntry, error: SyncError) -> Self {
        Self {
            record: ChangeRecord::unchanged(source.path(), source.kind(), AttributeChanges::none()),
            outcome: Err(error),
        }
    }
}

/// Forwards results to the observer and statistics on the calling thread.
struct Reporter<'a> {
    observer: &'a mut dyn SyncObserver,
    stats: &'a StatsAggregator,
    fatal: Option<SyncError>,
}

impl<'a> Reporter<'a> {
    fn new(observer: &'a mut dyn SyncObserver, stats: &'a StatsAggregator) -> Self {
        Self {
            observer,
            stats,
            fatal: None,
        }
    }

    const fn has_fatal(&self) -> bool {
        self.fatal.is_some()
    }

    fn take_fatal(&mut self) -> Result<(), SyncError> {
        self.fatal.take().map_or(Ok(()), Err)
    }

    fn deliver(&mut self, result: EntryResult) {
        let EntryResult { record, outcome } = result;
        match outcome {
            Ok(()) => {
                self.observer.on_itemize(&record);
                if record.is_deletion() {
                    self.stats.record_deleted();
                    self.observer.on_delete(record.path());
                } else if record.is_created() {
                    self.stats.record_created();
                }
            }
            Err(error) if error.is_fatal() => {
                if self.fatal.is_none() {
                    self.fatal = Some(error);
                }
            }
            Err(error) => {
                warn_entry!("{}", error);
                self.stats.record_failed();
                self.observer.on_entry_error(record.path(), &error);
            }
        }
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn create_symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}
