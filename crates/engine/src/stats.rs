//! Run statistics.
//!
//! [`StatsAggregator`] is shared by every worker through an `Arc` and
//! updated with relaxed atomic increments. [`StatsAggregator::snapshot`]
//! returns an immutable [`RunStats`] for reporting.

use std::sync::atomic::{AtomicU64, Ordering};

use flist::EntryKind;
use logging::trace_stats;

/// Thread-safe accumulator for one run.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    entries_considered: AtomicU64,
    regular_files: AtomicU64,
    total_file_size: AtomicU64,
    files_transferred: AtomicU64,
    entries_created: AtomicU64,
    entries_deleted: AtomicU64,
    entries_failed: AtomicU64,
    transferred_file_size: AtomicU64,
    literal_bytes: AtomicU64,
    matched_bytes: AtomicU64,
    file_list_size: AtomicU64,
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
}

impl StatsAggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one source entry. Regular files also add to the total size.
    pub fn record_considered(&self, kind: EntryKind, size: u64) {
        self.entries_considered.fetch_add(1, Ordering::Relaxed);
        if kind.is_file() {
            self.regular_files.fetch_add(1, Ordering::Relaxed);
            self.total_file_size.fetch_add(size, Ordering::Relaxed);
        }
    }

    /// Counts one regular file whose content was (or in a dry run would be)
    /// transferred.
    pub fn record_transferred(&self, source_bytes: u64, literal_bytes: u64, matched_bytes: u64) {
        self.files_transferred.fetch_add(1, Ordering::Relaxed);
        self.transferred_file_size
            .fetch_add(source_bytes, Ordering::Relaxed);
        self.literal_bytes.fetch_add(literal_bytes, Ordering::Relaxed);
        self.matched_bytes.fetch_add(matched_bytes, Ordering::Relaxed);
    }

    /// Adds to the transport byte counters.
    pub fn record_transport_bytes(&self, sent: u64, received: u64) {
        self.bytes_sent.fetch_add(sent, Ordering::Relaxed);
        self.bytes_received.fetch_add(received, Ordering::Relaxed);
    }

    /// Records the serialized size of the source file list. The list counts
    /// as sent data.
    pub fn record_file_list(&self, size: u64) {
        self.file_list_size.fetch_add(size, Ordering::Relaxed);
        self.bytes_sent.fetch_add(size, Ordering::Relaxed);
    }

    /// Counts an entry created on the destination.
    pub fn record_created(&self) {
        self.entries_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts an entry removed from the destination.
    pub fn record_deleted(&self) {
        self.entries_deleted.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts an entry that failed with a recoverable error.
    pub fn record_failed(&self) {
        self.entries_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> RunStats {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        let stats = RunStats {
            entries_considered: load(&self.entries_considered),
            regular_files: load(&self.regular_files),
            total_file_size: load(&self.total_file_size),
            files_transferred: load(&self.files_transferred),
            entries_created: load(&self.entries_created),
            entries_deleted: load(&self.entries_deleted),
            entries_failed: load(&self.entries_failed),
            transferred_file_size: load(&self.transferred_file_size),
            literal_bytes: load(&self.literal_bytes),
            matched_bytes: load(&self.matched_bytes),
            file_list_size: load(&self.file_list_size),
            bytes_sent: load(&self.bytes_sent),
            bytes_received: load(&self.bytes_received),
        };
        trace_stats!(
            considered = stats.entries_considered,
            transferred = stats.files_transferred,
            sent = stats.bytes_sent,
            received = stats.bytes_received,
            "statistics snapshot"
        );
        stats
    }
}

/// Immutable copy of the run counters.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunStats {
    /// Source entries considered.
    pub entries_considered: u64,
    /// Regular files among the considered entries.
    pub regular_files: u64,
    /// Sum of the sizes of all considered regular files.
    pub total_file_size: u64,
    /// Regular files whose content was transferred.
    pub files_transferred: u64,
    /// Entries created on the destination.
    pub entries_created: u64,
    /// Entries deleted from the destination.
    pub entries_deleted: u64,
    /// Entries that failed with a recoverable error.
    pub entries_failed: u64,
    /// Sum of the source sizes of transferred files.
    pub transferred_file_size: u64,
    /// Literal bytes emitted by the matcher.
    pub literal_bytes: u64,
    /// Bytes reused from destination blocks.
    pub matched_bytes: u64,
    /// Serialized size of the source file list.
    pub file_list_size: u64,
    /// Bytes sent to the receiver.
    pub bytes_sent: u64,
    /// Bytes received from the receiver.
    pub bytes_received: u64,
}

impl RunStats {
    /// Total bytes moved across the transport in both directions.
    #[must_use]
    pub const fn transport_bytes(&self) -> u64 {
        self.bytes_sent.saturating_add(self.bytes_received)
    }

    /// Transferred file size divided by transport bytes.
    ///
    /// Exactly `1.0` when no file content moved or nothing crossed the
    /// transport.
    #[must_use]
    pub fn speedup(&self) -> f64 {
        let transport = self.transport_bytes();
        if self.transferred_file_size == 0 || transport == 0 {
            return 1.0;
        }
        self.transferred_file_size as f64 / transport as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn considered_counts_sizes_of_files_only() {
        let stats = StatsAggregator::new();
        stats.record_considered(EntryKind::File, 100);
        stats.record_considered(EntryKind::Directory, 4096);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.entries_considered, 2);
        assert_eq!(snapshot.regular_files, 1);
        assert_eq!(snapshot.total_file_size, 100);
    }

    #[test]
    fn speedup_is_one_when_nothing_moves() {
        let stats = StatsAggregator::new();
        stats.record_file_list(40);
        assert!((stats.snapshot().speedup() - 1.0).abs() < f64::EPSILON);
        assert!((RunStats::default().speedup() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn speedup_divides_transferred_size_by_transport() {
        let stats = StatsAggregator::new();
        stats.record_transferred(1000, 10, 990);
        stats.record_transport_bytes(150, 100);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.transport_bytes(), 250);
        assert!((snapshot.speedup() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn file_list_counts_as_sent() {
        let stats = StatsAggregator::new();
        stats.record_file_list(21);
        stats.record_transport_bytes(4, 0);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.file_list_size, 21);
        assert_eq!(snapshot.bytes_sent, 25);
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let stats = Arc::new(StatsAggregator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        stats.record_transferred(2, 1, 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker");
        }
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.files_transferred, 8000);
        assert_eq!(snapshot.transferred_file_size, 16000);
        assert_eq!(
            snapshot.literal_bytes + snapshot.matched_bytes,
            snapshot.transferred_file_size
        );
    }
}
