//! Bounded worker pool for per-file tasks.
//!
//! Tasks run on a dedicated rayon pool and report through a crossbeam
//! channel. The submitting thread keeps at most a fixed number of tasks in
//! flight and hands results back in submission order, whatever order the
//! workers finish in. A task that panics is caught on its worker and the
//! panic is resumed on the submitting thread when its result is collected.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, unbounded};
use rayon::{Scope, ThreadPool, ThreadPoolBuilder};

use crate::error::SyncError;

/// Tasks allowed in flight per worker.
const IN_FLIGHT_PER_WORKER: usize = 2;

/// Cooperative cancellation flag shared between a run and its caller.
///
/// Cancelling stops new tasks from starting; tasks already running finish.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Fixed-size pool of transfer workers.
pub(crate) struct WorkerPool {
    pool: ThreadPool,
    capacity: usize,
}

impl WorkerPool {
    pub(crate) fn new(workers: NonZeroUsize) -> Result<Self, SyncError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.get())
            .thread_name(|index| format!("dsync-worker-{index}"))
            .build()
            .map_err(SyncError::worker_pool)?;
        Ok(Self {
            pool,
            capacity: workers.get().saturating_mul(IN_FLIGHT_PER_WORKER),
        })
    }

    /// Runs `body` with a [`Submitter`] bound to this pool. All submitted
    /// tasks have finished when this returns.
    pub(crate) fn run<'scope, T, R>(
        &self,
        body: impl FnOnce(&mut Submitter<'_, 'scope, T>) -> R,
    ) -> R
    where
        T: Send + 'scope,
    {
        self.pool.in_place_scope(|scope| {
            let (sender, receiver) = unbounded();
            let mut submitter = Submitter {
                scope,
                sender,
                receiver,
                capacity: self.capacity,
                in_flight: 0,
                next_submit: 0,
                next_deliver: 0,
                ready: BTreeMap::new(),
            };
            body(&mut submitter)
        })
    }
}

/// Submits tasks to the pool and yields their results in order.
pub(crate) struct Submitter<'a, 'scope, T> {
    scope: &'a Scope<'scope>,
    sender: Sender<(usize, thread::Result<T>)>,
    receiver: Receiver<(usize, thread::Result<T>)>,
    capacity: usize,
    in_flight: usize,
    next_submit: usize,
    next_deliver: usize,
    ready: BTreeMap<usize, T>,
}

impl<'scope, T: Send + 'scope> Submitter<'_, 'scope, T> {
    /// Reserves the next sequence slot for a result produced outside the
    /// pool, keeping it ordered with pooled tasks.
    pub(crate) fn push_ready(&mut self, value: T) {
        let slot = self.next_submit;
        self.next_submit += 1;
        self.ready.insert(slot, value);
    }

    /// Starts `task` on the pool. Blocks while the in-flight limit is
    /// reached, collecting finished results meanwhile.
    pub(crate) fn submit<F>(&mut self, task: F)
    where
        F: FnOnce() -> T + Send + 'scope,
    {
        while self.in_flight >= self.capacity {
            self.receive_one();
        }
        let slot = self.next_submit;
        self.next_submit += 1;
        self.in_flight += 1;
        let sender = self.sender.clone();
        self.scope.spawn(move |_| {
            // The receiver outlives the scope; a send can only fail if the
            // submitter was dropped, in which case nobody wants the result.
            let _ = sender.send((slot, panic::catch_unwind(AssertUnwindSafe(task))));
        });
    }

    /// Returns every result that is next in sequence without blocking on
    /// unfinished tasks.
    pub(crate) fn drain_ready(&mut self) -> Vec<T> {
        while let Ok((slot, value)) = self.receiver.try_recv() {
            self.accept(slot, value);
        }
        self.take_in_order()
    }

    /// Waits for every outstanding task and returns the remaining results
    /// in order.
    pub(crate) fn finish(&mut self) -> Vec<T> {
        while self.in_flight > 0 {
            self.receive_one();
        }
        self.take_in_order()
    }

    fn receive_one(&mut self) {
        if let Ok((slot, value)) = self.receiver.recv() {
            self.accept(slot, value);
        }
    }

    fn accept(&mut self, slot: usize, value: thread::Result<T>) {
        self.in_flight -= 1;
        match value {
            Ok(value) => {
                self.ready.insert(slot, value);
            }
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    fn take_in_order(&mut self) -> Vec<T> {
        let mut delivered = Vec::new();
        while let Some(value) = self.ready.remove(&self.next_deliver) {
            delivered.push(value);
            self.next_deliver += 1;
        }
        delivered
    }
}
