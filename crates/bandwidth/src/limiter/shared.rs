use super::{BandwidthLimiter, LimiterSleep, sleep_for};
use logging::trace_io;
use std::num::NonZeroU64;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// A [`BandwidthLimiter`] shared by every worker of a run.
///
/// Cloning is cheap and every clone draws from the same budget.
#[derive(Clone, Debug)]
pub struct SharedLimiter {
    inner: Arc<Mutex<BandwidthLimiter>>,
}

impl SharedLimiter {
    /// Creates a limiter with the given byte-per-second rate.
    #[must_use]
    pub fn new(limit: NonZeroU64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BandwidthLimiter::new(limit))),
        }
    }

    /// Returns the configured rate.
    #[must_use]
    pub fn limit_bytes(&self) -> NonZeroU64 {
        self.lock().limit_bytes()
    }

    /// Bytes booked against the limiter by all clones.
    #[must_use]
    pub fn total_registered(&self) -> u64 {
        self.lock().total_registered()
    }

    /// Books `bytes` and blocks the calling thread until the run is back on
    /// schedule.
    pub fn consume(&self, bytes: usize) -> LimiterSleep {
        let delay = self.lock().schedule(bytes, Instant::now());
        if !delay.is_zero() {
            trace_io!("bandwidth limiter pausing {:?} after {} bytes", delay, bytes);
        }
        sleep_for(delay)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BandwidthLimiter> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
