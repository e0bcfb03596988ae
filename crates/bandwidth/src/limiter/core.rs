use super::{LimiterSleep, MICROS_PER_SECOND, MINIMUM_SLEEP, sleep_for};
use std::num::NonZeroU64;
use std::time::{Duration, Instant};

/// Token-bucket limiter driven by a virtual clock.
#[doc(alias = "--bwlimit")]
#[derive(Clone, Debug)]
pub struct BandwidthLimiter {
    limit_bytes: NonZeroU64,
    next_free: Option<Instant>,
    total_registered: u64,
}

impl BandwidthLimiter {
    /// Constructs a new limiter from the supplied byte-per-second rate.
    #[must_use]
    pub const fn new(limit: NonZeroU64) -> Self {
        Self {
            limit_bytes: limit,
            next_free: None,
            total_registered: 0,
        }
    }

    /// Returns the configured limit in bytes per second.
    #[must_use]
    pub const fn limit_bytes(&self) -> NonZeroU64 {
        self.limit_bytes
    }

    /// Total bytes registered since construction or the last reset.
    #[must_use]
    pub const fn total_registered(&self) -> u64 {
        self.total_registered
    }

    /// Resets the schedule while keeping the configured rate.
    pub fn reset(&mut self) {
        self.next_free = None;
        self.total_registered = 0;
    }

    /// Time needed to send `bytes` at the configured rate.
    fn cost(&self, bytes: usize) -> Duration {
        let micros =
            (bytes as u128).saturating_mul(MICROS_PER_SECOND) / u128::from(self.limit_bytes.get());
        Duration::from_micros(u64::try_from(micros).unwrap_or(u64::MAX))
    }

    /// Books `bytes` against the schedule as of `now` and returns how long the
    /// caller should sleep.
    ///
    /// Returns zero while the schedule is less than `MINIMUM_SLEEP` ahead of
    /// `now`.
    pub fn schedule(&mut self, bytes: usize, now: Instant) -> Duration {
        if bytes == 0 {
            return Duration::ZERO;
        }
        self.total_registered = self.total_registered.saturating_add(bytes as u64);

        let start = match self.next_free {
            Some(next) if next > now => next,
            _ => now,
        };
        let next = start + self.cost(bytes);
        self.next_free = Some(next);

        let ahead = next.saturating_duration_since(now);
        if ahead < MINIMUM_SLEEP {
            Duration::ZERO
        } else {
            ahead
        }
    }

    /// Records a completed write and sleeps if the writer is ahead of schedule.
    pub fn register(&mut self, bytes: usize) -> LimiterSleep {
        let requested = self.schedule(bytes, Instant::now());
        sleep_for(requested)
    }
}
