use std::time::Duration;

/// Result returned by the limiters describing how long the caller slept.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[must_use]
pub struct LimiterSleep {
    requested: Duration,
    actual: Duration,
}

impl LimiterSleep {
    /// Constructs a new record from the requested and actual durations.
    pub const fn new(requested: Duration, actual: Duration) -> Self {
        Self { requested, actual }
    }

    /// Returns the amount of time the limiter asked the caller to sleep.
    #[must_use]
    pub const fn requested(&self) -> Duration {
        self.requested
    }

    /// Returns the time actually spent sleeping.
    #[must_use]
    pub const fn actual(&self) -> Duration {
        self.actual
    }

    /// Returns `true` when the limiter skipped sleeping altogether.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.requested.is_zero() && self.actual.is_zero()
    }
}

/// Sleeps for `duration` and reports the outcome.
pub(crate) fn sleep_for(duration: Duration) -> LimiterSleep {
    if duration.is_zero() {
        return LimiterSleep::default();
    }
    let start = std::time::Instant::now();
    std::thread::sleep(duration);
    LimiterSleep::new(duration, start.elapsed())
}
