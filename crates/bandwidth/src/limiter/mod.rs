use std::time::Duration;

mod core;
mod shared;
mod sleep;

pub use core::BandwidthLimiter;
pub use shared::SharedLimiter;
pub use sleep::LimiterSleep;

pub(super) use sleep::sleep_for;

pub(super) const MICROS_PER_SECOND: u128 = 1_000_000;
/// Writers may run this far ahead of the schedule before they sleep.
pub(super) const MINIMUM_SLEEP: Duration = Duration::from_millis(100);
