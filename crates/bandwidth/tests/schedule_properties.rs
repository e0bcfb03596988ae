use bandwidth::{BandwidthLimiter, parse_bandwidth_limit};
use proptest::prelude::*;
use std::num::NonZeroU64;
use std::time::{Duration, Instant};

proptest! {
    #[test]
    fn burst_sleep_matches_cumulative_cost(
        rate in 512u64..1_000_000,
        writes in prop::collection::vec(1usize..65_536, 1..32),
    ) {
        let mut limiter = BandwidthLimiter::new(NonZeroU64::new(rate).unwrap());
        let now = Instant::now();
        let mut last = Duration::ZERO;
        let mut total = 0u128;
        for bytes in &writes {
            total += *bytes as u128;
            last = limiter.schedule(*bytes, now);
        }
        let expected_micros = total * 1_000_000 / u128::from(rate);
        let slack = writes.len() as u128;
        let actual = last.as_micros();
        if actual > 0 {
            prop_assert!(actual <= expected_micros);
            prop_assert!(actual + slack >= expected_micros);
        } else {
            prop_assert!(expected_micros < 100_000 + slack);
        }
        prop_assert_eq!(limiter.total_registered(), total as u64);
    }

    #[test]
    fn whole_kibibyte_values_round_trip(value in 1u64..4_000_000) {
        let parsed = parse_bandwidth_limit(&value.to_string()).unwrap();
        prop_assert_eq!(parsed.map(NonZeroU64::get), Some(value * 1024));
    }
}
