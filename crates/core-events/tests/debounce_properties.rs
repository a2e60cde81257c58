//! Property tests for the trailing-edge debounce contract.

use core_events::Debouncer;
use proptest::prelude::*;
use std::time::{Duration, Instant};

proptest! {
    // Requests spaced closer than the delay fire exactly once with the last value.
    #[test]
    fn burst_fires_once_with_last(gaps in proptest::collection::vec(0u64..300, 1..20)) {
        let delay = Duration::from_millis(300);
        let t0 = Instant::now();
        let mut d = Debouncer::new(delay);
        let mut now = t0;
        let mut fired = Vec::new();
        for (i, gap) in gaps.iter().enumerate() {
            now += Duration::from_millis(*gap);
            if let Some(v) = d.poll(now) {
                fired.push(v);
            }
            d.schedule(i, now);
        }
        // Step through the quiet period a millisecond at a time.
        for _ in 0..=300 {
            now += Duration::from_millis(1);
            if let Some(v) = d.poll(now) {
                fired.push(v);
            }
        }
        prop_assert_eq!(fired, vec![gaps.len() - 1]);
    }
}
