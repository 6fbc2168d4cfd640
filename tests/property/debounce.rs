use std::time::{Duration, Instant};

use proptest::prelude::*;
use signalwatch::config::EngineSection;
use signalwatch::engine::SignalCore;
use signalwatch::Value;
use signalwatch_test_utils::batch;
use signalwatch_test_utils::builders::{GroupBuilder, SignalBuilder};

fn core_with(threshold: f64, timeout: Duration) -> SignalCore {
    let group = GroupBuilder::new("g", "act")
        .signal(
            SignalBuilder::new("n")
                .threshold(threshold)
                .timeout(timeout)
                .build(),
        )
        .build();
    SignalCore::new(vec![group], &EngineSection::default())
}

/// Readings at strictly increasing offsets from a fixed start.
fn readings() -> impl Strategy<Value = Vec<(i64, u64)>> {
    proptest::collection::vec((-1_000i64..1_000, 1u64..5_000), 1..40)
}

proptest! {
    #[test]
    fn zero_threshold_and_timeout_emit_every_reading(readings in readings()) {
        let mut core = core_with(0.0, Duration::ZERO);
        let start = Instant::now();
        let mut offset = 0;

        for (value, step) in readings {
            offset += step;
            let emissions = core.ingest_at(
                batch([("n", value)]),
                start + Duration::from_millis(offset),
            );
            prop_assert_eq!(emissions.len(), 1);
            prop_assert_eq!(emissions[0].values.get("n"), Some(&Value::Int(value)));
        }
    }

    #[test]
    fn long_timeout_emits_only_the_first_reading(readings in readings()) {
        let mut core = core_with(0.0, Duration::from_secs(24 * 3600));
        let start = Instant::now();
        let mut offset = 0;
        let mut emitted = 0;

        for (value, step) in readings {
            offset += step;
            emitted += core
                .ingest_at(batch([("n", value)]), start + Duration::from_millis(offset))
                .len();
        }

        prop_assert_eq!(emitted, 1);
    }

    #[test]
    fn consecutive_emissions_differ_by_at_least_threshold(
        readings in readings(),
        threshold in 0.0f64..200.0,
    ) {
        let mut core = core_with(threshold, Duration::ZERO);
        let start = Instant::now();
        let mut offset = 0;
        let mut last: Option<i64> = None;

        for (value, step) in readings {
            offset += step;
            let emissions = core.ingest_at(
                batch([("n", value)]),
                start + Duration::from_millis(offset),
            );
            prop_assert!(emissions.len() <= 1);
            if !emissions.is_empty() {
                if let Some(prev) = last {
                    prop_assert!(value.abs_diff(prev) as f64 >= threshold.trunc());
                }
                last = Some(value);
            }
            let state = core.state("n").map(|s| s.last_emitted_value.clone());
            prop_assert_eq!(state, Some(last.map(Value::Int)));
        }
    }
}
