//! 시계열 정규화 속성 테스트.

use chainwatch_core::{normalize_series, TimeSeriesPoint};
use proptest::prelude::*;

fn arb_points() -> impl Strategy<Value = Vec<TimeSeriesPoint>> {
    prop::collection::vec(
        (0i64..50, -1.0e6f64..1.0e6).prop_map(|(ts, v)| TimeSeriesPoint::new(ts, v)),
        0..64,
    )
}

proptest! {
    #[test]
    fn normalized_series_is_strictly_ascending(points in arb_points()) {
        let normalized = normalize_series(points);
        for pair in normalized.windows(2) {
            prop_assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[test]
    fn normalize_is_idempotent(points in arb_points()) {
        let once = normalize_series(points);
        let twice = normalize_series(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn last_write_wins_per_timestamp(points in arb_points()) {
        let normalized = normalize_series(points.clone());
        for point in &normalized {
            let last_input = points
                .iter()
                .rev()
                .find(|p| p.timestamp == point.timestamp)
                .unwrap();
            prop_assert_eq!(last_input.value, point.value);
        }
    }
}
