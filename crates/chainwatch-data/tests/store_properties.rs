//! 저장소 upsert 속성 테스트.

use chainwatch_core::{normalize_series, MetricKind, TimeSeriesPoint};
use chainwatch_data::Database;
use proptest::prelude::*;

fn points_strategy() -> impl Strategy<Value = Vec<TimeSeriesPoint>> {
    prop::collection::vec(
        (1_600_000_000i64..1_600_000_000 + 200 * 86_400, 0.0f64..1e12),
        0..40,
    )
    .prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(ts, v)| TimeSeriesPoint::new(ts, v))
            .collect()
    })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// 같은 시계열을 두 번 저장해도 결과가 같다.
    #[test]
    fn upsert_is_idempotent(points in points_strategy()) {
        let normalized = normalize_series(points);

        let (once, twice) = runtime().block_on(async {
            let store = Database::in_memory().await.unwrap().store();

            store.upsert_series("Aptos", MetricKind::Tvl, &normalized).await.unwrap();
            let once = store.read_series("Aptos", MetricKind::Tvl).await.unwrap();

            store.upsert_series("Aptos", MetricKind::Tvl, &normalized).await.unwrap();
            let twice = store.read_series("Aptos", MetricKind::Tvl).await.unwrap();

            (once, twice)
        });

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once, normalized);
    }

    /// 조회 결과는 항상 타임스탬프 오름차순이며 최신 타임스탬프는 마지막 포인트와 같다.
    #[test]
    fn read_is_ascending(points in points_strategy()) {
        let (series, latest) = runtime().block_on(async {
            let store = Database::in_memory().await.unwrap().store();
            let normalized = normalize_series(points);

            store.upsert_series("Optimism", MetricKind::Price, &normalized).await.unwrap();
            let series = store.read_series("Optimism", MetricKind::Price).await.unwrap();
            let latest = store.latest_timestamp("Optimism", MetricKind::Price).await.unwrap();
            (series, latest)
        });

        prop_assert!(series.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        prop_assert_eq!(latest, series.last().map(|p| p.timestamp));
    }
}
