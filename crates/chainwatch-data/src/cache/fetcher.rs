//! 캐시 우선 지표 제공자.
//!
//! 저장된 데이터가 24시간 이내면 네트워크를 사용하지 않고, 원격 조회가
//! 실패하면 저장된 데이터(비어 있을 수 있음)를 그대로 돌려줍니다.
//!
//! # 동작 흐름
//!
//! ```text
//! 요청 (entity, kind)
//!         │
//! ┌───────▼────────┐
//! │ 1. 최신 타임스탬프 │
//! └───────┬────────┘
//!     ┌───┴───┐
//!     │ 신선?  │── YES ──▶ 저장소에서 반환 (비어 있으면 2로)
//!     └───┬───┘
//!         │ NO
//! ┌───────▼────────┐
//! │ 2. 원격 소스 조회 │
//! └───────┬────────┘
//!    성공 │ 실패
//!         │   └──▶ 경고 로그 후 저장된 데이터로 fallback
//!         ▼
//!   정규화 → upsert → 반환
//! ```

use crate::cache::freshness::FreshnessPolicy;
use crate::error::{DataError, Result};
use crate::provider::MetricSource;
use crate::storage::sqlite::MetricStore;
use chainwatch_core::{normalize_series, MetricKind, TimeSeriesPoint, TrackedEntity};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn, Instrument};

/// 조회 결과의 출처.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// 신선한 저장 데이터
    Cache,
    /// 원격 소스에서 새로 가져옴
    Remote,
    /// 원격 실패로 저장 데이터 사용
    Fallback,
}

/// 지표 조회 결과.
///
/// 원격 실패는 오류가 아니라 `Fallback`으로 표현되며, 실패 원인을 함께 보관합니다.
#[derive(Debug)]
pub enum FetchOutcome {
    Cached(Vec<TimeSeriesPoint>),
    Fetched(Vec<TimeSeriesPoint>),
    Fallback {
        points: Vec<TimeSeriesPoint>,
        error: DataError,
    },
}

impl FetchOutcome {
    pub fn points(&self) -> &[TimeSeriesPoint] {
        match self {
            FetchOutcome::Cached(points) | FetchOutcome::Fetched(points) => points,
            FetchOutcome::Fallback { points, .. } => points,
        }
    }

    pub fn into_points(self) -> Vec<TimeSeriesPoint> {
        match self {
            FetchOutcome::Cached(points) | FetchOutcome::Fetched(points) => points,
            FetchOutcome::Fallback { points, .. } => points,
        }
    }

    pub fn source(&self) -> FetchSource {
        match self {
            FetchOutcome::Cached(_) => FetchSource::Cache,
            FetchOutcome::Fetched(_) => FetchSource::Remote,
            FetchOutcome::Fallback { .. } => FetchSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, FetchOutcome::Fallback { .. })
    }
}

/// 캐시 우선 지표 제공자.
#[derive(Clone)]
pub struct CachedMetricProvider {
    store: MetricStore,
    tvl_source: Arc<dyn MetricSource>,
    price_source: Arc<dyn MetricSource>,
    policy: FreshnessPolicy,
}

impl CachedMetricProvider {
    pub fn new(
        store: MetricStore,
        tvl_source: Arc<dyn MetricSource>,
        price_source: Arc<dyn MetricSource>,
    ) -> Self {
        Self {
            store,
            tvl_source,
            price_source,
            policy: FreshnessPolicy::default(),
        }
    }

    /// 신선도 정책 변경.
    pub fn with_policy(mut self, policy: FreshnessPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &MetricStore {
        &self.store
    }

    pub fn policy(&self) -> FreshnessPolicy {
        self.policy
    }

    fn source_for(&self, kind: MetricKind) -> &Arc<dyn MetricSource> {
        match kind {
            MetricKind::Tvl => &self.tvl_source,
            MetricKind::Price => &self.price_source,
        }
    }

    /// 현재 시각 기준으로 지표 조회.
    pub async fn fetch_metric(&self, entity: &TrackedEntity, kind: MetricKind) -> Result<FetchOutcome> {
        self.fetch_metric_at(entity, kind, Utc::now().timestamp()).await
    }

    /// 주어진 시각 기준으로 지표 조회.
    ///
    /// 저장소 오류만 `Err`로 전파됩니다.
    pub async fn fetch_metric_at(
        &self,
        entity: &TrackedEntity,
        kind: MetricKind,
        now: i64,
    ) -> Result<FetchOutcome> {
        let span = chainwatch_core::metric_span!(entity.name, kind);

        async move {
            let latest = self.store.latest_timestamp(&entity.name, kind).await?;

            if self.policy.is_fresh(latest, now) {
                let points = self.store.read_series(&entity.name, kind).await?;
                if !points.is_empty() {
                    debug!(count = points.len(), "신선한 저장 데이터 사용");
                    return Ok(FetchOutcome::Cached(points));
                }
            }

            match self.source_for(kind).fetch_series(entity).await {
                Ok(raw) => {
                    let points = normalize_series(raw);
                    self.store.upsert_series(&entity.name, kind, &points).await?;
                    debug!(count = points.len(), "원격 데이터 저장");
                    Ok(FetchOutcome::Fetched(points))
                }
                Err(error) => {
                    let points = self.store.read_series(&entity.name, kind).await?;
                    warn!(
                        source = kind.source_name(),
                        error = %error,
                        stored = points.len(),
                        "원격 조회 실패, 저장된 데이터로 대체"
                    );
                    Ok(FetchOutcome::Fallback { points, error })
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::Database;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 호출 횟수를 세는 테스트용 소스.
    struct StubSource {
        kind: MetricKind,
        /// 성공 시 시계열, 실패 시 HTTP 상태 코드
        response: std::result::Result<Vec<TimeSeriesPoint>, u16>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn ok(kind: MetricKind, points: Vec<TimeSeriesPoint>) -> Arc<Self> {
            Arc::new(Self {
                kind,
                response: Ok(points),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(kind: MetricKind, status: u16) -> Arc<Self> {
            Arc::new(Self {
                kind,
                response: Err(status),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MetricSource for StubSource {
        fn kind(&self) -> MetricKind {
            self.kind
        }

        async fn fetch_series(&self, _entity: &TrackedEntity) -> Result<Vec<TimeSeriesPoint>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Ok(points) => Ok(points.clone()),
                Err(status) => Err(DataError::HttpStatus {
                    status: *status,
                    url: "http://stub".into(),
                }),
            }
        }
    }

    fn flow() -> TrackedEntity {
        TrackedEntity::new("Flow", "flow", "flow")
    }

    fn sei() -> TrackedEntity {
        TrackedEntity::new("Sei", "sei", "sei-network")
    }

    async fn provider_with(
        tvl: Arc<StubSource>,
        price: Arc<StubSource>,
    ) -> CachedMetricProvider {
        let store = Database::in_memory().await.unwrap().store();
        CachedMetricProvider::new(store, tvl, price)
    }

    #[tokio::test]
    async fn test_fetch_then_cache_hit() {
        let tvl = StubSource::ok(
            MetricKind::Tvl,
            vec![
                TimeSeriesPoint::new(1_700_086_400, 110.0),
                TimeSeriesPoint::new(1_700_000_000, 100.0),
            ],
        );
        let price = StubSource::ok(MetricKind::Price, vec![]);
        let provider = provider_with(tvl.clone(), price).await;

        let now = 1_700_090_000;
        let first = provider.fetch_metric_at(&flow(), MetricKind::Tvl, now).await.unwrap();
        assert_eq!(first.source(), FetchSource::Remote);
        assert_eq!(
            first.points(),
            &[
                TimeSeriesPoint::new(1_700_000_000, 100.0),
                TimeSeriesPoint::new(1_700_086_400, 110.0),
            ]
        );
        assert_eq!(
            provider.store().latest_timestamp("Flow", MetricKind::Tvl).await.unwrap(),
            Some(1_700_086_400)
        );

        // 최신 포인트가 24시간 이내이므로 네트워크 호출 없음
        let second = provider
            .fetch_metric_at(&flow(), MetricKind::Tvl, now + 3_600)
            .await
            .unwrap();
        assert_eq!(second.source(), FetchSource::Cache);
        assert_eq!(second.points(), first.points());
        assert_eq!(tvl.calls(), 1);
    }

    #[tokio::test]
    async fn test_stale_data_refetched() {
        let tvl = StubSource::ok(MetricKind::Tvl, vec![TimeSeriesPoint::new(1_700_000_000, 1.0)]);
        let price = StubSource::ok(MetricKind::Price, vec![]);
        let provider = provider_with(tvl.clone(), price).await;

        let now = 1_700_000_000 + 86_400;
        provider.fetch_metric_at(&flow(), MetricKind::Tvl, now).await.unwrap();
        let again = provider.fetch_metric_at(&flow(), MetricKind::Tvl, now).await.unwrap();

        assert_eq!(again.source(), FetchSource::Remote);
        assert_eq!(tvl.calls(), 2);
    }

    #[tokio::test]
    async fn test_fallback_to_stale_data() {
        let tvl = StubSource::ok(MetricKind::Tvl, vec![]);
        let price = StubSource::failing(MetricKind::Price, 500);
        let provider = provider_with(tvl, price.clone()).await;

        let now = 1_700_200_000;
        let stale = TimeSeriesPoint::new(now - 2 * 86_400, 0.42);
        provider
            .store()
            .upsert_series("Sei", MetricKind::Price, &[stale])
            .await
            .unwrap();

        let outcome = provider.fetch_metric_at(&sei(), MetricKind::Price, now).await.unwrap();

        assert!(outcome.is_fallback());
        assert_eq!(price.calls(), 1);
        let stored = provider.store().read_series("Sei", MetricKind::Price).await.unwrap();
        assert_eq!(outcome.points(), stored.as_slice());
        match outcome {
            FetchOutcome::Fallback { points, error } => {
                assert_eq!(points, vec![stale]);
                assert!(matches!(error, DataError::HttpStatus { status: 500, .. }));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fallback_without_stored_data_is_empty() {
        let tvl = StubSource::failing(MetricKind::Tvl, 503);
        let price = StubSource::ok(MetricKind::Price, vec![]);
        let provider = provider_with(tvl, price).await;

        let outcome = provider
            .fetch_metric_at(&sei(), MetricKind::Tvl, 1_700_000_000)
            .await
            .unwrap();

        assert!(outcome.is_fallback());
        assert!(outcome.into_points().is_empty());
    }

    #[tokio::test]
    async fn test_routes_by_metric_kind() {
        let tvl = StubSource::ok(MetricKind::Tvl, vec![TimeSeriesPoint::new(10, 1.0)]);
        let price = StubSource::ok(MetricKind::Price, vec![TimeSeriesPoint::new(20, 2.0)]);
        let provider = provider_with(tvl.clone(), price.clone()).await;

        let outcome = provider
            .fetch_metric_at(&flow(), MetricKind::Price, 1_700_000_000)
            .await
            .unwrap();

        assert_eq!(outcome.points(), &[TimeSeriesPoint::new(20, 2.0)]);
        assert_eq!(tvl.calls(), 0);
        assert_eq!(price.calls(), 1);
        assert!(provider
            .store()
            .read_series("Flow", MetricKind::Tvl)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_storage_error_propagates() {
        let tvl = StubSource::ok(MetricKind::Tvl, vec![]);
        let price = StubSource::ok(MetricKind::Price, vec![]);
        let db = Database::in_memory().await.unwrap();
        let provider = CachedMetricProvider::new(db.store(), tvl.clone(), price);

        db.close().await;

        let err = provider
            .fetch_metric_at(&flow(), MetricKind::Tvl, 1_700_000_000)
            .await
            .unwrap_err();
        assert!(err.is_storage());
        assert_eq!(tvl.calls(), 0);
    }
}
