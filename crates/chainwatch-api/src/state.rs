//! 애플리케이션 상태 관리.
//!
//! 모든 API 핸들러에서 공유되는 상태를 정의합니다.

use chainwatch_collector::{CacheSnapshot, Refresher, SnapshotHandle};
use chainwatch_data::Database;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// 애플리케이션 상태.
#[derive(Clone)]
pub struct AppState {
    /// 데이터베이스 (헬스 체크용)
    pub db: Database,
    /// 갱신 오케스트레이터 (수동 갱신, 체인 목록)
    pub refresher: Arc<Refresher>,
    /// 서버 시작 시간
    pub started_at: DateTime<Utc>,
    /// API 버전
    pub version: String,
}

impl AppState {
    pub fn new(db: Database, refresher: Arc<Refresher>) -> Self {
        Self {
            db,
            refresher,
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 공유 스냅샷 핸들.
    pub fn snapshot(&self) -> &SnapshotHandle {
        self.refresher.snapshot()
    }

    /// 현재 스냅샷.
    pub async fn current_snapshot(&self) -> Arc<CacheSnapshot> {
        self.snapshot().load().await
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        self.db.ping().await
    }
}

/// 테스트용 상태 생성.
///
/// 메모리 DB와 고정 시계열을 반환하는 소스를 사용합니다.
#[cfg(test)]
pub async fn create_test_state() -> AppState {
    create_test_state_with_latency(std::time::Duration::ZERO).await
}

/// 원격 응답마다 `latency`만큼 지연되는 소스를 쓰는 테스트용 상태.
#[cfg(test)]
pub async fn create_test_state_with_latency(latency: std::time::Duration) -> AppState {
    use async_trait::async_trait;
    use chainwatch_core::{MetricKind, TimeSeriesPoint, TrackedChains, TrackedEntity};
    use chainwatch_data::{CachedMetricProvider, MetricSource};
    use std::time::Duration;

    struct FixedSource {
        kind: MetricKind,
        latency: Duration,
    }

    #[async_trait]
    impl MetricSource for FixedSource {
        fn kind(&self) -> MetricKind {
            self.kind
        }

        async fn fetch_series(
            &self,
            _entity: &TrackedEntity,
        ) -> chainwatch_data::Result<Vec<TimeSeriesPoint>> {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            let now = Utc::now().timestamp();
            Ok(vec![
                TimeSeriesPoint::new(now - 86_400, 1.0),
                TimeSeriesPoint::new(now - 60, 2.0),
            ])
        }
    }

    let db = Database::in_memory().await.unwrap();
    let provider = CachedMetricProvider::new(
        db.store(),
        Arc::new(FixedSource {
            kind: MetricKind::Tvl,
            latency,
        }),
        Arc::new(FixedSource {
            kind: MetricKind::Price,
            latency,
        }),
    );
    let chains = TrackedChains::new(vec![
        TrackedEntity::new("Flow", "flow", "flow"),
        TrackedEntity::new("XRP/XRPL", "XRPL", "ripple"),
    ])
    .unwrap();
    let refresher = Refresher::new(provider, chains, SnapshotHandle::default())
        .with_request_delay(Duration::ZERO);

    AppState::new(db, Arc::new(refresher))
}
