//! 메모리 스냅샷.
//!
//! 갱신 사이클이 끝날 때 완성된 스냅샷을 한 번에 교체합니다.
//! 읽는 쪽은 `Arc`를 복제해 가져가므로 이전 사이클과 새 사이클의 데이터가
//! 섞여 보이지 않습니다.

use chainwatch_core::{MetricKind, SeriesSummary, TimeSeriesPoint, TrackedEntity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 지표 하나의 시계열과 요약.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricSnapshot {
    pub points: Vec<TimeSeriesPoint>,
    pub summary: Option<SeriesSummary>,
}

impl MetricSnapshot {
    pub fn from_points(points: Vec<TimeSeriesPoint>) -> Self {
        let summary = SeriesSummary::from_series(&points);
        Self { points, summary }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// 체인 하나의 스냅샷.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySnapshot {
    pub entity: TrackedEntity,
    pub tvl: MetricSnapshot,
    pub price: MetricSnapshot,
}

impl EntitySnapshot {
    pub fn new(entity: TrackedEntity, tvl: Vec<TimeSeriesPoint>, price: Vec<TimeSeriesPoint>) -> Self {
        Self {
            entity,
            tvl: MetricSnapshot::from_points(tvl),
            price: MetricSnapshot::from_points(price),
        }
    }

    pub fn metric(&self, kind: MetricKind) -> &MetricSnapshot {
        match kind {
            MetricKind::Tvl => &self.tvl,
            MetricKind::Price => &self.price,
        }
    }
}

/// 전체 체인 스냅샷.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheSnapshot {
    /// 설정 순서대로 정렬된 체인별 스냅샷
    pub entities: Vec<EntitySnapshot>,
    /// 마지막 갱신 완료 시각
    pub last_refreshed: Option<DateTime<Utc>>,
}

impl CacheSnapshot {
    pub fn new(entities: Vec<EntitySnapshot>, last_refreshed: Option<DateTime<Utc>>) -> Self {
        Self {
            entities,
            last_refreshed,
        }
    }

    /// 이름 또는 소스 식별자로 체인 검색 (대소문자 무시).
    pub fn find(&self, key: &str) -> Option<&EntitySnapshot> {
        self.entities.iter().find(|e| e.entity.matches(key))
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// 공유 스냅샷 핸들.
///
/// 복제해도 같은 스냅샷을 가리킵니다.
#[derive(Clone, Default)]
pub struct SnapshotHandle {
    inner: Arc<RwLock<Arc<CacheSnapshot>>>,
}

impl SnapshotHandle {
    pub fn new(initial: CacheSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// 현재 스냅샷.
    pub async fn load(&self) -> Arc<CacheSnapshot> {
        self.inner.read().await.clone()
    }

    /// 새 스냅샷으로 교체.
    pub async fn publish(&self, snapshot: CacheSnapshot) {
        let next = Arc::new(snapshot);
        *self.inner.write().await = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generation(gen: u32) -> CacheSnapshot {
        let entities = ["Aptos", "Flow", "Sei"]
            .iter()
            .map(|name| {
                let entity = TrackedEntity::new(*name, name.to_lowercase(), name.to_lowercase());
                let points = vec![TimeSeriesPoint::new(gen as i64, gen as f64)];
                EntitySnapshot::new(entity, points.clone(), points)
            })
            .collect();
        CacheSnapshot::new(entities, None)
    }

    #[tokio::test]
    async fn test_publish_replaces() {
        let handle = SnapshotHandle::default();
        assert!(handle.load().await.is_empty());

        let before = handle.load().await;
        handle.publish(generation(1)).await;

        // 이미 가져간 스냅샷은 바뀌지 않음
        assert!(before.is_empty());
        assert_eq!(handle.load().await.entities.len(), 3);
    }

    #[tokio::test]
    async fn test_find_by_any_identifier() {
        let mut snapshot = generation(1);
        snapshot.entities.push(EntitySnapshot::new(
            TrackedEntity::new("XRP/XRPL", "XRPL", "ripple"),
            vec![],
            vec![],
        ));

        assert!(snapshot.find("flow").is_some());
        assert_eq!(snapshot.find("RIPPLE").unwrap().entity.name, "XRP/XRPL");
        assert!(snapshot.find("bitcoin").is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_never_see_mixed_generations() {
        let handle = SnapshotHandle::new(generation(0));

        let writer = {
            let handle = handle.clone();
            tokio::spawn(async move {
                for gen in 1..=200 {
                    handle.publish(generation(gen)).await;
                    tokio::task::yield_now().await;
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let handle = handle.clone();
                tokio::spawn(async move {
                    for _ in 0..500 {
                        let snapshot = handle.load().await;
                        let first = snapshot.entities[0].tvl.points[0].value;
                        for entity in &snapshot.entities {
                            assert_eq!(entity.tvl.points[0].value, first);
                            assert_eq!(entity.price.points[0].value, first);
                        }
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }

        assert_eq!(handle.load().await.entities[0].tvl.points[0].value, 200.0);
    }

    #[test]
    fn test_metric_by_kind() {
        let entry = EntitySnapshot::new(
            TrackedEntity::new("Flow", "flow", "flow"),
            vec![TimeSeriesPoint::new(1, 10.0)],
            vec![TimeSeriesPoint::new(1, 0.5), TimeSeriesPoint::new(2, 0.6)],
        );

        assert_eq!(entry.metric(MetricKind::Tvl).points.len(), 1);
        assert_eq!(entry.metric(MetricKind::Price).summary.unwrap().current, 0.6);
    }

    #[test]
    fn test_metric_snapshot_summary() {
        let metric = MetricSnapshot::from_points(vec![TimeSeriesPoint::new(1, 5.0)]);
        assert_eq!(metric.summary.unwrap().current, 5.0);
        assert!(MetricSnapshot::from_points(vec![]).summary.is_none());
    }
}
