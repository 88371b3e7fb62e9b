//! 갱신 사이클 모듈.
//!
//! 체인 목록을 설정 순서대로 돌며 TVL과 가격을 조회하고, 사이클이 끝나면
//! 새 스냅샷을 한 번에 게시합니다.

use crate::error::CollectorError;
use crate::snapshot::{CacheSnapshot, EntitySnapshot, SnapshotHandle};
use crate::{CollectorConfig, CycleStats, Result};
use chainwatch_core::{MetricKind, TrackedChains};
use chainwatch_data::{
    CachedMetricProvider, CoinGeckoClient, Database, DefiLlamaClient, FetchSource,
    FreshnessPolicy, MetricStore,
};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::Instrument;

/// 시작 시 스냅샷을 채운 방식
#[derive(Debug, Clone, PartialEq)]
pub enum StartupMode {
    /// 최근 갱신 기록이 있어 저장소에서만 로드
    FromStore,
    /// 갱신 사이클 실행
    Refreshed(CycleStats),
}

/// 갱신 오케스트레이터
pub struct Refresher {
    provider: CachedMetricProvider,
    chains: TrackedChains,
    snapshot: SnapshotHandle,
    /// 네트워크를 사용한 체인 다음에 쉬는 시간
    request_delay: Duration,
    /// 이보다 최근에 갱신됐으면 시작 시 네트워크를 사용하지 않음
    startup_max_age: Duration,
    /// 한 번에 하나의 사이클만 실행
    cycle_lock: Mutex<()>,
    /// 시작한 사이클 수 (로그의 `cycle` 필드)
    cycles: AtomicU64,
}

impl Refresher {
    pub fn new(provider: CachedMetricProvider, chains: TrackedChains, snapshot: SnapshotHandle) -> Self {
        Self {
            provider,
            chains,
            snapshot,
            request_delay: Duration::from_secs(1),
            startup_max_age: Duration::from_secs(3600),
            cycle_lock: Mutex::new(()),
            cycles: AtomicU64::new(0),
        }
    }

    /// 설정에서 데이터 소스와 체인 목록을 구성
    pub fn from_config(config: &CollectorConfig, db: &Database, snapshot: SnapshotHandle) -> Result<Self> {
        let chains = config.load_chains()?;
        let tvl_source = DefiLlamaClient::new(config.sources.defillama())?;
        let price_source = CoinGeckoClient::new(config.sources.coingecko())?;

        let provider = CachedMetricProvider::new(
            db.store(),
            Arc::new(tvl_source),
            Arc::new(price_source),
        )
        .with_policy(FreshnessPolicy::new(config.refresh.freshness()));

        tracing::info!(chains = chains.len(), "갱신 오케스트레이터 구성 완료");

        Ok(Self::new(provider, chains, snapshot)
            .with_request_delay(config.refresh.request_delay())
            .with_startup_max_age(config.refresh.startup_max_age()))
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_startup_max_age(mut self, max_age: Duration) -> Self {
        self.startup_max_age = max_age;
        self
    }

    pub fn snapshot(&self) -> &SnapshotHandle {
        &self.snapshot
    }

    pub fn chains(&self) -> &TrackedChains {
        &self.chains
    }

    pub fn store(&self) -> &MetricStore {
        self.provider.store()
    }

    /// 현재 시각 기준 갱신 사이클 실행
    pub async fn run_cycle(&self) -> Result<CycleStats> {
        self.run_cycle_at(Utc::now()).await
    }

    /// 주어진 시각 기준 갱신 사이클 실행
    ///
    /// 원격 실패는 체인/지표 단위로 fallback 처리되고, 저장소 오류는 사이클을
    /// 중단합니다. 중단되면 이전 스냅샷이 그대로 유지됩니다.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> Result<CycleStats> {
        let _guard = self.cycle_lock.lock().await;

        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        let span = chainwatch_core::cycle_span!(cycle, self.chains.len());
        self.run_locked_cycle(now).instrument(span).await
    }

    /// 시작한 사이클 수
    pub fn cycles_started(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    async fn run_locked_cycle(&self, now: DateTime<Utc>) -> Result<CycleStats> {
        let start = Instant::now();
        let mut stats = CycleStats::new();
        let entities = self.chains.entities();

        tracing::info!(chains = entities.len(), "갱신 사이클 시작");

        let mut snapshots = Vec::with_capacity(entities.len());
        for (idx, entity) in entities.iter().enumerate() {
            tracing::debug!(
                entity = %entity,
                progress = format!("{}/{}", idx + 1, entities.len()),
                "체인 갱신 시작"
            );

            let mut touched_network = false;
            let mut tvl = Vec::new();
            let mut price = Vec::new();
            for kind in MetricKind::ALL {
                let outcome = self
                    .provider
                    .fetch_metric_at(entity, kind, now.timestamp())
                    .await
                    .map_err(|e| {
                        tracing::error!(
                            entity = %entity,
                            metric = %kind,
                            error = %e,
                            "저장소 오류로 사이클 중단"
                        );
                        CollectorError::from(e)
                    })?;

                let source = outcome.source();
                touched_network |= source != FetchSource::Cache;
                stats.record(source, outcome.points().len());

                match kind {
                    MetricKind::Tvl => tvl = outcome.into_points(),
                    MetricKind::Price => price = outcome.into_points(),
                }
            }

            snapshots.push(EntitySnapshot::new(entity.clone(), tvl, price));

            // Rate limiting
            let is_last = idx + 1 == entities.len();
            if touched_network && !is_last && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
        }

        self.store().set_last_refreshed(now).await?;
        self.snapshot
            .publish(CacheSnapshot::new(snapshots, Some(now)))
            .await;

        stats.elapsed = start.elapsed();
        Ok(stats)
    }

    /// 저장된 데이터로 스냅샷을 게시 (네트워크 사용 안 함)
    pub async fn load_from_store(&self) -> Result<()> {
        let _guard = self.cycle_lock.lock().await;
        let snapshot = snapshot_from_store(self.store(), &self.chains).await?;
        self.snapshot.publish(snapshot).await;
        Ok(())
    }

    /// 시작 시 스냅샷 준비
    pub async fn startup_load(&self) -> Result<StartupMode> {
        self.startup_load_at(Utc::now()).await
    }

    /// 주어진 시각 기준 시작 로드
    ///
    /// 마지막 갱신이 `startup_max_age`보다 최근이면 저장소에서만 로드합니다.
    pub async fn startup_load_at(&self, now: DateTime<Utc>) -> Result<StartupMode> {
        let last = self.store().get_last_refreshed().await?;

        let recent = last.is_some_and(|at| {
            now.signed_duration_since(at)
                .to_std()
                .map(|age| age < self.startup_max_age)
                .unwrap_or(true)
        });

        if recent {
            tracing::info!(last_refreshed = ?last, "최근 갱신 기록 있음, 저장소에서 로드");
            self.load_from_store().await?;
            Ok(StartupMode::FromStore)
        } else {
            tracing::info!(last_refreshed = ?last, "갱신 기록이 오래됨, 갱신 사이클 실행");
            let stats = self.run_cycle_at(now).await?;
            Ok(StartupMode::Refreshed(stats))
        }
    }
}

/// 저장소 내용으로 스냅샷 구성
pub async fn snapshot_from_store(store: &MetricStore, chains: &TrackedChains) -> Result<CacheSnapshot> {
    let mut entities = Vec::with_capacity(chains.len());
    for entity in chains.entities() {
        let tvl = store.read_series(&entity.name, MetricKind::Tvl).await?;
        let price = store.read_series(&entity.name, MetricKind::Price).await?;
        entities.push(EntitySnapshot::new(entity.clone(), tvl, price));
    }

    let last_refreshed = store.get_last_refreshed().await?;
    Ok(CacheSnapshot::new(entities, last_refreshed))
}
