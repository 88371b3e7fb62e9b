//! DeFiLlama TVL 클라이언트.
//!
//! `GET {base}/v2/historicalChainTvl/{chain}` 응답:
//!
//! ```json
//! [{"date": 1700000000, "tvl": 123456789.0}, ...]
//! ```

use super::{send_json, HttpSourceConfig, MetricSource};
use crate::error::Result;
use async_trait::async_trait;
use chainwatch_core::{MetricKind, TimeSeriesPoint, TrackedEntity};
use serde::Deserialize;
use tracing::{debug, instrument};

/// 기본 API 주소.
pub const DEFAULT_BASE_URL: &str = "https://api.llama.fi";

/// TVL 히스토리 항목.
#[derive(Debug, Deserialize)]
struct TvlEntry {
    /// Unix 타임스탬프 (초)
    date: i64,
    tvl: f64,
}

/// DeFiLlama API 클라이언트.
#[derive(Clone)]
pub struct DefiLlamaClient {
    client: reqwest::Client,
    config: HttpSourceConfig,
}

impl DefiLlamaClient {
    pub fn new(config: HttpSourceConfig) -> Result<Self> {
        let client = config.build_client()?;
        Ok(Self { client, config })
    }

    /// 기본 주소로 생성.
    pub fn with_defaults() -> Result<Self> {
        Self::new(HttpSourceConfig::new(DEFAULT_BASE_URL))
    }

    /// 체인 TVL 히스토리 조회.
    #[instrument(skip(self))]
    pub async fn fetch_chain_tvl(&self, chain: &str) -> Result<Vec<TimeSeriesPoint>> {
        let url = self.config.url(&format!("v2/historicalChainTvl/{}", chain));
        let entries: Vec<TvlEntry> = send_json(self.client.get(&url), &url).await?;

        debug!(chain = chain, count = entries.len(), "TVL 히스토리 수신");

        Ok(entries
            .into_iter()
            .map(|e| TimeSeriesPoint::new(e.date, e.tvl))
            .collect())
    }
}

#[async_trait]
impl MetricSource for DefiLlamaClient {
    fn kind(&self) -> MetricKind {
        MetricKind::Tvl
    }

    async fn fetch_series(&self, entity: &TrackedEntity) -> Result<Vec<TimeSeriesPoint>> {
        self.fetch_chain_tvl(entity.provider_id(MetricKind::Tvl)).await
    }
}
