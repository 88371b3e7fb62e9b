//! CoinGecko 가격 클라이언트.
//!
//! `GET {base}/coins/{id}/market_chart?vs_currency=usd&days=90&interval=daily`
//! 응답의 `prices`는 `[밀리초 타임스탬프, 가격]` 쌍의 배열입니다.

use super::{send_json, HttpSourceConfig, MetricSource};
use crate::error::Result;
use async_trait::async_trait;
use chainwatch_core::{MetricKind, TimeSeriesPoint, TrackedEntity};
use serde::Deserialize;
use tracing::{debug, instrument};

/// 기본 API 주소.
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// 조회 기간 (일).
pub const HISTORY_DAYS: u32 = 90;

/// 데모 API 키 헤더.
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

#[derive(Debug, Deserialize)]
struct MarketChart {
    /// 없으면 빈 시계열로 처리
    #[serde(default)]
    prices: Vec<(f64, f64)>,
}

/// CoinGecko API 클라이언트.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: reqwest::Client,
    config: HttpSourceConfig,
}

impl CoinGeckoClient {
    pub fn new(config: HttpSourceConfig) -> Result<Self> {
        let client = config.build_client()?;
        Ok(Self { client, config })
    }

    /// 기본 주소로 생성.
    pub fn with_defaults() -> Result<Self> {
        Self::new(HttpSourceConfig::new(DEFAULT_BASE_URL))
    }

    /// 최근 90일 일별 USD 가격 조회.
    #[instrument(skip(self))]
    pub async fn fetch_market_chart(&self, coin_id: &str) -> Result<Vec<TimeSeriesPoint>> {
        let url = self.config.url(&format!("coins/{}/market_chart", coin_id));
        let days = HISTORY_DAYS.to_string();

        let mut request = self.client.get(&url).query(&[
            ("vs_currency", "usd"),
            ("days", days.as_str()),
            ("interval", "daily"),
        ]);
        if let Some(key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let chart: MarketChart = send_json(request, &url).await?;
        debug!(coin_id = coin_id, count = chart.prices.len(), "가격 히스토리 수신");

        Ok(chart
            .prices
            .into_iter()
            .map(|(ms, price)| TimeSeriesPoint::new((ms as i64).div_euclid(1000), price))
            .collect())
    }
}

#[async_trait]
impl MetricSource for CoinGeckoClient {
    fn kind(&self) -> MetricKind {
        MetricKind::Price
    }

    async fn fetch_series(&self, entity: &TrackedEntity) -> Result<Vec<TimeSeriesPoint>> {
        self.fetch_market_chart(entity.provider_id(MetricKind::Price)).await
    }
}
