//! 데이터 Provider 모듈.
//!
//! 외부 공개 API에서 일별 시계열을 가져오는 Provider들을 정의합니다.
//!
//! ## DeFiLlama
//! - `DefiLlamaClient`: 체인별 TVL 히스토리 (인증 불필요)
//!
//! ## CoinGecko
//! - `CoinGeckoClient`: 네이티브 토큰 USD 가격 (최근 90일, 일별)
//! - 데모 API 키가 있으면 헤더로 전달

pub mod coingecko;
pub mod defillama;

pub use coingecko::CoinGeckoClient;
pub use defillama::DefiLlamaClient;

use crate::error::{DataError, Result};
use async_trait::async_trait;
use chainwatch_core::{MetricKind, TimeSeriesPoint, TrackedEntity};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// 시계열 데이터 소스 trait.
///
/// 구현체는 지표 종류 하나를 담당하며, 저장소에는 접근하지 않습니다.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// 이 소스가 제공하는 지표 종류.
    fn kind(&self) -> MetricKind;

    /// 체인의 전체 시계열 조회.
    ///
    /// 반환 순서와 중복은 보장하지 않으며 호출자가 정규화합니다.
    async fn fetch_series(&self, entity: &TrackedEntity) -> Result<Vec<TimeSeriesPoint>>;
}

/// HTTP 소스 공통 설정.
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// API 기본 URL (끝의 `/`는 무시)
    pub base_url: String,
    /// 요청 전체 타임아웃
    pub timeout: Duration,
    /// 연결 타임아웃
    pub connect_timeout: Duration,
    /// 선택적 API 키
    pub api_key: Option<String>,
}

impl HttpSourceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            api_key: None,
        }
    }

    pub fn with_timeouts(mut self, timeout: Duration, connect_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    /// 경로를 붙인 전체 URL.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// 타임아웃이 적용된 HTTP 클라이언트 생성.
    pub(crate) fn build_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(concat!("chainwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))
    }
}

/// 요청을 보내고 JSON 응답을 역직렬화.
///
/// 2xx가 아니면 [`DataError::HttpStatus`]를 반환합니다.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    url: &str,
) -> Result<T> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(DataError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.json::<T>().await?;
    debug!(url = url, status = status.as_u16(), "응답 수신");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let config = HttpSourceConfig::new("https://api.llama.fi/");
        assert_eq!(
            config.url("/v2/historicalChainTvl/flow"),
            "https://api.llama.fi/v2/historicalChainTvl/flow"
        );
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let config = HttpSourceConfig::new("http://x").with_api_key(Some("  ".into()));
        assert!(config.api_key.is_none());

        let config = HttpSourceConfig::new("http://x").with_api_key(Some("demo".into()));
        assert_eq!(config.api_key.as_deref(), Some("demo"));
    }
}
