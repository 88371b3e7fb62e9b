//! 추적 대상 체인 정의.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::MetricKind;

/// 추적 대상 블록체인 네트워크.
///
/// 데이터 소스마다 식별자가 다르므로 소스별 ID를 함께 보관합니다.
/// 프로세스 시작 시 고정되며 실행 중 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackedEntity {
    /// 표시 이름 (예: "Avalanche", "XRP/XRPL")
    pub name: String,
    /// DeFiLlama 체인 식별자 (예: "Avalanche")
    pub defillama_id: String,
    /// CoinGecko 코인 식별자 (예: "avalanche-2")
    pub coingecko_id: String,
}

impl TrackedEntity {
    /// 새 추적 대상 생성.
    pub fn new(
        name: impl Into<String>,
        defillama_id: impl Into<String>,
        coingecko_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            defillama_id: defillama_id.into(),
            coingecko_id: coingecko_id.into(),
        }
    }

    /// 지표 종류에 맞는 데이터 소스 식별자.
    pub fn provider_id(&self, kind: MetricKind) -> &str {
        match kind {
            MetricKind::Tvl => &self.defillama_id,
            MetricKind::Price => &self.coingecko_id,
        }
    }

    /// 이름 또는 소스 식별자와 일치하는지 확인 (대소문자 무시).
    pub fn matches(&self, key: &str) -> bool {
        self.name.eq_ignore_ascii_case(key)
            || self.defillama_id.eq_ignore_ascii_case(key)
            || self.coingecko_id.eq_ignore_ascii_case(key)
    }
}

impl fmt::Display for TrackedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
