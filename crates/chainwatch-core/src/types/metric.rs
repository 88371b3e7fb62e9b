//! 수집 지표 종류 정의.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 체인별로 수집하는 지표 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Total Value Locked (DeFiLlama)
    Tvl,
    /// USD 가격 (CoinGecko)
    Price,
}

impl MetricKind {
    /// 모든 지표 종류 (수집 순서대로).
    pub const ALL: [MetricKind; 2] = [MetricKind::Tvl, MetricKind::Price];

    /// 지표 문자열 식별자.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Tvl => "tvl",
            MetricKind::Price => "price",
        }
    }

    /// 시계열을 저장하는 테이블 이름.
    pub fn table_name(&self) -> &'static str {
        match self {
            MetricKind::Tvl => "tvl_data",
            MetricKind::Price => "price_data",
        }
    }

    /// 값 컬럼 이름.
    pub fn value_column(&self) -> &'static str {
        match self {
            MetricKind::Tvl => "tvl",
            MetricKind::Price => "price",
        }
    }

    /// 데이터 소스 이름.
    pub fn source_name(&self) -> &'static str {
        match self {
            MetricKind::Tvl => "defillama",
            MetricKind::Price => "coingecko",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tvl" => Ok(MetricKind::Tvl),
            "price" => Ok(MetricKind::Price),
            _ => Err(format!("Invalid metric kind: {}", s)),
        }
    }
}
