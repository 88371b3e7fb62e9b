//! 지표 저장 및 수집.
//!
//! 이 crate는 다음을 제공합니다:
//! - SQLite 기반 시계열 저장소 (upsert, 범위 조회, 마지막 갱신 시각)
//! - DeFiLlama / CoinGecko 데이터 소스
//! - 신선도 정책 (24시간)
//! - 캐시 우선 Fetcher (실패 시 저장된 데이터로 fallback)

pub mod cache;
pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};

// 저장소 타입 재내보내기
pub use storage::sqlite::{Database, MetricStore};

// 캐시 재내보내기
pub use cache::fetcher::{CachedMetricProvider, FetchOutcome, FetchSource};
pub use cache::freshness::{is_fresh, FreshnessPolicy, FRESHNESS_WINDOW_SECS};

// 데이터 소스 재내보내기
pub use provider::{CoinGeckoClient, DefiLlamaClient, HttpSourceConfig, MetricSource};
