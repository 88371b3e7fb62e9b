//! 캐시 우선 조회.
//!
//! - `freshness`: 24시간 신선도 판단
//! - `fetcher`: 저장소 → 원격 소스 → 저장된 데이터 fallback 순서의 조회

pub mod fetcher;
pub mod freshness;

pub use fetcher::{CachedMetricProvider, FetchOutcome, FetchSource};
pub use freshness::{is_fresh, FreshnessPolicy, FRESHNESS_WINDOW_SECS};
