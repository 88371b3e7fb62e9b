//! 체인 지표 수집기.
//!
//! 이 crate는 API 서버와 함께 또는 단독으로 실행되는 갱신 계층을 제공합니다:
//! - 체인별 TVL/가격 갱신 사이클 (캐시 우선, 실패 시 저장 데이터 사용)
//! - 사이클 단위로 교체되는 메모리 스냅샷
//! - 시작 로드와 주기 갱신 스케줄러

pub mod config;
pub mod error;
pub mod modules;
pub mod snapshot;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use modules::{Refresher, StartupMode};
pub use snapshot::{CacheSnapshot, EntitySnapshot, MetricSnapshot, SnapshotHandle};
pub use stats::CycleStats;
