//! 저장소 계층.
//!
//! - SQLite: 체인별 TVL/가격 시계열과 마지막 갱신 시각

pub mod sqlite;

pub use sqlite::{Database, MetricStore};
