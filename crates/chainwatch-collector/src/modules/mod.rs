//! 데이터 갱신 모듈.

pub mod refresh;
pub mod scheduler;

pub use refresh::{snapshot_from_store, Refresher, StartupMode};
pub use scheduler::{run_periodic, spawn_scheduler};
