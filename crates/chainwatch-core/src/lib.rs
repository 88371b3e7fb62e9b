//! # Chainwatch Core
//!
//! 체인 지표 수집기의 핵심 도메인 타입을 제공합니다.
//!
//! 이 크레이트는 워크스페이스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 추적 대상 체인 (TrackedEntity) 및 체인 목록 설정
//! - 지표 종류 (TVL, 가격) 와 시계열 포인트
//! - 시계열 요약 (현재 값, 30일 변동률)
//! - 로깅 인프라

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;
