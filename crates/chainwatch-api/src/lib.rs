//! 체인 지표 REST API.
//!
//! 갱신 계층이 게시한 스냅샷을 HTTP로 제공합니다:
//! - 전체/체인별 TVL·가격 시계열과 요약
//! - 수동 갱신 트리거
//! - 헬스 체크

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiErrorResponse, ApiResult};
pub use routes::create_router;
pub use state::AppState;
