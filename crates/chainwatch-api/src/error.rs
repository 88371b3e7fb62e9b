//! API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.
//!
//! ```json
//! {
//!   "code": "ENTITY_NOT_FOUND",
//!   "message": "추적 대상이 아닙니다: bitcoin",
//!   "timestamp": 1738300800
//! }
//! ```

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

/// API 에러 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "NOT_FOUND", "REFRESH_FAILED")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    pub timestamp: i64,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    /// 상태 코드와 함께 핸들러 에러로 변환.
    pub fn with_status(self, status: StatusCode) -> (StatusCode, Json<ApiErrorResponse>) {
        (status, Json(self))
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ApiErrorResponse::new("NOT_FOUND", "missing");
        assert_eq!(err.to_string(), "[NOT_FOUND] missing");
        assert!(err.timestamp > 0);
    }

    #[test]
    fn test_serialized_fields() {
        let (status, Json(body)) =
            ApiErrorResponse::new("REFRESH_FAILED", "db locked").with_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "REFRESH_FAILED");
        assert_eq!(json["message"], "db locked");
        assert!(json["timestamp"].is_i64());
    }
}
