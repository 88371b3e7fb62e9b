//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터베이스 연결 오류
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    QueryError(String),

    /// 데이터 삽입 오류
    #[error("Insert error: {0}")]
    InsertError(String),

    /// 마이그레이션 오류
    #[error("Migration error: {0}")]
    MigrationError(String),

    /// 연결 풀 소진
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// 데이터 가져오기 오류 (네트워크, 외부 소스)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 외부 API가 성공이 아닌 상태 코드를 반환
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// 응답 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DataError {
    /// 저장소 계층 오류인지 확인합니다.
    ///
    /// 저장소 오류는 fallback 대상이 아니며 호출자에게 전파됩니다.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            DataError::ConnectionError(_)
                | DataError::QueryError(_)
                | DataError::InsertError(_)
                | DataError::MigrationError(_)
                | DataError::PoolExhausted
        )
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => DataError::PoolExhausted,
            sqlx::Error::Io(e) => DataError::ConnectionError(e.to_string()),
            sqlx::Error::Database(db_err) => DataError::QueryError(db_err.message().to_string()),
            _ => DataError::QueryError(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DataError::ParseError(err.to_string())
        } else {
            DataError::FetchError(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_classification() {
        assert!(DataError::QueryError("locked".into()).is_storage());
        assert!(DataError::PoolExhausted.is_storage());
        assert!(!DataError::HttpStatus {
            status: 500,
            url: "http://x".into()
        }
        .is_storage());
        assert!(!DataError::ParseError("bad json".into()).is_storage());
    }
}
