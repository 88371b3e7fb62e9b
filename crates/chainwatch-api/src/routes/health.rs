//! 헬스 체크 endpoint.
//!
//! 서버 상태 확인을 위한 헬스 체크 엔드포인트를 제공합니다.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

/// 헬스 체크 응답 구조체.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// 전체 서비스 상태 ("healthy" | "degraded" | "unhealthy")
    pub status: String,

    /// API 버전
    pub version: String,

    /// 서버 업타임(초)
    pub uptime_secs: i64,

    /// 현재 시간 (ISO 8601)
    pub timestamp: String,

    /// 마지막 갱신 시각 (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refreshed: Option<String>,

    /// 스냅샷 나이 (초)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_age_secs: Option<i64>,

    /// 프로세스 시작 후 실행된 갱신 사이클 수 (실패 포함)
    pub refresh_cycles: u64,

    /// 개별 컴포넌트 상태
    pub components: ComponentHealth,
}

/// 개별 컴포넌트 상태.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// 데이터베이스 연결 상태
    pub database: ComponentStatus,

    /// 스냅샷 상태
    pub snapshot: ComponentStatus,
}

/// 컴포넌트 상태.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentStatus {
    /// 상태 ("up" | "down" | "empty")
    pub status: String,

    /// 추가 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    pub fn up() -> Self {
        Self {
            status: "up".to_string(),
            message: None,
        }
    }

    pub fn down(message: impl Into<String>) -> Self {
        Self {
            status: "down".to_string(),
            message: Some(message.into()),
        }
    }

    /// 아직 게시된 스냅샷 없음.
    pub fn empty() -> Self {
        Self {
            status: "empty".to_string(),
            message: None,
        }
    }

    pub fn up_with_info(message: impl Into<String>) -> Self {
        Self {
            status: "up".to_string(),
            message: Some(message.into()),
        }
    }
}

/// 간단한 헬스 체크 (liveness probe용).
///
/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// 상세 헬스 체크 (readiness probe용).
///
/// DB가 응답하지 않으면 503, 스냅샷이 비어 있으면 degraded.
/// GET /health/ready
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut overall_status = "healthy";
    let mut status_code = StatusCode::OK;

    let database_status = if state.is_db_healthy().await {
        ComponentStatus::up()
    } else {
        overall_status = "unhealthy";
        status_code = StatusCode::SERVICE_UNAVAILABLE;
        ComponentStatus::down("연결 실패")
    };

    let snapshot = state.current_snapshot().await;
    let now = chrono::Utc::now();
    let snapshot_status = match snapshot.last_refreshed {
        Some(_) if !snapshot.is_empty() => {
            ComponentStatus::up_with_info(format!("{} chains", snapshot.entities.len()))
        }
        _ => {
            if overall_status == "healthy" {
                overall_status = "degraded";
            }
            ComponentStatus::empty()
        }
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: now.to_rfc3339(),
        last_refreshed: snapshot.last_refreshed.map(|at| at.to_rfc3339()),
        snapshot_age_secs: snapshot
            .last_refreshed
            .map(|at| now.signed_duration_since(at).num_seconds()),
        refresh_cycles: state.refresher.cycles_started(),
        components: ComponentHealth {
            database: database_status,
            snapshot: snapshot_status,
        },
    };

    (status_code, Json(response))
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}
