//! 체인 지표 endpoint.
//!
//! 게시된 스냅샷을 그대로 반환하며, 요청 처리 중에는 네트워크를 사용하지 않습니다.
//! 수동 갱신(`POST /api/v1/refresh`)만 갱신 사이클을 실행합니다.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chainwatch_collector::{CacheSnapshot, CycleStats, EntitySnapshot};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 수동 갱신 응답.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub stats: CycleStats,
    /// 소요 시간 (밀리초)
    pub elapsed_ms: u64,
    pub last_refreshed: Option<String>,
}

/// 전체 체인 스냅샷 조회.
///
/// GET /api/v1/metrics
pub async fn list_metrics(State(state): State<Arc<AppState>>) -> Json<CacheSnapshot> {
    let snapshot = state.current_snapshot().await;
    Json(snapshot.as_ref().clone())
}

/// 체인 하나의 스냅샷 조회.
///
/// 이름, DeFiLlama ID, CoinGecko ID 모두로 찾을 수 있습니다 (대소문자 무시).
/// GET /api/v1/metrics/{name}
pub async fn get_metric(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<EntitySnapshot>> {
    let entity = state.refresher.chains().find(&name).ok_or_else(|| {
        ApiErrorResponse::new("ENTITY_NOT_FOUND", format!("추적 대상이 아닙니다: {}", name))
            .with_status(StatusCode::NOT_FOUND)
    })?;

    let snapshot = state.current_snapshot().await;
    let entry = snapshot
        .entities
        .iter()
        .find(|e| e.entity.name == entity.name)
        .cloned()
        // 첫 갱신 전에는 빈 시계열
        .unwrap_or_else(|| EntitySnapshot::new(entity.clone(), Vec::new(), Vec::new()));

    Ok(Json(entry))
}

/// 갱신 사이클을 즉시 실행.
///
/// 진행 중인 사이클이 있으면 끝날 때까지 기다립니다. 사이클은 별도 태스크에서
/// 실행되므로 클라이언트가 연결을 끊어도 끝까지 진행됩니다.
/// POST /api/v1/refresh
pub async fn trigger_refresh(State(state): State<Arc<AppState>>) -> ApiResult<Json<RefreshResponse>> {
    let refresher = state.refresher.clone();
    let cycle = tokio::spawn(async move { refresher.run_cycle().await });

    let stats = match cycle.await {
        Ok(Ok(stats)) => stats,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "수동 갱신 실패");
            return Err(ApiErrorResponse::new("REFRESH_FAILED", e.to_string())
                .with_status(StatusCode::INTERNAL_SERVER_ERROR));
        }
        Err(e) => {
            tracing::error!(error = %e, "수동 갱신 태스크 비정상 종료");
            return Err(ApiErrorResponse::new("REFRESH_FAILED", e.to_string())
                .with_status(StatusCode::INTERNAL_SERVER_ERROR));
        }
    };

    stats.log_summary("수동 갱신");
    let snapshot = state.current_snapshot().await;

    Ok(Json(RefreshResponse {
        elapsed_ms: stats.elapsed.as_millis() as u64,
        stats,
        last_refreshed: snapshot.last_refreshed.map(|at| at.to_rfc3339()),
    }))
}

/// 지표 라우터 생성.
pub fn metrics_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_metrics))
        .route("/{name}", get(get_metric))
}

/// 수동 갱신 라우터 생성.
pub fn refresh_router() -> Router<Arc<AppState>> {
    Router::new().route("/", post(trigger_refresh))
}
