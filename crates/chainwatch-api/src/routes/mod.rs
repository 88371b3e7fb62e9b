//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness, 마지막 갱신 시각)
//! - `/api/v1/metrics` - 전체 체인 스냅샷
//! - `/api/v1/metrics/{name}` - 체인 하나의 스냅샷
//! - `/api/v1/refresh` - 수동 갱신

pub mod health;
pub mod metrics;

pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use metrics::{metrics_router, refresh_router, RefreshResponse};

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::state::AppState;

/// 조회 요청 타임아웃.
///
/// 수동 갱신 라우트에는 적용하지 않습니다. 갱신 사이클은 요청과 무관하게 끝까지 실행됩니다.
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// 전체 라우터 생성.
///
/// `cors_origins`가 비어 있으면 모든 origin을 허용합니다.
pub fn create_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let read_routes = Router::new()
        .nest("/health", health_router())
        .nest("/api/v1/metrics", metrics_router())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, READ_TIMEOUT));

    Router::new()
        .merge(read_routes)
        .nest("/api/v1/refresh", refresh_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// CORS 레이어 생성.
fn cors_layer(cors_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "잘못된 CORS origin 무시");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        if !cors_origins.is_empty() {
            warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
        }
        AllowOrigin::any()
    } else {
        info!("CORS configured with {} allowed origins", origins.len());
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn allowed_origin(cors_origins: &[String], origin: &str) -> Option<String> {
        let state = Arc::new(create_test_state().await);
        let response = create_router(state, cors_origins)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin_only() {
        let origins = vec!["https://dash.example.com".to_string()];

        assert_eq!(
            allowed_origin(&origins, "https://dash.example.com").await.as_deref(),
            Some("https://dash.example.com")
        );
        assert_eq!(allowed_origin(&origins, "https://other.example.com").await, None);
    }

    #[tokio::test]
    async fn test_cors_without_origins_allows_any() {
        assert_eq!(
            allowed_origin(&[], "https://other.example.com").await.as_deref(),
            Some("*")
        );
    }
}
