//! Chainwatch API 서버.
//!
//! 시작 로드 → 주기 갱신 태스크 → HTTP 서버 순서로 기동하고,
//! 종료 신호를 받으면 갱신 태스크까지 정리한 뒤 종료합니다.

use chainwatch_api::{create_router, AppState};
use chainwatch_collector::modules::spawn_scheduler;
use chainwatch_collector::{CollectorConfig, Refresher, SnapshotHandle, StartupMode};
use chainwatch_core::logging::init_logging;
use chainwatch_data::Database;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 설정 로드 (.env 포함) 후 tracing 초기화
    let config = CollectorConfig::from_env()?;
    init_logging(config.log_config("info"))?;

    info!("Starting Chainwatch API server...");
    let addr = config.api.bind_addr();

    let db = Database::connect(&config.database_url, 4).await?;
    let refresher = Arc::new(Refresher::from_config(
        &config,
        &db,
        SnapshotHandle::default(),
    )?);

    // 첫 스냅샷 준비
    match refresher.startup_load().await? {
        StartupMode::FromStore => info!("Snapshot loaded from store"),
        StartupMode::Refreshed(stats) => stats.log_summary("시작 갱신"),
    }

    // 전역 종료 토큰 (주기 갱신 태스크에 전파)
    let shutdown_token = CancellationToken::new();
    let scheduler = spawn_scheduler(
        refresher.clone(),
        config.refresh.interval(),
        shutdown_token.clone(),
    );

    let state = Arc::new(AppState::new(db.clone(), refresher));
    info!(version = %state.version, "Application state initialized");

    let app = create_router(state, &config.api.cors_origins);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    info!("Server shutdown initiated, cleaning up...");
    shutdown_token.cancel();

    // 진행 중인 갱신 사이클은 최대 10초까지 기다림
    match tokio::time::timeout(Duration::from_secs(10), scheduler).await {
        Ok(Ok(cycles)) => info!(cycles, "Scheduler stopped"),
        Ok(Err(e)) => warn!(error = %e, "Scheduler task failed"),
        Err(_) => warn!("Scheduler shutdown timeout, forcing shutdown"),
    }

    db.close().await;
    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}
