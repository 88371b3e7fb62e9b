//! 주기 갱신 스케줄러.
//!
//! 시작 로드가 끝난 뒤 한 주기가 지날 때마다 갱신 사이클을 실행합니다.
//! 취소 토큰이 취소되면 진행 중인 사이클을 마친 뒤 종료합니다.

use crate::modules::refresh::Refresher;
use crate::{CycleStats, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// 주기마다 작업 실행
///
/// 첫 실행은 `period` 후입니다. 실패한 사이클은 로그만 남기고 계속 진행하며,
/// 종료 시 실행한 사이클 수를 반환합니다.
pub async fn run_periodic<F, Fut>(period: Duration, cancel: CancellationToken, mut job: F) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<CycleStats>>,
{
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!("=== 주기 갱신 시작 (주기: {}분) ===", period.as_secs() / 60);

    let mut runs = 0;
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("종료 신호 수신, 주기 갱신 종료");
                break;
            }
            _ = interval.tick() => {
                runs += 1;
                match job().await {
                    Ok(stats) => stats.log_summary("주기 갱신"),
                    Err(e) => tracing::error!(error = %e, "주기 갱신 실패"),
                }
            }
        }
    }

    runs
}

/// 갱신 오케스트레이터로 주기 갱신 태스크 시작
pub fn spawn_scheduler(
    refresher: Arc<Refresher>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<usize> {
    tokio::spawn(async move {
        run_periodic(period, cancel, move || {
            let refresher = refresher.clone();
            async move { refresher.run_cycle().await }
        })
        .await
    })
}
