//! Chainwatch collector CLI.

use chainwatch_collector::modules::{snapshot_from_store, spawn_scheduler};
use chainwatch_collector::{CollectorConfig, Refresher, SnapshotHandle, StartupMode};
use chainwatch_core::logging::{init_logging, LogFormat};
use chainwatch_core::MetricKind;
use chainwatch_data::Database;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "chainwatch-collector")]
#[command(about = "Chainwatch TVL / price collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 로그 형식 (pretty, json, compact). 없으면 LOG_FORMAT
    #[arg(long)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// 갱신 사이클 1회 실행
    Refresh,

    /// 저장소 상태 출력 (네트워크 사용 안 함)
    Status,

    /// 데몬 모드: 시작 로드 후 주기적으로 갱신
    Daemon,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 설정 로드 후 로깅 초기화
    let config = CollectorConfig::from_env()?;

    let mut log_config = config.log_config(&cli.log_level);
    if let Some(format) = cli.log_format {
        log_config = log_config.with_format(format);
    }
    init_logging(log_config)?;

    tracing::info!("Chainwatch Collector 시작");
    tracing::debug!(database_url = %config.database_url, "설정 로드 완료");

    // DB 연결
    let db = Database::connect(&config.database_url, 4).await?;

    // 명령 실행
    match cli.command {
        Commands::Refresh => {
            let refresher = Refresher::from_config(&config, &db, SnapshotHandle::default())?;
            let stats = refresher.run_cycle().await?;
            stats.log_summary("갱신");
        }
        Commands::Status => {
            let chains = config.load_chains()?;
            let snapshot = snapshot_from_store(&db.store(), &chains).await?;

            match snapshot.last_refreshed {
                Some(at) => println!("last refreshed: {}", at.to_rfc3339()),
                None => println!("last refreshed: never"),
            }
            for entry in &snapshot.entities {
                let columns: Vec<String> = MetricKind::ALL
                    .iter()
                    .map(|&kind| {
                        let metric = entry.metric(kind);
                        format!(
                            "{}={:>4} pts latest={:<16}",
                            kind,
                            metric.points.len(),
                            format_latest(metric.summary.map(|s| s.current)),
                        )
                    })
                    .collect();
                println!("{:<12} {}", entry.entity.name, columns.join(" "));
            }
        }
        Commands::Daemon => {
            let refresher = Arc::new(Refresher::from_config(
                &config,
                &db,
                SnapshotHandle::default(),
            )?);

            match refresher.startup_load().await? {
                StartupMode::FromStore => tracing::info!("저장소에서 스냅샷 로드 완료"),
                StartupMode::Refreshed(stats) => stats.log_summary("시작 갱신"),
            }

            let cancel = CancellationToken::new();
            let scheduler = spawn_scheduler(
                refresher.clone(),
                config.refresh.interval(),
                cancel.clone(),
            );

            tokio::signal::ctrl_c().await?;
            tracing::info!("종료 신호 수신, 데몬 종료 중...");
            cancel.cancel();

            let runs = scheduler.await?;
            tracing::info!(cycles = runs, "주기 갱신 종료");
        }
    }

    db.close().await;
    tracing::info!("Chainwatch Collector 종료");

    Ok(())
}

fn format_latest(value: Option<f64>) -> String {
    value.map(|v| format!("{:.4}", v)).unwrap_or_else(|| "-".to_string())
}
