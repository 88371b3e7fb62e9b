//! SQLite 시계열 저장소.
//!
//! 체인별 TVL/가격 시계열을 (entity, timestamp) 키로 저장합니다.
//!
//! # 스키마
//!
//! ```text
//! tvl_data     (entity, date, timestamp, tvl)    PK (entity, timestamp)
//! price_data   (entity, date, timestamp, price)  PK (entity, timestamp)
//! last_updated (id, timestamp)                   단일 행
//! ```
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use chainwatch_data::Database;
//!
//! let db = Database::connect("sqlite://blockchain_data.db", 4).await?;
//! let store = db.store();
//! let points = store.read_series("Flow", MetricKind::Tvl).await?;
//! ```

use crate::error::{DataError, Result};
use chainwatch_core::{MetricKind, TimeSeriesPoint};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// 스키마 생성 구문 (여러 번 실행해도 안전).
const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS tvl_data (
        entity TEXT NOT NULL,
        date TEXT NOT NULL,
        timestamp INTEGER NOT NULL,
        tvl REAL NOT NULL,
        PRIMARY KEY (entity, timestamp)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS price_data (
        entity TEXT NOT NULL,
        date TEXT NOT NULL,
        timestamp INTEGER NOT NULL,
        price REAL NOT NULL,
        PRIMARY KEY (entity, timestamp)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS last_updated (
        id INTEGER PRIMARY KEY,
        timestamp TEXT NOT NULL
    )
    "#,
];

/// 데이터베이스 연결 관리자.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// SQLite 파일에 연결하고 스키마를 준비합니다.
    ///
    /// 파일이 없으면 생성하며, 백그라운드 갱신과 수동 갱신이 동시에
    /// 접근할 수 있도록 WAL 모드를 사용합니다.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DataError::ConnectionError(format!("{}: {}", url, e)))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        let db = Self { pool };
        db.migrate().await?;

        info!(url = url, "데이터베이스 연결 완료");
        Ok(db)
    }

    /// 메모리 데이터베이스 (테스트용).
    ///
    /// 연결마다 별도 DB가 생기므로 연결 하나를 계속 유지합니다.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// 스키마 생성.
    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| DataError::MigrationError(e.to_string()))?;
        }
        debug!("스키마 준비 완료");
        Ok(())
    }

    /// 시계열 저장소 핸들.
    pub fn store(&self) -> MetricStore {
        MetricStore::new(self.pool.clone())
    }

    /// 연결 상태 확인.
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// 연결 풀 종료.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// 시계열 저장소.
///
/// 상태를 메모리에 두지 않으며 모든 작업이 DB에 직접 반영됩니다.
#[derive(Clone)]
pub struct MetricStore {
    pool: SqlitePool,
}

impl MetricStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 시계열 저장 (같은 (entity, timestamp)는 덮어씀).
    ///
    /// 한 트랜잭션으로 커밋되므로 다른 읽기에서 일부만 보이지 않습니다.
    /// 빈 입력은 아무 작업도 하지 않습니다.
    #[instrument(skip(self, points), fields(count = points.len()))]
    pub async fn upsert_series(
        &self,
        entity: &str,
        kind: MetricKind,
        points: &[TimeSeriesPoint],
    ) -> Result<usize> {
        if points.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "INSERT INTO {table} (entity, date, timestamp, {column}) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (entity, timestamp) DO UPDATE SET
                 date = excluded.date,
                 {column} = excluded.{column}",
            table = kind.table_name(),
            column = kind.value_column(),
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DataError::InsertError(e.to_string()))?;

        for point in points {
            sqlx::query(&sql)
                .bind(entity)
                .bind(point.date_label())
                .bind(point.timestamp)
                .bind(point.value)
                .execute(&mut *tx)
                .await
                .map_err(|e| DataError::InsertError(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| DataError::InsertError(e.to_string()))?;

        debug!(
            entity = entity,
            metric = %kind,
            upserted = points.len(),
            "시계열 저장"
        );

        Ok(points.len())
    }

    /// 시계열 조회 (타임스탬프 오름차순).
    ///
    /// 저장된 데이터가 없으면 빈 벡터를 반환합니다.
    #[instrument(skip(self))]
    pub async fn read_series(&self, entity: &str, kind: MetricKind) -> Result<Vec<TimeSeriesPoint>> {
        let sql = format!(
            "SELECT timestamp, {column} FROM {table} WHERE entity = ?1 ORDER BY timestamp ASC",
            table = kind.table_name(),
            column = kind.value_column(),
        );

        let rows: Vec<(i64, f64)> = sqlx::query_as(&sql)
            .bind(entity)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(timestamp, value)| TimeSeriesPoint { timestamp, value })
            .collect())
    }

    /// 가장 최근에 저장된 타임스탬프.
    ///
    /// 신선도 판단에 사용되며, 데이터가 없으면 `None`.
    pub async fn latest_timestamp(&self, entity: &str, kind: MetricKind) -> Result<Option<i64>> {
        let sql = format!(
            "SELECT MAX(timestamp) FROM {table} WHERE entity = ?1",
            table = kind.table_name(),
        );

        let latest: Option<i64> = sqlx::query_scalar(&sql)
            .bind(entity)
            .fetch_one(&self.pool)
            .await?;

        Ok(latest)
    }

    /// 저장된 포인트 수.
    pub async fn series_count(&self, entity: &str, kind: MetricKind) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {table} WHERE entity = ?1",
            table = kind.table_name(),
        );

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(entity)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// 마지막 갱신 시각 기록 (단일 행 덮어쓰기).
    pub async fn set_last_refreshed(&self, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO last_updated (id, timestamp) VALUES (1, ?1)
            ON CONFLICT (id) DO UPDATE SET timestamp = excluded.timestamp
            "#,
        )
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| DataError::InsertError(e.to_string()))?;

        Ok(())
    }

    /// 마지막 갱신 시각 조회.
    pub async fn get_last_refreshed(&self) -> Result<Option<DateTime<Utc>>> {
        let at: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT timestamp FROM last_updated WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(at)
    }
}
