//! 환경변수 기반 설정 모듈.

use crate::error::CollectorError;
use crate::Result;
use chainwatch_core::logging::{LogConfig, LogFormat};
use chainwatch_core::TrackedChains;
use chainwatch_data::HttpSourceConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 데이터베이스 URL
    pub database_url: String,
    /// 체인 목록 파일 (없으면 내장 목록)
    pub chains_file: Option<PathBuf>,
    /// 데이터 소스 설정
    pub sources: SourcesConfig,
    /// 갱신 주기 설정
    pub refresh: RefreshConfig,
    /// HTTP API 설정
    pub api: ApiConfig,
    /// 로그 출력 설정
    pub log: LogSettings,
}

/// 로그 출력 설정 (레벨은 CLI 인자 또는 `RUST_LOG`)
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    pub format: LogFormat,
    /// 사이클/지표 span 진입·종료 이벤트 출력
    pub span_events: bool,
}

/// 데이터 소스 설정
#[derive(Debug, Clone)]
pub struct SourcesConfig {
    /// DeFiLlama API 주소
    pub defillama_base_url: String,
    /// CoinGecko API 주소
    pub coingecko_base_url: String,
    /// CoinGecko 데모 API 키
    pub coingecko_api_key: Option<String>,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 연결 타임아웃 (초)
    pub connect_timeout_secs: u64,
}

/// 갱신 주기 설정
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// 체인 간 요청 딜레이 (밀리초)
    pub request_delay_ms: u64,
    /// 백그라운드 갱신 주기 (분)
    pub interval_minutes: u64,
    /// 시작 시 이 시간 안에 갱신된 적 있으면 네트워크 없이 로드 (분)
    pub startup_max_age_minutes: u64,
    /// 저장 데이터 신선도 기준 (시간)
    pub freshness_hours: u64,
}

/// HTTP API 설정
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// 허용할 CORS origin (비어 있으면 전체 허용)
    pub cors_origins: Vec<String>,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: env_var_or("DATABASE_URL", "sqlite://blockchain_data.db"),
            chains_file: std::env::var("CHAINS_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            sources: SourcesConfig {
                defillama_base_url: env_var_or("DEFILLAMA_BASE_URL", "https://api.llama.fi"),
                coingecko_base_url: env_var_or(
                    "COINGECKO_BASE_URL",
                    "https://api.coingecko.com/api/v3",
                ),
                coingecko_api_key: std::env::var("COINGECKO_API_KEY").ok(),
                timeout_secs: env_var_parse("HTTP_TIMEOUT_SECS", 30),
                connect_timeout_secs: env_var_parse("HTTP_CONNECT_TIMEOUT_SECS", 10),
            },
            refresh: RefreshConfig {
                request_delay_ms: env_var_parse("REFRESH_REQUEST_DELAY_MS", 1000),
                interval_minutes: env_var_parse("REFRESH_INTERVAL_MINUTES", 60),
                startup_max_age_minutes: env_var_parse("STARTUP_MAX_AGE_MINUTES", 60),
                freshness_hours: env_var_parse("FRESHNESS_HOURS", 24),
            },
            api: ApiConfig {
                host: env_var_or("API_HOST", "127.0.0.1"),
                port: env_var_parse("API_PORT", 3000),
                cors_origins: env_var_list("CORS_ORIGINS"),
            },
            log: LogSettings {
                format: env_var_parse("LOG_FORMAT", LogFormat::Pretty),
                span_events: env_var_parse("LOG_SPAN_EVENTS", false),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// 값 범위 검증
    pub fn validate(&self) -> Result<()> {
        if self.refresh.interval_minutes == 0 {
            return Err(CollectorError::Config(
                "REFRESH_INTERVAL_MINUTES는 0보다 커야 합니다".to_string(),
            ));
        }
        if self.refresh.freshness_hours == 0 {
            return Err(CollectorError::Config(
                "FRESHNESS_HOURS는 0보다 커야 합니다".to_string(),
            ));
        }
        if self.sources.timeout_secs == 0 {
            return Err(CollectorError::Config(
                "HTTP_TIMEOUT_SECS는 0보다 커야 합니다".to_string(),
            ));
        }
        Ok(())
    }

    /// 주어진 레벨로 로깅 설정 구성
    pub fn log_config(&self, level: &str) -> LogConfig {
        LogConfig::new(level)
            .with_format(self.log.format)
            .with_span_events(self.log.span_events)
    }

    /// 추적 대상 체인 목록 로드
    pub fn load_chains(&self) -> Result<TrackedChains> {
        TrackedChains::load_or_builtin(self.chains_file.as_ref())
            .map_err(|e| CollectorError::Config(e.to_string()))
    }
}

impl SourcesConfig {
    fn http(&self, base_url: &str) -> HttpSourceConfig {
        HttpSourceConfig::new(base_url).with_timeouts(
            Duration::from_secs(self.timeout_secs),
            Duration::from_secs(self.connect_timeout_secs),
        )
    }

    /// DeFiLlama 소스 설정
    pub fn defillama(&self) -> HttpSourceConfig {
        self.http(&self.defillama_base_url)
    }

    /// CoinGecko 소스 설정 (API 키 포함)
    pub fn coingecko(&self) -> HttpSourceConfig {
        self.http(&self.coingecko_base_url)
            .with_api_key(self.coingecko_api_key.clone())
    }
}

impl RefreshConfig {
    /// 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// 갱신 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }

    pub fn startup_max_age(&self) -> Duration {
        Duration::from_secs(self.startup_max_age_minutes * 60)
    }

    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_hours * 3600)
    }
}

impl ApiConfig {
    /// 바인드 주소 ("host:port")
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 1000,
            interval_minutes: 60,
            startup_max_age_minutes: 60,
            freshness_hours: 24,
        }
    }
}

/// 환경변수 문자열 (없거나 비어 있으면 기본값)
fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// 쉼표로 구분된 환경변수 목록 (빈 항목 제외)
fn env_var_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .map(|v| parse_list(&v))
        .unwrap_or_default()
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
