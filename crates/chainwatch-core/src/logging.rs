//! 로깅 초기화와 span 매크로.
//!
//! 레벨 필터는 `RUST_LOG`가 있으면 그것을, 없으면 CLI에서 받은 레벨을 씁니다.
//! 출력 형식과 span 이벤트 여부는 수집기 설정(`LOG_FORMAT`, `LOG_SPAN_EVENTS`)에서 옵니다.
//!
//! 갱신 사이클은 [`cycle_span!`], 체인/지표 조회는 [`metric_span!`]으로 묶이므로
//! 그 안의 이벤트에는 `cycle`, `entity`, `metric`, `source` 필드가 함께 찍힙니다.

use std::fmt;
use std::str::FromStr;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 여러 줄, 색상 (개발용)
    #[default]
    Pretty,
    /// 한 줄 JSON, 현재 span 필드 포함 (로그 수집용)
    Json,
    /// 한 줄 텍스트 (데몬용)
    Compact,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
            Self::Compact => "compact",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Pretty, Self::Json, Self::Compact]
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("알 수 없는 로그 형식: {} (pretty, json, compact)", s))
    }
}

/// 로깅 설정.
///
/// 수집기 설정의 `log_config(level)`로 만드는 것이 보통입니다.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// EnvFilter 지시어 (예: "info", "chainwatch_data=debug")
    pub level: String,
    pub format: LogFormat,
    /// span 진입/종료 이벤트 출력 여부
    pub span_events: bool,
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::default(),
            span_events: false,
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// 레벨 필터. `RUST_LOG`가 설정되어 있으면 그쪽이 우선합니다.
    pub fn env_filter(&self) -> Result<EnvFilter, ParseError> {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&self.level))
    }

    /// 사이클이나 지표 조회가 끝날 때 소요 시간이 찍히도록 NEW/CLOSE만 사용.
    pub fn fmt_span(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// 전역 subscriber 설치.
///
/// 두 번째 호출은 에러를 반환합니다.
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = config.env_filter()?;

    let base = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(config.fmt_span());

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Json => base.json().with_current_span(true).boxed(),
        LogFormat::Compact => base.compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()?;

    tracing::info!(
        format = %config.format,
        level = %config.level,
        span_events = config.span_events,
        "로깅 초기화 완료"
    );

    Ok(())
}

/// 체인 하나의 지표 조회 span.
///
/// `entity`, `metric`, `source` 필드를 붙입니다.
#[macro_export]
macro_rules! metric_span {
    ($entity:expr, $kind:expr) => {{
        let kind: $crate::MetricKind = $kind;
        tracing::info_span!(
            "fetch_metric",
            entity = %$entity,
            metric = %kind,
            source = kind.source_name()
        )
    }};
}

/// 갱신 사이클 span (`cycle` 순번, `chains` 개수).
#[macro_export]
macro_rules! cycle_span {
    ($cycle:expr, $chains:expr) => {
        tracing::info_span!("refresh_cycle", cycle = $cycle, chains = $chains)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        for format in [LogFormat::Pretty, LogFormat::Json, LogFormat::Compact] {
            assert_eq!(format.to_string().parse::<LogFormat>(), Ok(format));
        }
        assert_eq!(" JSON ".parse::<LogFormat>(), Ok(LogFormat::Json));

        let err = "verbose".parse::<LogFormat>().unwrap_err();
        assert!(err.contains("verbose"));
    }

    #[test]
    fn test_span_events_toggle() {
        let config = LogConfig::new("info");
        assert_eq!(config.fmt_span(), FmtSpan::NONE);
        assert_eq!(config.with_span_events(true).fmt_span(), FmtSpan::NEW | FmtSpan::CLOSE);
    }

    #[test]
    fn test_env_filter_accepts_crate_directives() {
        let config = LogConfig::new("warn,chainwatch_data=debug,chainwatch_collector=info");
        assert!(config.env_filter().is_ok());
    }
}
