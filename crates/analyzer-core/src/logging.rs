//! tracing 기반 로깅 초기화.
//!
//! 로그는 항상 stderr로 나가므로 CLI의 표준 출력(리포트, JSON)과 섞이지 않습니다.
//! HTTP/HTML 파서 계열 크레이트는 명시적으로 지정하지 않는 한 `warn` 이상만 남깁니다.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// 기본 레벨에서 소음이 큰 의존 크레이트.
const NOISY_TARGETS: [&str; 5] = ["hyper", "hyper_util", "rustls", "html5ever", "selectors"];

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// 사람이 읽기 쉬운 여러 줄 형식
    Pretty,
    /// 수집용 JSON
    Json,
    /// 한 줄 형식 (CLI 기본)
    #[default]
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(format!("알 수 없는 로그 형식: {}", other)),
        }
    }
}

/// 로깅 초기화 옵션.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 필터 지시어 (예: "info", "analyzer_data=debug")
    pub level: String,
    pub format: LogFormat,
    /// 분석 span 진입/종료 이벤트 출력
    pub with_span_events: bool,
    /// 파일명/줄 번호 출력
    pub with_file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            with_span_events: false,
            with_file: false,
        }
    }
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.with_span_events = enabled;
        self
    }

    /// 레벨에 소음 크레이트 억제 지시어를 덧붙인 필터 문자열.
    ///
    /// 사용자가 이미 지정한 크레이트는 건드리지 않습니다.
    pub fn filter_directives(&self) -> String {
        let mut directives = vec![self.level.trim().to_string()];
        for target in NOISY_TARGETS {
            let mentioned = self
                .level
                .split(',')
                .any(|d| d.trim().split('=').next() == Some(target));
            if !mentioned {
                directives.push(format!("{}=warn", target));
            }
        }
        directives.join(",")
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        Self::new(config.level.clone())
            .with_format(config.format.parse().unwrap_or_default())
            .with_span_events(config.span_events)
    }
}

/// 로깅을 초기화합니다. `RUST_LOG`가 설정되어 있으면 그 필터가 우선합니다.
///
/// ```no_run
/// use analyzer_core::logging::{init_logging, LogConfig, LogFormat};
///
/// init_logging(LogConfig::new("analyzer_data=debug").with_format(LogFormat::Json)).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.filter_directives()))?;

    let span_events = if config.with_span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.with_file)
        .with_line_number(config.with_file)
        .with_span_events(span_events);

    let fmt_layer = match config.format {
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Json => base.json().boxed(),
        LogFormat::Compact => base.compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()?;

    tracing::debug!(format = ?config.format, level = %config.level, "로깅 초기화");
    Ok(())
}

/// 분석 대상 심볼이 포함된 span을 생성하는 매크로.
#[macro_export]
macro_rules! analysis_span {
    ($name:expr, $symbol:expr) => {
        tracing::info_span!($name, symbol = %$symbol)
    };
    ($name:expr, $symbol:expr, $source:expr) => {
        tracing::info_span!($name, symbol = %$symbol, source = %$source)
    };
}
