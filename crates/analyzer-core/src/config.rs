//! 설정 관리.
//!
//! 기본값 → TOML 파일(선택) → 환경 변수(`ANALYZER__SECTION__KEY`) 순으로 덮어씁니다.
//! API 키와 언어 설정은 전역 상태로 읽지 않고, 이 구조체를 통해
//! 파이프라인 생성자에 명시적으로 전달됩니다.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::types::SourcePriority;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// HTTP 클라이언트 설정
    pub http: HttpConfig,
    /// 외부 데이터 소스 설정
    pub sources: SourcesConfig,
    /// LLM 설정
    pub llm: LlmConfig,
    /// 분석 설정
    pub analysis: AnalysisConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// 분석 span 진입/종료 이벤트 출력
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            span_events: false,
        }
    }
}

/// HTTP 클라이언트 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// 스크래핑 요청에 사용할 User-Agent
    pub user_agent: String,
    /// 기본 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 뉴스 검색(최하위 우선순위) 요청 타임아웃 (초)
    pub news_search_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            request_timeout_secs: 30,
            news_search_timeout_secs: 10,
        }
    }
}

/// 외부 데이터 소스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Yahoo Finance 검색 API 기본 URL
    pub yahoo_search_url: String,
    /// 네이버 금융 기본 URL
    pub naver_base_url: String,
    /// Google News RSS 기본 URL
    pub google_news_url: String,
    /// 한국 외 종목의 뉴스 소스 순서
    pub priority: SourcePriority,
    /// 반환할 최대 뉴스 수
    pub news_limit: usize,
    /// 자유 텍스트에서 링크를 찾을 때 우선하는 도메인
    pub preferred_news_domains: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            yahoo_search_url: "https://query1.finance.yahoo.com".to_string(),
            naver_base_url: "https://finance.naver.com".to_string(),
            google_news_url: "https://news.google.com".to_string(),
            priority: SourcePriority::default(),
            news_limit: 5,
            preferred_news_domains: vec!["news.google.com".to_string()],
        }
    }
}

/// LLM(Gemini) 설정.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API 키 (비어 있으면 AI 기능 비활성화)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Gemini REST API 기본 URL
    pub base_url: String,
    /// 모델 탐색 결과에서 우선 선택할 모델 ID
    pub preferred_models: Vec<String>,
    /// 모델 탐색 실패 시 사용할 고정 모델 목록
    pub fallback_models: Vec<String>,
    /// 티커 해석에 사용할 모델
    pub resolver_model: String,
    /// 리포트 응답 언어
    pub report_language: String,
    /// LLM이 돌려준 티커로 인정할 최대 길이
    pub max_ticker_len: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            preferred_models: vec![
                "models/gemini-1.5-flash".to_string(),
                "models/gemini-1.5-pro".to_string(),
                "models/gemini-pro".to_string(),
            ],
            fallback_models: vec![
                "models/gemini-1.5-flash".to_string(),
                "models/gemini-1.5-pro".to_string(),
            ],
            resolver_model: "models/gemini-1.5-flash".to_string(),
            report_language: "Korean".to_string(),
            max_ticker_len: 10,
        }
    }
}

impl LlmConfig {
    /// 설정된 API 키를 비밀 값으로 반환합니다. 공백뿐이면 `None`.
    pub fn api_key(&self) -> Option<SecretString> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|k| SecretString::new(k.into()))
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("preferred_models", &self.preferred_models)
            .field("fallback_models", &self.fallback_models)
            .field("resolver_model", &self.resolver_model)
            .field("report_language", &self.report_language)
            .field("max_ticker_len", &self.max_ticker_len)
            .finish()
    }
}

/// 분석 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 기본 조회 기간 (Yahoo range 문자열)
    pub default_period: String,
    /// 지표 계산에 필요한 최소 바 수
    pub min_bars_for_indicators: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_period: "1y".to_string(),
            min_bars_for_indicators: 30,
        }
    }
}

impl AnalyzerConfig {
    /// 파일(선택)과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("ANALYZER")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("sources.priority.news")
                    .with_list_parse_key("llm.preferred_models")
                    .with_list_parse_key("llm.fallback_models")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/analyzer.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewsSourceKind;
    use secrecy::ExposeSecret;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.analysis.default_period, "1y");
        assert_eq!(config.analysis.min_bars_for_indicators, 30);
        assert_eq!(config.sources.news_limit, 5);
        assert_eq!(config.http.news_search_timeout_secs, 10);
        assert_eq!(config.llm.max_ticker_len, 10);
    }

    #[test]
    fn test_blank_api_key_is_none() {
        let mut llm = LlmConfig::default();
        assert!(llm.api_key().is_none());

        llm.api_key = Some("   ".to_string());
        assert!(llm.api_key().is_none());

        llm.api_key = Some(" key-123 ".to_string());
        assert_eq!(llm.api_key().unwrap().expose_secret(), "key-123");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let llm = LlmConfig {
            api_key: Some("super-secret".to_string()),
            ..Default::default()
        };
        let rendered = format!("{:?}", llm);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let toml = r#"
            [sources]
            news_limit = 3

            [sources.priority]
            news = ["google_news", "yahoo"]

            [llm]
            report_language = "English"
        "#;

        let config: AnalyzerConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.sources.news_limit, 3);
        assert_eq!(
            config.sources.priority.news,
            vec![NewsSourceKind::GoogleNews, NewsSourceKind::Yahoo]
        );
        assert_eq!(config.llm.report_language, "English");
        assert_eq!(config.analysis.default_period, "1y");
    }
}
