//! 분석 시스템의 에러 타입.
//!
//! 파이프라인을 중단시키는 에러는 `NoData`와 `Fetch`뿐이며,
//! 나머지는 각 단계에서 로컬로 흡수됩니다.

use thiserror::Error;

/// 핵심 분석 에러.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// 과거 시세가 비어 있음
    #[error("No data found for {0}")]
    NoData(String),

    /// 외부 소스 조회 실패
    #[error("조회 에러: {0}")]
    Fetch(String),

    /// 파싱 에러
    #[error("파싱 에러: {0}")]
    Parse(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),
}

/// 분석 작업을 위한 Result 타입.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

impl AnalyzerError {
    /// 파이프라인 전체를 중단시키는 에러인지 확인합니다.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalyzerError::NoData(_) | AnalyzerError::Fetch(_))
    }
}

impl From<serde_json::Error> for AnalyzerError {
    fn from(err: serde_json::Error) -> Self {
        AnalyzerError::Parse(err.to_string())
    }
}

impl From<config::ConfigError> for AnalyzerError {
    fn from(err: config::ConfigError) -> Self {
        AnalyzerError::Config(err.to_string())
    }
}
