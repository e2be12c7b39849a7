//! 데이터 소스 오류 타입.

use analyzer_core::AnalyzerError;
use thiserror::Error;

/// 외부 데이터 소스 오류.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP 요청 실패
    #[error("HTTP 요청 실패: {0}")]
    Http(#[from] reqwest::Error),

    /// 성공이 아닌 HTTP 상태 (응답 본문 포함)
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Provider 라이브러리 오류
    #[error("Provider 오류: {0}")]
    Provider(String),

    /// 클라이언트/커넥터 생성 실패
    #[error("연결 실패: {0}")]
    Connection(String),

    /// 응답 파싱 실패
    #[error("파싱 실패: {0}")]
    Parse(String),

    /// 필수 필드 누락
    #[error("필드 누락: {0}")]
    MissingField(String),

    /// 데이터 없음
    #[error("데이터 없음: {0}")]
    Empty(String),

    /// 요청 한도 초과
    #[error("Rate limit 초과")]
    RateLimited,
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}

impl From<SourceError> for AnalyzerError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Parse(msg) | SourceError::MissingField(msg) => AnalyzerError::Parse(msg),
            other => AnalyzerError::Fetch(other.to_string()),
        }
    }
}
