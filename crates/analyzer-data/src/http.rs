//! 공용 HTTP 헬퍼.

use std::time::Duration;

use analyzer_core::HttpConfig;
use reqwest::{Client, Response, StatusCode};

use crate::error::{SourceError, SourceResult};

/// 설정의 User-Agent와 기본 타임아웃으로 HTTP 클라이언트를 생성합니다.
pub fn build_client(config: &HttpConfig) -> SourceResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| SourceError::Connection(format!("HTTP 클라이언트 생성 실패: {}", e)))
}

/// 응답 상태를 확인합니다.
///
/// 429는 `RateLimited`, 그 외 실패 상태는 본문을 담은 `Status` 오류가 됩니다.
pub async fn check_status(response: Response) -> SourceResult<Response> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(SourceError::RateLimited);
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(SourceError::Status {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response)
}
