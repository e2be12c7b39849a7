//! Google Gemini REST 클라이언트.
//!
//! - `GET  /v1beta/models`: 모델 목록 (generateContent 지원 모델만 사용)
//! - `POST /v1beta/{model}:generateContent`: 텍스트 생성
//!
//! API 키는 `key` 쿼리 파라미터로 전달합니다.

use analyzer_core::HttpConfig;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TextGenerator;
use crate::error::{SourceError, SourceResult};
use crate::http::{build_client, check_status};

const GENERATE_METHOD: &str = "generateContent";

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// 모델 이름에 `models/` 접두사를 붙입니다.
fn qualified_model(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

/// Gemini API 클라이언트.
pub struct GeminiClient {
    client: Client,
    base_url: String,
}

impl GeminiClient {
    /// `base_url`: 예) `https://generativelanguage.googleapis.com`
    pub fn new(http: &HttpConfig, base_url: impl Into<String>) -> SourceResult<Self> {
        Ok(Self {
            client: build_client(http)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn list_models(&self, api_key: &SecretString) -> SourceResult<Vec<String>> {
        let url = format!("{}/v1beta/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("key", api_key.expose_secret())])
            .send()
            .await?;

        let list: ModelList = check_status(response).await?.json().await?;
        let models: Vec<String> = list
            .models
            .into_iter()
            .filter(|m| m.supported_generation_methods.iter().any(|g| g == GENERATE_METHOD))
            .map(|m| m.name)
            .collect();

        debug!(count = models.len(), "Gemini 모델 목록 조회");
        Ok(models)
    }

    async fn generate(
        &self,
        api_key: &SecretString,
        model: &str,
        prompt: &str,
    ) -> SourceResult<String> {
        let model = qualified_model(model);
        let url = format!("{}/v1beta/{}:{}", self.base_url, model, GENERATE_METHOD);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key.expose_secret())])
            .json(&body)
            .send()
            .await?;

        let data: GenerateResponse = check_status(response).await?.json().await?;
        let text = data
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(SourceError::Empty(format!("{} 응답에 텍스트 없음", model)));
        }

        debug!(model = %model, len = text.len(), "Gemini 텍스트 생성");
        Ok(text)
    }
}
