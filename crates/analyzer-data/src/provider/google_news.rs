//! Google News RSS 검색.
//!
//! RSS의 `<link>`는 HTML 파서에서 void 요소로 처리되어 URL이 항목 텍스트로
//! 흘러나옵니다. 그래서 링크는 필드가 아니라 항목 전체 텍스트에서 찾습니다.

use std::time::Duration;

use analyzer_core::{HttpConfig, NewsSourceKind, Symbol};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::json;
use tracing::debug;

use super::NewsSource;
use crate::error::{SourceError, SourceResult};
use crate::http::{build_client, check_status};
use crate::news_extract::{ExtractionPolicy, RawNewsRecord};

/// Google News RSS 뉴스 소스.
pub struct GoogleNewsSource {
    client: Client,
    base_url: String,
    timeout: Duration,
    policy: ExtractionPolicy,
}

impl GoogleNewsSource {
    /// `base_url`: 예) `https://news.google.com`
    pub fn new(
        http: &HttpConfig,
        base_url: impl Into<String>,
        preferred_domains: &[String],
    ) -> SourceResult<Self> {
        Ok(Self {
            client: build_client(http)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(http.news_search_timeout_secs),
            policy: ExtractionPolicy::new(&["title"]).with_text_scan(preferred_domains),
        })
    }
}

/// RSS 문서의 `item`을 `{title, text}` 레코드로 변환합니다.
pub(crate) fn parse_rss_items(xml: &str) -> SourceResult<Vec<RawNewsRecord>> {
    let item_sel = Selector::parse("item")
        .map_err(|e| SourceError::Parse(format!("셀렉터 오류: {:?}", e)))?;
    let title_sel = Selector::parse("title")
        .map_err(|e| SourceError::Parse(format!("셀렉터 오류: {:?}", e)))?;

    let document = Html::parse_document(xml);
    let records = document
        .select(&item_sel)
        .map(|item| {
            let title = item
                .select(&title_sel)
                .next()
                .map(|t| t.text().collect::<String>())
                .unwrap_or_default();
            let text = item
                .text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            json!({ "title": title.trim(), "text": text })
        })
        .collect();
    Ok(records)
}

#[async_trait]
impl NewsSource for GoogleNewsSource {
    fn kind(&self) -> NewsSourceKind {
        NewsSourceKind::GoogleNews
    }

    fn name(&self) -> &str {
        "google_news"
    }

    fn link_policy(&self) -> &ExtractionPolicy {
        &self.policy
    }

    async fn fetch_records(&self, symbol: &Symbol) -> SourceResult<Vec<RawNewsRecord>> {
        let url = format!("{}/rss/search", self.base_url);
        let query = format!("{} stock", symbol.base_code());

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("hl", "en-US"),
                ("gl", "US"),
                ("ceid", "US:en"),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        let body = check_status(response).await?.text().await?;
        let records = parse_rss_items(&body)?;

        debug!(query = %query, count = records.len(), "Google News RSS 수집");
        Ok(records)
    }
}
