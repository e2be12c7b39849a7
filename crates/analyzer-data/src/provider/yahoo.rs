//! Yahoo Finance Provider.
//!
//! - 과거 일봉: `yahoo_finance_api` 커넥터
//! - 종목 검색 / 종목 뉴스: `v1/finance/search` 엔드포인트

use analyzer_core::{Bar, HttpConfig, Market, NewsSourceKind, Symbol};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{HistoricalProvider, NewsSource, SearchCandidate, SymbolSearch};
use crate::error::{SourceError, SourceResult};
use crate::http::{build_client, check_status};
use crate::news_extract::{ExtractionPolicy, RawNewsRecord};

/// 검색 결과 후보 수.
const SEARCH_QUOTES_COUNT: usize = 5;

/// 뉴스 피드 요청 수.
const NEWS_COUNT: usize = 10;

/// Yahoo 뉴스 링크의 상대 경로 기준 URL.
const YAHOO_FINANCE_WEB: &str = "https://finance.yahoo.com";

// =============================================================================
// 과거 시세
// =============================================================================

/// Yahoo Finance 과거 시세 Provider.
pub struct YahooHistoryProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooHistoryProvider {
    pub fn new() -> SourceResult<Self> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| SourceError::Connection(format!("Yahoo Finance 연결 실패: {}", e)))?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl HistoricalProvider for YahooHistoryProvider {
    fn name(&self) -> &str {
        "yahoo_history"
    }

    async fn history(&self, ticker: &str, market: Market, period: &str) -> SourceResult<Vec<Bar>> {
        debug!(symbol = ticker, range = period, "Yahoo Finance API 호출");

        let response = self
            .connector
            .get_quote_range(ticker, "1d", period)
            .await
            .map_err(|e| SourceError::Provider(format!("Yahoo Finance API 오류 ({}): {}", ticker, e)))?;

        // 거래 기록이 없는 종목은 quotes()가 오류를 돌려줍니다.
        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!(symbol = ticker, error = %e, "Quote 없음, 빈 시세로 처리");
                return Ok(Vec::new());
            }
        };

        let tz = market.timezone();
        let bars = quotes
            .iter()
            .filter_map(|q| {
                let ts = Utc.timestamp_opt(q.timestamp as i64, 0).single()?;
                let date = ts.with_timezone(&tz).date_naive();
                Some(Bar::new(date, q.open, q.high, q.low, q.close, q.volume))
            })
            .collect();

        Ok(bars)
    }
}

// =============================================================================
// 검색 / 뉴스
// =============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
    #[serde(default)]
    news: Vec<RawNewsRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchQuote {
    symbol: Option<String>,
    #[serde(default)]
    exchange: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    long_name: Option<String>,
}

/// Yahoo Finance 검색 클라이언트.
///
/// 종목 검색(`SymbolSearch`)과 종목 뉴스 피드(`NewsSource`)가 같은
/// 엔드포인트를 씁니다.
pub struct YahooSearchClient {
    client: Client,
    base_url: String,
    policy: ExtractionPolicy,
}

impl YahooSearchClient {
    /// `base_url`: 예) `https://query1.finance.yahoo.com`
    pub fn new(http: &HttpConfig, base_url: impl Into<String>) -> SourceResult<Self> {
        let policy = ExtractionPolicy::new(&["content.title", "content.heading", "title", "heading"])
            .with_link_fields(&[
                "content.canonicalUrl.url",
                "content.clickThroughUrl.url",
                "content.link",
                "content.url",
                "link",
                "url",
            ])
            .with_base_url(YAHOO_FINANCE_WEB);

        Ok(Self {
            client: build_client(http)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy,
        })
    }

    async fn query(&self, q: &str, quotes: usize, news: usize) -> SourceResult<SearchResponse> {
        let url = format!("{}/v1/finance/search", self.base_url);
        let quotes = quotes.to_string();
        let news = news.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("q", q), ("quotesCount", quotes.as_str()), ("newsCount", news.as_str())])
            .send()
            .await?;

        let body = check_status(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl SymbolSearch for YahooSearchClient {
    fn name(&self) -> &str {
        "yahoo_search"
    }

    async fn search(&self, query: &str) -> SourceResult<Vec<SearchCandidate>> {
        let data = self.query(query, SEARCH_QUOTES_COUNT, 0).await?;

        let candidates: Vec<SearchCandidate> = data
            .quotes
            .into_iter()
            .filter_map(|q| {
                let symbol = q.symbol.filter(|s| !s.trim().is_empty())?;
                Some(SearchCandidate {
                    symbol,
                    exchange: q.exchange,
                    name: q.long_name.or(q.short_name),
                })
            })
            .collect();

        debug!(query = query, count = candidates.len(), "Yahoo 종목 검색 완료");
        Ok(candidates)
    }
}

#[async_trait]
impl NewsSource for YahooSearchClient {
    fn kind(&self) -> NewsSourceKind {
        NewsSourceKind::Yahoo
    }

    fn name(&self) -> &str {
        "yahoo_news"
    }

    fn link_policy(&self) -> &ExtractionPolicy {
        &self.policy
    }

    async fn fetch_records(&self, symbol: &Symbol) -> SourceResult<Vec<RawNewsRecord>> {
        let data = self.query(symbol.ticker(), 0, NEWS_COUNT).await?;
        Ok(data.news)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news_extract::extract_items;
    use mockito::Matcher;

    fn client(server: &mockito::ServerGuard) -> YahooSearchClient {
        YahooSearchClient::new(&HttpConfig::default(), server.url()).unwrap()
    }

    #[tokio::test]
    async fn test_search_parses_candidates() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/finance/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "삼성전자".into()),
                Matcher::UrlEncoded("quotesCount".into(), "5".into()),
                Matcher::UrlEncoded("newsCount".into(), "0".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"quotes":[
                    {"symbol":"SSNLF","exchange":"PNK","shortName":"Samsung Electronics"},
                    {"symbol":"005930.KS","exchange":"KSC","longName":"Samsung Electronics Co., Ltd."},
                    {"exchange":"NYQ"}
                ],"news":[]}"#,
            )
            .create_async()
            .await;

        let candidates = client(&server).search("삼성전자").await.unwrap();

        mock.assert_async().await;
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].symbol, "SSNLF");
        assert_eq!(candidates[1].symbol, "005930.KS");
        assert_eq!(candidates[1].exchange.as_deref(), Some("KSC"));
    }

    #[tokio::test]
    async fn test_search_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/finance/search")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let err = client(&server).search("apple").await.unwrap_err();
        assert!(matches!(err, SourceError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_news_records_with_mixed_link_shapes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/finance/search")
            .match_query(Matcher::UrlEncoded("newsCount".into(), "10".into()))
            .with_status(200)
            .with_body(
                r#"{"quotes":[],"news":[
                    {"title":"Apple [AAPL] hits record","link":"https://finance.yahoo.com/news/a"},
                    {"content":{"title":"Nested story","canonicalUrl":{"url":"https://www.reuters.com/b"}}},
                    {"content":{"title":"Relative story","clickThroughUrl":{"url":"/news/c"}}},
                    {"title":"Linkless story"}
                ]}"#,
            )
            .create_async()
            .await;

        let source = client(&server);
        let symbol = Symbol::new("AAPL", "AAPL");
        let records = source.fetch_records(&symbol).await.unwrap();
        let items = extract_items(&records, source.link_policy(), NewsSource::name(&source));

        assert_eq!(items.len(), 4);
        assert_eq!(items[0].title(), "Apple (AAPL) hits record");
        assert_eq!(items[1].link().url(), Some("https://www.reuters.com/b"));
        assert_eq!(items[2].link().url(), Some("https://finance.yahoo.com/news/c"));
        assert!(!items[3].is_clickable());
    }
}
