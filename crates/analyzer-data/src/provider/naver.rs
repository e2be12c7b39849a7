//! 네이버 금융 크롤러.
//!
//! 국내(KR) 종목의 당일 시세 요약과 종목 뉴스를 네이버 금융에서 수집합니다.
//! Yahoo Finance 일봉은 장중 당일 봉이 늦게 반영되므로 당일 값은 여기서 보완합니다.
//!
//! ## 데이터 소스
//! - `/item/main.naver`: `dl.blind` 시세 요약 (현재가, 시가, 고가, 저가, 거래량)
//! - `/item/news_news.naver`: 종목 뉴스 목록 (`td.title a`)
//!
//! ## 사용 예시
//! ```rust,ignore
//! let fetcher = NaverFinanceFetcher::new(&HttpConfig::default(), "https://finance.naver.com")?;
//! let fields = fetcher.fetch_fields("005930").await?;
//! println!("삼성전자 현재가: {}", fields.get(QuoteField::Price));
//! ```

use analyzer_core::{HttpConfig, NewsSourceKind, Symbol};
use async_trait::async_trait;
use reqwest::header::{REFERER, USER_AGENT};
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::json;
use tracing::debug;

use super::{LiveQuoteFields, LiveQuoteSource, NewsSource};
use crate::error::{SourceError, SourceResult};
use crate::http::{build_client, check_status};
use crate::news_extract::{ExtractionPolicy, RawNewsRecord};

/// 네이버 금융 페이지 인코딩.
const NAVER_CHARSET: &str = "euc-kr";

/// 네이버 금융 크롤러
///
/// HTML 파싱을 통해 네이버 금융에서 시세 요약과 뉴스를 수집합니다.
pub struct NaverFinanceFetcher {
    client: Client,
    base_url: String,
    user_agent: String,
    policy: ExtractionPolicy,
}

impl NaverFinanceFetcher {
    /// `base_url`: 예) `https://finance.naver.com`
    pub fn new(http: &HttpConfig, base_url: impl Into<String>) -> SourceResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let policy = ExtractionPolicy::new(&["title"])
            .with_link_fields(&["href"])
            .with_base_url(base_url.clone());

        Ok(Self {
            client: build_client(http)?,
            base_url,
            user_agent: http.user_agent.clone(),
            policy,
        })
    }

    /// 종목 뉴스 페이지 URL (프레젠테이션 폴백용).
    pub fn news_page_url(&self, code: &str) -> String {
        format!("{}/item/news.naver?code={}", self.base_url, code)
    }

    async fn get_document(&self, url: &str, referer: Option<&str>) -> SourceResult<Html> {
        let mut request = self.client.get(url).header(USER_AGENT, self.user_agent.as_str());
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }

        let response = check_status(request.send().await?).await?;
        let html = response.text_with_charset(NAVER_CHARSET).await?;
        Ok(Html::parse_document(&html))
    }
}

fn selector(css: &str) -> SourceResult<Selector> {
    Selector::parse(css).map_err(|e| SourceError::Parse(format!("셀렉터 오류 ({}): {:?}", css, e)))
}

/// `dl.blind` 시세 요약 텍스트를 공백으로 이어 붙입니다.
pub(crate) fn extract_blind_summary(document: &Html) -> SourceResult<String> {
    let dl = selector("dl.blind")?;
    let summary = document
        .select(&dl)
        .next()
        .ok_or_else(|| SourceError::MissingField("dl.blind".to_string()))?;

    let text = summary
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(text)
}

/// 뉴스 목록 행을 `{title, href}` 레코드로 변환합니다.
pub(crate) fn extract_news_rows(document: &Html) -> SourceResult<Vec<RawNewsRecord>> {
    let anchor = selector("td.title a")?;
    let records = document
        .select(&anchor)
        .map(|a| {
            let title = a.text().collect::<String>();
            let href = a.value().attr("href").unwrap_or_default();
            json!({ "title": title.trim(), "href": href })
        })
        .collect();
    Ok(records)
}

#[async_trait]
impl LiveQuoteSource for NaverFinanceFetcher {
    fn name(&self) -> &str {
        "naver_quote"
    }

    async fn fetch_fields(&self, code: &str) -> SourceResult<LiveQuoteFields> {
        let url = format!("{}/item/main.naver?code={}", self.base_url, code);
        let document = self.get_document(&url, None).await?;

        let summary = extract_blind_summary(&document)?;
        debug!(code = code, summary_len = summary.len(), "네이버 시세 요약 추출");

        LiveQuoteFields::from_labeled_text(&summary)
    }
}

#[async_trait]
impl NewsSource for NaverFinanceFetcher {
    fn kind(&self) -> NewsSourceKind {
        NewsSourceKind::Naver
    }

    fn name(&self) -> &str {
        "naver_news"
    }

    fn link_policy(&self) -> &ExtractionPolicy {
        &self.policy
    }

    async fn fetch_records(&self, symbol: &Symbol) -> SourceResult<Vec<RawNewsRecord>> {
        let code = symbol.base_code();
        let url = format!("{}/item/news_news.naver?code={}&page=1", self.base_url, code);
        let referer = self.news_page_url(code);

        let document = self.get_document(&url, Some(&referer)).await?;
        let records = extract_news_rows(&document)?;

        debug!(code = code, count = records.len(), "네이버 뉴스 수집");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news_extract::extract_items;
    use crate::provider::QuoteField;
    use mockito::Matcher;

    const MAIN_PAGE: &str = r#"<html><body>
        <div class="rate_info">
          <dl class="blind">
            <dt>종목 시세 정보</dt>
            <dd>2024년 01월 05일 16시 10분 기준 장마감</dd>
            <dd>종목명 삼성전자</dd>
            <dd>종목코드 005930 코스피</dd>
            <dd>현재가 70,000 전일대비 하락 1,000 마이너스 1.41 퍼센트</dd>
            <dd>전일가 71,000</dd>
            <dd>시가 71,200</dd>
            <dd>고가 71,500</dd>
            <dd>상한가 92,300</dd>
            <dd>저가 69,800</dd>
            <dd>하한가 49,700</dd>
            <dd>거래량 500,000</dd>
            <dd>거래대금 35,000백만</dd>
          </dl>
        </div>
    </body></html>"#;

    const NEWS_PAGE: &str = r#"<html><body><table class="type5"><tbody>
        <tr><td class="title"><a href="/item/news_read.naver?article_id=1&office_id=015" class="tit">삼성전자, [단독] 신규 투자</a></td></tr>
        <tr><td class="title"><a href="https://n.news.naver.com/article/2">외부 기사</a></td></tr>
        <tr><td class="title"><a class="tit">링크 없는 기사</a></td></tr>
    </tbody></table></body></html>"#;

    fn fetcher(server: &mockito::ServerGuard) -> NaverFinanceFetcher {
        NaverFinanceFetcher::new(&HttpConfig::default(), server.url()).unwrap()
    }

    #[test]
    fn test_extract_blind_summary() {
        let document = Html::parse_document(MAIN_PAGE);
        let summary = extract_blind_summary(&document).unwrap();

        assert!(summary.contains("현재가 70,000"));
        assert!(summary.contains("거래량 500,000"));
    }

    #[test]
    fn test_missing_blind_block() {
        let document = Html::parse_document("<html><body><p>점검 중</p></body></html>");
        assert!(matches!(
            extract_blind_summary(&document),
            Err(SourceError::MissingField(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/item/main.naver")
            .match_query(Matcher::UrlEncoded("code".into(), "005930".into()))
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(MAIN_PAGE)
            .create_async()
            .await;

        let fields = fetcher(&server).fetch_fields("005930").await.unwrap();

        mock.assert_async().await;
        assert_eq!(fields.get(QuoteField::Price), "70,000");
        assert_eq!(fields.get(QuoteField::Open), "71,200");
        assert_eq!(fields.get(QuoteField::High), "71,500");
        assert_eq!(fields.get(QuoteField::Low), "69,800");
        assert_eq!(fields.get(QuoteField::Volume), "500,000");
    }

    #[tokio::test]
    async fn test_fetch_news_sends_referer_and_resolves_links() {
        let mut server = mockito::Server::new_async().await;
        let referer = format!("{}/item/news.naver?code=005930", server.url());
        let mock = server
            .mock("GET", "/item/news_news.naver")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("code".into(), "005930".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .match_header("referer", referer.as_str())
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(NEWS_PAGE)
            .create_async()
            .await;

        let source = fetcher(&server);
        let symbol = Symbol::new("005930", "005930.KS");
        let records = source.fetch_records(&symbol).await.unwrap();
        let items = extract_items(&records, source.link_policy(), NewsSource::name(&source));

        mock.assert_async().await;
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title(), "삼성전자, (단독) 신규 투자");
        assert_eq!(
            items[0].link().url(),
            Some(format!("{}/item/news_read.naver?article_id=1&office_id=015", server.url()).as_str())
        );
        assert_eq!(items[1].link().url(), Some("https://n.news.naver.com/article/2"));
        assert!(!items[2].is_clickable());
    }
}
