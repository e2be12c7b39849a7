//! 뉴스 레코드 정규화.
//!
//! 소스마다 레코드 모양이 다릅니다. 링크가 최상위 필드에 있거나, 중첩 객체 안에
//! 있거나, 상대 경로이거나, 아예 자유 텍스트 안에만 있습니다. 소스별 차이는
//! [`ExtractionPolicy`]로 기술하고 [`extract_items`] 하나로 처리합니다.

use analyzer_core::{NewsItem, NewsLink};
use reqwest::Url;
use serde_json::Value;

use crate::parse::find_absolute_urls;

/// 소스가 반환하는 원시 뉴스 레코드.
pub type RawNewsRecord = Value;

/// 소스별 제목/링크 추출 규칙.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionPolicy {
    /// 제목 필드 경로 (점 구분, 앞에서부터 시도)
    pub title_fields: Vec<String>,
    /// 링크 필드 경로 (점 구분, 앞에서부터 시도)
    pub link_fields: Vec<String>,
    /// 상대 경로 링크에 붙일 기준 URL
    pub base_url: Option<String>,
    /// 필드에서 링크를 못 찾으면 레코드 전체 텍스트에서 URL 검색
    pub scan_text: bool,
    /// 텍스트 검색 시 우선하는 도메인
    pub preferred_domains: Vec<String>,
}

impl ExtractionPolicy {
    pub fn new<S: AsRef<str>>(title_fields: &[S]) -> Self {
        Self {
            title_fields: title_fields.iter().map(|s| s.as_ref().to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_link_fields<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.link_fields = fields.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// 자유 텍스트 URL 검색을 켭니다.
    pub fn with_text_scan<S: AsRef<str>>(mut self, preferred_domains: &[S]) -> Self {
        self.scan_text = true;
        self.preferred_domains = preferred_domains
            .iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        self
    }
}

/// 점 구분 경로로 중첩 필드의 문자열 값을 찾습니다.
fn lookup_str<'a>(record: &'a Value, path: &str) -> Option<&'a str> {
    let mut current = record;
    for key in path.split('.') {
        current = current.get(key)?;
    }
    current.as_str()
}

/// 링크 문자열을 절대 URL로 해석합니다.
///
/// `http(s)` 절대 URL은 그대로, 상대 경로는 기준 URL과 결합합니다.
/// 기준 URL이 없거나 결합할 수 없으면 `None`.
pub fn resolve_link(raw: &str, base_url: Option<&str>) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(raw) {
        return matches!(url.scheme(), "http" | "https").then(|| url.to_string());
    }

    let base = Url::parse(base_url?).ok()?;
    base.join(raw).ok().map(|url| url.to_string())
}

fn collect_text(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|v| collect_text(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_text(v, out)),
        _ => {}
    }
}

fn host_matches(url: &str, domain: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .map(|host| host == domain || host.ends_with(&format!(".{}", domain)))
        .unwrap_or(false)
}

/// 레코드 전체 텍스트에서 링크를 찾습니다. 선호 도메인이 먼저입니다.
fn scan_for_link(record: &Value, preferred_domains: &[String]) -> Option<String> {
    let mut texts = Vec::new();
    collect_text(record, &mut texts);
    let joined = texts.join(" ");
    let urls = find_absolute_urls(&joined);

    preferred_domains
        .iter()
        .find_map(|domain| urls.iter().find(|u| host_matches(u, domain)))
        .or_else(|| urls.first())
        .map(|u| u.to_string())
}

fn extract_link(record: &Value, policy: &ExtractionPolicy) -> NewsLink {
    let from_fields = policy.link_fields.iter().find_map(|path| {
        lookup_str(record, path).and_then(|raw| resolve_link(raw, policy.base_url.as_deref()))
    });

    let link = match from_fields {
        Some(link) => Some(link),
        None if policy.scan_text => scan_for_link(record, &policy.preferred_domains),
        None => None,
    };

    match link {
        Some(url) => NewsLink::Resolved(url),
        None => NewsLink::Unresolved,
    }
}

/// 원시 레코드를 정규화된 뉴스 항목으로 변환합니다.
///
/// 제목이 없는 레코드는 버리고, 링크가 없는 레코드는 `NewsLink::Unresolved`로
/// 남깁니다. 소스 순서를 유지합니다.
pub fn extract_items(
    records: &[RawNewsRecord],
    policy: &ExtractionPolicy,
    source: &str,
) -> Vec<NewsItem> {
    records
        .iter()
        .filter_map(|record| {
            let title = policy
                .title_fields
                .iter()
                .filter_map(|path| lookup_str(record, path))
                .find(|t| !t.trim().is_empty())?;
            NewsItem::new(title, extract_link(record, policy), source)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn yahoo_policy() -> ExtractionPolicy {
        ExtractionPolicy::new(&["content.title", "title"])
            .with_link_fields(&["content.canonicalUrl.url", "content.clickThroughUrl.url", "link"])
            .with_base_url("https://finance.yahoo.com")
    }

    #[test]
    fn test_resolve_link() {
        assert_eq!(
            resolve_link("https://a.com/x", None).as_deref(),
            Some("https://a.com/x")
        );
        assert_eq!(
            resolve_link("/item/news_read.naver?id=1", Some("https://finance.naver.com")).as_deref(),
            Some("https://finance.naver.com/item/news_read.naver?id=1")
        );
        assert_eq!(resolve_link("/relative", None), None);
        assert_eq!(resolve_link("   ", Some("https://a.com")), None);
        assert_eq!(resolve_link("mailto:a@b.c", None), None);
    }

    #[test]
    fn test_extract_direct_and_nested_links() {
        let records = vec![
            json!({"title": "Direct", "link": "https://x.com/1"}),
            json!({"content": {"title": "Nested", "canonicalUrl": {"url": "https://y.com/2"}}}),
            json!({"content": {"title": "Click", "clickThroughUrl": {"url": "/news/3"}}}),
        ];

        let items = extract_items(&records, &yahoo_policy(), "yahoo");

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].link().url(), Some("https://x.com/1"));
        assert_eq!(items[1].title(), "Nested");
        assert_eq!(items[1].link().url(), Some("https://y.com/2"));
        assert_eq!(items[2].link().url(), Some("https://finance.yahoo.com/news/3"));
        assert!(items.iter().all(|i| i.source() == "yahoo"));
    }

    #[test]
    fn test_missing_link_is_flagged_not_dropped() {
        let records = vec![
            json!({"title": "No link at all"}),
            json!({"title": "   "}),
            json!({"link": "https://x.com/untitled"}),
        ];

        let items = extract_items(&records, &yahoo_policy(), "yahoo");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].link(), &NewsLink::Unresolved);
        assert!(!items[0].is_clickable());
    }

    #[test]
    fn test_text_scan_prefers_domain() {
        let policy = ExtractionPolicy::new(&["title"]).with_text_scan(&["news.google.com"]);
        let records = vec![json!({
            "title": "Apple stock rallies",
            "text": "Apple stock rallies https://www.cnbc.com/a \
                     https://news.google.com/rss/articles/CBM?oc=5 Mon, 01 Jan"
        })];

        let items = extract_items(&records, &policy, "google_news");

        assert_eq!(
            items[0].link().url(),
            Some("https://news.google.com/rss/articles/CBM?oc=5")
        );
    }

    #[test]
    fn test_text_scan_falls_back_to_any_url() {
        let policy = ExtractionPolicy::new(&["title"]).with_text_scan(&["news.google.com"]);
        let records = vec![json!({"title": "T", "text": "see https://www.cnbc.com/a"})];

        let items = extract_items(&records, &policy, "google_news");
        assert_eq!(items[0].link().url(), Some("https://www.cnbc.com/a"));
    }
}
