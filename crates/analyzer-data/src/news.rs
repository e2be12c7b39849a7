//! 다중 소스 뉴스 수집.
//!
//! - 한국 종목: 네이버 금융 종목 뉴스만 사용
//! - 그 외: `SourcePriority` 순서대로 시도, 클릭 가능한 항목이 하나라도 있는
//!   첫 소스에서 멈춤 (소스 간 병합 없음)

use std::sync::Arc;

use analyzer_core::{NewsItem, SourcePriority, Symbol};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::fallback::{Attempt, FallbackChain, FallbackStep};
use crate::news_extract::extract_items;
use crate::provider::NewsSource;

/// 뉴스 최대 개수 기본값.
pub const DEFAULT_NEWS_LIMIT: usize = 5;

const YAHOO_QUOTE_WEB: &str = "https://finance.yahoo.com/quote";

/// 뉴스를 가져오지 못했을 때 안내할 원본 사이트 URL.
///
/// 한국 종목은 네이버 금융 종목 뉴스 페이지, 그 외는 Yahoo Finance 종목 뉴스 페이지입니다.
pub fn news_fallback_url(symbol: &Symbol, naver_base_url: &str) -> String {
    if symbol.is_korean() {
        format!(
            "{}/item/news.naver?code={}",
            naver_base_url.trim_end_matches('/'),
            symbol.base_code()
        )
    } else {
        format!("{}/{}/news", YAHOO_QUOTE_WEB, symbol.ticker())
    }
}

/// 소스 하나를 조회하고 항목을 정규화합니다. 오류는 빈 목록으로 처리합니다.
async fn collect_from(source: &dyn NewsSource, symbol: &Symbol) -> Result<Vec<NewsItem>, String> {
    let records = source.fetch_records(symbol).await.map_err(|e| {
        warn!(symbol = %symbol, source = source.name(), error = %e, "뉴스 소스 조회 실패");
        e.to_string()
    })?;

    let items = extract_items(&records, source.link_policy(), source.name());
    debug!(
        symbol = %symbol,
        source = source.name(),
        records = records.len(),
        items = items.len(),
        "뉴스 레코드 정규화"
    );
    Ok(items)
}

struct NewsStep<'a> {
    source: &'a dyn NewsSource,
}

#[async_trait]
impl<'a> FallbackStep<Symbol, Vec<NewsItem>> for NewsStep<'a> {
    fn name(&self) -> &str {
        self.source.name()
    }

    async fn attempt(&self, symbol: &Symbol) -> Attempt<Vec<NewsItem>> {
        match collect_from(self.source, symbol).await {
            Ok(items) if items.iter().any(NewsItem::is_clickable) => Attempt::Hit(items),
            Ok(items) => Attempt::miss(format!("클릭 가능한 항목 없음 ({}건)", items.len())),
            Err(reason) => Attempt::Miss(reason),
        }
    }
}

/// 뉴스 수집기.
pub struct NewsAggregator {
    sources: Vec<Arc<dyn NewsSource>>,
    korean: Arc<dyn NewsSource>,
    limit: usize,
    naver_base_url: String,
}

impl NewsAggregator {
    /// `sources`: 한국 외 종목에 시도할 순서, `korean`: 한국 종목 전용 소스
    pub fn new(sources: Vec<Arc<dyn NewsSource>>, korean: Arc<dyn NewsSource>) -> Self {
        Self {
            sources,
            korean,
            limit: DEFAULT_NEWS_LIMIT,
            naver_base_url: "https://finance.naver.com".to_string(),
        }
    }

    /// 우선순위 설정에 따라 소스 순서를 정합니다.
    ///
    /// 설정에 없는 소스는 제외되고, 설정에 있지만 제공되지 않은 소스는 건너뜁니다.
    pub fn with_priority(
        priority: &SourcePriority,
        available: Vec<Arc<dyn NewsSource>>,
        korean: Arc<dyn NewsSource>,
    ) -> Self {
        let sources = priority
            .news
            .iter()
            .filter_map(|kind| {
                let found = available.iter().find(|s| s.kind() == *kind).cloned();
                if found.is_none() {
                    warn!(source = %kind, "우선순위에 있는 뉴스 소스가 없음");
                }
                found
            })
            .collect();
        Self::new(sources, korean)
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_naver_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.naver_base_url = base_url.into();
        self
    }

    /// 한국 외 종목에 시도하는 소스 이름 (순서대로).
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn fallback_url(&self, symbol: &Symbol) -> String {
        news_fallback_url(symbol, &self.naver_base_url)
    }

    /// 종목 뉴스를 수집합니다. 실패하지 않으며 빈 목록일 수 있습니다.
    pub async fn fetch_news(&self, symbol: &Symbol) -> Vec<NewsItem> {
        let mut items = if symbol.is_korean() {
            collect_from(self.korean.as_ref(), symbol)
                .await
                .unwrap_or_default()
        } else {
            self.fetch_by_priority(symbol).await
        };

        items.truncate(self.limit);
        info!(symbol = %symbol, count = items.len(), "뉴스 수집 완료");
        items
    }

    async fn fetch_by_priority(&self, symbol: &Symbol) -> Vec<NewsItem> {
        let mut chain: FallbackChain<'_, Symbol, Vec<NewsItem>> = FallbackChain::new("news");
        for source in &self.sources {
            chain = chain.step(NewsStep {
                source: source.as_ref(),
            });
        }

        let outcome = chain.run(symbol).await;
        if outcome.value.is_none() {
            info!(symbol = %symbol, tried = ?outcome.tried, "모든 뉴스 소스 실패");
        }
        outcome.value.unwrap_or_default()
    }
}
