//! 외부 데이터 수집과 정합화.
//!
//! 이 crate는 다음을 제공합니다:
//! - 데이터 소스 (Yahoo Finance, 네이버 금융, Google News, Gemini)
//! - 순서가 있는 폴백 체인 실행기
//! - 티커 해석 (`TickerResolver`)
//! - 과거 시세 + 실시간 시세 병합 (`PriceReconciler`)
//! - 다중 소스 뉴스 수집 (`NewsAggregator`)

pub mod error;
pub mod fallback;
pub mod http;
pub mod news;
pub mod news_extract;
pub mod parse;
pub mod provider;
pub mod reconciler;
pub mod resolver;

pub use error::{SourceError, SourceResult};
pub use fallback::{Attempt, ChainOutcome, FallbackChain, FallbackStep};
pub use news::{news_fallback_url, NewsAggregator};
pub use news_extract::{extract_items, resolve_link, ExtractionPolicy, RawNewsRecord};
pub use provider::{
    GeminiClient, GoogleNewsSource, HistoricalProvider, LiveQuoteFields, LiveQuoteSource,
    NaverFinanceFetcher, NewsSource, QuoteField, SearchCandidate, SymbolSearch, TextGenerator,
    YahooHistoryProvider, YahooSearchClient,
};
pub use reconciler::{
    merge_live_quote, parse_live_quote, MergeOutcome, PriceReconciler, LOOKBACK_PERIODS,
};
pub use resolver::TickerResolver;
