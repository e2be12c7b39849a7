//! 데이터 Provider 모듈.
//!
//! 기능별 trait과 구현체를 정의합니다. 구현체는 서로 독립적이며 교체할 수 있습니다.
//!
//! ## Yahoo Finance
//! - `YahooHistoryProvider`: 일봉 과거 시세 (`yahoo_finance_api`)
//! - `YahooSearchClient`: 종목 검색, 종목 뉴스 피드
//!
//! ## 네이버 금융
//! - `NaverFinanceFetcher`: 실시간 시세 요약, 종목 뉴스 (한국 종목)
//!
//! ## Google
//! - `GoogleNewsSource`: Google News RSS 검색
//! - `GeminiClient`: Gemini 모델 목록 조회 및 텍스트 생성

pub mod gemini;
pub mod google_news;
pub mod naver;
pub mod yahoo;

use std::collections::BTreeMap;
use std::fmt;

use analyzer_core::{Bar, Market, NewsSourceKind, Symbol};
use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::{SourceError, SourceResult};
use crate::news_extract::{ExtractionPolicy, RawNewsRecord};
use crate::parse::extract_labeled_value;

pub use gemini::GeminiClient;
pub use google_news::GoogleNewsSource;
pub use naver::NaverFinanceFetcher;
pub use yahoo::{YahooHistoryProvider, YahooSearchClient};

/// 과거 일봉 시세 Provider.
#[async_trait]
pub trait HistoricalProvider: Send + Sync {
    fn name(&self) -> &str;

    /// 기간 문자열(예: "1y")에 해당하는 일봉을 가져옵니다.
    ///
    /// 날짜는 시장 현지 시간대 기준입니다. 정렬은 보장하지 않습니다.
    async fn history(&self, ticker: &str, market: Market, period: &str) -> SourceResult<Vec<Bar>>;
}

/// 실시간 시세 요약 필드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QuoteField {
    Price,
    Open,
    High,
    Low,
    Volume,
}

impl QuoteField {
    pub const ALL: [QuoteField; 5] = [
        QuoteField::Price,
        QuoteField::Open,
        QuoteField::High,
        QuoteField::Low,
        QuoteField::Volume,
    ];

    /// 시세 요약 텍스트의 라벨.
    pub fn label(&self) -> &'static str {
        match self {
            QuoteField::Price => "현재가",
            QuoteField::Open => "시가",
            QuoteField::High => "고가",
            QuoteField::Low => "저가",
            QuoteField::Volume => "거래량",
        }
    }
}

impl fmt::Display for QuoteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 실시간 시세 원시 값 (쉼표 그룹 숫자 문자열).
///
/// 다섯 필드가 모두 비어 있지 않을 때만 생성됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveQuoteFields {
    values: BTreeMap<QuoteField, String>,
}

impl LiveQuoteFields {
    /// 라벨이 붙은 요약 텍스트에서 다섯 필드를 추출합니다.
    pub fn from_labeled_text(text: &str) -> SourceResult<Self> {
        let mut values = BTreeMap::new();
        for field in QuoteField::ALL {
            let value = extract_labeled_value(text, field.label())
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| SourceError::MissingField(field.label().to_string()))?;
            values.insert(field, value);
        }
        Ok(Self { values })
    }

    /// 필드 값을 직접 지정해 생성합니다.
    pub fn from_values(values: [(QuoteField, &str); 5]) -> SourceResult<Self> {
        let values: BTreeMap<_, _> = values
            .into_iter()
            .map(|(field, v)| (field, v.to_string()))
            .collect();
        for field in QuoteField::ALL {
            match values.get(&field) {
                Some(v) if !v.trim().is_empty() => {}
                _ => return Err(SourceError::MissingField(field.label().to_string())),
            }
        }
        Ok(Self { values })
    }

    pub fn get(&self, field: QuoteField) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or_default()
    }
}

/// 종목 검색 후보.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCandidate {
    pub symbol: String,
    pub exchange: Option<String>,
    pub name: Option<String>,
}

impl SearchCandidate {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            exchange: None,
            name: None,
        }
    }
}

/// 실시간 시세 소스.
#[async_trait]
pub trait LiveQuoteSource: Send + Sync {
    fn name(&self) -> &str;

    /// 종목 코드(접미사 제외)의 시세 요약 필드를 가져옵니다.
    async fn fetch_fields(&self, code: &str) -> SourceResult<LiveQuoteFields>;
}

/// 종목 검색.
#[async_trait]
pub trait SymbolSearch: Send + Sync {
    fn name(&self) -> &str;

    /// 검색 결과를 관련도 순으로 반환합니다.
    async fn search(&self, query: &str) -> SourceResult<Vec<SearchCandidate>>;
}

/// 뉴스 소스.
#[async_trait]
pub trait NewsSource: Send + Sync {
    fn kind(&self) -> NewsSourceKind;

    fn name(&self) -> &str;

    /// 이 소스의 레코드에서 제목/링크를 찾는 규칙.
    fn link_policy(&self) -> &ExtractionPolicy;

    async fn fetch_records(&self, symbol: &Symbol) -> SourceResult<Vec<RawNewsRecord>>;
}

/// LLM 텍스트 생성기.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 텍스트 생성을 지원하는 모델 ID 목록.
    async fn list_models(&self, api_key: &SecretString) -> SourceResult<Vec<String>>;

    /// 프롬프트 하나로 텍스트를 생성합니다.
    async fn generate(
        &self,
        api_key: &SecretString,
        model: &str,
        prompt: &str,
    ) -> SourceResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_from_labeled_text() {
        let text = "현재가 70,000 전일대비 하락 시가 71,000 고가 71,500 저가 69,800 거래량 500,000";
        let fields = LiveQuoteFields::from_labeled_text(text).unwrap();

        assert_eq!(fields.get(QuoteField::Price), "70,000");
        assert_eq!(fields.get(QuoteField::Open), "71,000");
        assert_eq!(fields.get(QuoteField::Volume), "500,000");
    }

    #[test]
    fn test_missing_label_fails() {
        let text = "현재가 70,000 시가 71,000 고가 71,500 저가 69,800";
        let err = LiveQuoteFields::from_labeled_text(text).unwrap_err();
        assert!(matches!(err, SourceError::MissingField(ref f) if f == "거래량"));
    }

    #[test]
    fn test_from_values_rejects_blank() {
        let result = LiveQuoteFields::from_values([
            (QuoteField::Price, "1"),
            (QuoteField::Open, "1"),
            (QuoteField::High, " "),
            (QuoteField::Low, "1"),
            (QuoteField::Volume, "1"),
        ]);
        assert!(result.is_err());
    }
}
