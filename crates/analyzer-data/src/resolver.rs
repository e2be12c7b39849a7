//! 티커 해석.
//!
//! 사용자 입력(종목명, 종목코드, 티커)을 시장 접미사가 붙은 티커로 변환합니다.
//!
//! 해석 순서 (앞 단계가 성공하면 중단):
//! 1. 6자리 숫자 → `.KS` 접미사 (네트워크 호출 없음)
//! 2. 티커 모양(`.` 포함 또는 1~5자 ASCII 대문자) → 그대로
//! 3. 종목 검색 (한글 이름이면 `.KS`/`.KQ` 후보 우선)
//! 4. LLM 질의 (API 키가 있을 때만)
//! 5. 입력 그대로
//!
//! 어떤 단계의 오류도 전파하지 않고 다음 단계로 넘어갑니다.

use std::sync::Arc;

use analyzer_core::{has_korean_suffix, Symbol, PRIMARY_KR_SUFFIX};
use async_trait::async_trait;
use secrecy::SecretString;
use tracing::{info, warn};

use crate::fallback::{Attempt, FallbackChain, FallbackStep};
use crate::parse::contains_hangul;
use crate::provider::{SearchCandidate, SymbolSearch, TextGenerator};

/// LLM 응답으로 받아들이는 티커 최대 길이.
pub const DEFAULT_MAX_TICKER_LEN: usize = 10;

/// 한국 종목코드(6자리 숫자)인지 확인합니다.
pub fn is_numeric_code(input: &str) -> bool {
    input.len() == 6 && input.bytes().all(|b| b.is_ascii_digit())
}

/// 이미 티커 모양인지 확인합니다.
///
/// `.`을 포함하거나, 1~5자의 ASCII 대문자로만 이루어지면 티커로 봅니다.
/// "LG전자"처럼 영문 접두어가 붙은 한글 종목명은 검색 단계로 넘어갑니다.
pub fn is_ticker_shaped(input: &str) -> bool {
    input.contains('.')
        || ((1..=5).contains(&input.len()) && input.bytes().all(|b| b.is_ascii_uppercase()))
}

/// 검색 후보 중 하나를 고릅니다.
///
/// 한글 이름은 한국 거래소 후보를 우선하고, 없으면 첫 후보입니다.
pub fn pick_candidate<'c>(name: &str, candidates: &'c [SearchCandidate]) -> Option<&'c SearchCandidate> {
    if contains_hangul(name) {
        if let Some(kr) = candidates.iter().find(|c| has_korean_suffix(&c.symbol)) {
            return Some(kr);
        }
    }
    candidates.first()
}

fn llm_prompt(name: &str) -> String {
    format!(
        "Find the stock ticker for company '{}'. Respond ONLY with the ticker symbol \
         (e.g. 005930.KS or AAPL). If it's a Korean company, ensure it ends with .KS or .KQ.",
        name
    )
}

struct NumericCodeStep;

#[async_trait]
impl FallbackStep<str, String> for NumericCodeStep {
    fn name(&self) -> &str {
        "numeric_code"
    }

    async fn attempt(&self, input: &str) -> Attempt<String> {
        if is_numeric_code(input) {
            Attempt::Hit(format!("{}{}", input, PRIMARY_KR_SUFFIX))
        } else {
            Attempt::miss("6자리 숫자 아님")
        }
    }
}

struct TickerShapeStep;

#[async_trait]
impl FallbackStep<str, String> for TickerShapeStep {
    fn name(&self) -> &str {
        "ticker_shape"
    }

    async fn attempt(&self, input: &str) -> Attempt<String> {
        if is_ticker_shaped(input) {
            Attempt::Hit(input.to_string())
        } else {
            Attempt::miss("티커 모양 아님")
        }
    }
}

struct SearchStep<'a> {
    search: &'a dyn SymbolSearch,
}

#[async_trait]
impl<'a> FallbackStep<str, String> for SearchStep<'a> {
    fn name(&self) -> &str {
        self.search.name()
    }

    async fn attempt(&self, input: &str) -> Attempt<String> {
        match self.search.search(input).await {
            Ok(candidates) => match pick_candidate(input, &candidates) {
                Some(c) => Attempt::Hit(c.symbol.clone()),
                None => Attempt::miss("검색 결과 없음"),
            },
            Err(e) => {
                warn!(query = input, error = %e, "종목 검색 실패");
                Attempt::miss(e.to_string())
            }
        }
    }
}

struct LlmStep<'a> {
    llm: &'a dyn TextGenerator,
    api_key: &'a SecretString,
    model: &'a str,
    max_len: usize,
}

#[async_trait]
impl<'a> FallbackStep<str, String> for LlmStep<'a> {
    fn name(&self) -> &str {
        "llm"
    }

    async fn attempt(&self, input: &str) -> Attempt<String> {
        match self.llm.generate(self.api_key, self.model, &llm_prompt(input)).await {
            Ok(text) => {
                let ticker = text.trim();
                if ticker.is_empty() || ticker.chars().count() > self.max_len {
                    Attempt::miss(format!("부적절한 LLM 응답: {:?}", ticker))
                } else {
                    Attempt::Hit(ticker.to_string())
                }
            }
            Err(e) => {
                warn!(query = input, error = %e, "LLM 티커 질의 실패");
                Attempt::miss(e.to_string())
            }
        }
    }
}

/// 티커 해석기.
pub struct TickerResolver {
    search: Arc<dyn SymbolSearch>,
    llm: Option<Arc<dyn TextGenerator>>,
    llm_model: String,
    max_ticker_len: usize,
}

impl TickerResolver {
    pub fn new(search: Arc<dyn SymbolSearch>) -> Self {
        Self {
            search,
            llm: None,
            llm_model: "models/gemini-1.5-flash".to_string(),
            max_ticker_len: DEFAULT_MAX_TICKER_LEN,
        }
    }

    /// LLM 폴백을 설정합니다.
    pub fn with_llm(mut self, llm: Arc<dyn TextGenerator>, model: impl Into<String>) -> Self {
        self.llm = Some(llm);
        self.llm_model = model.into();
        self
    }

    pub fn with_max_ticker_len(mut self, max_len: usize) -> Self {
        self.max_ticker_len = max_len;
        self
    }

    /// 입력을 티커로 해석합니다. 실패하지 않습니다.
    pub async fn resolve(&self, raw: &str, api_key: Option<&SecretString>) -> Symbol {
        let name = raw.trim();

        let llm_step = match (&self.llm, api_key) {
            (Some(llm), Some(key)) if name.chars().count() > 1 => Some(LlmStep {
                llm: llm.as_ref(),
                api_key: key,
                model: &self.llm_model,
                max_len: self.max_ticker_len,
            }),
            _ => None,
        };

        let mut chain: FallbackChain<'_, str, String> = FallbackChain::new("ticker_resolver")
            .step(NumericCodeStep)
            .step(TickerShapeStep)
            .step(SearchStep {
                search: self.search.as_ref(),
            });
        if let Some(step) = llm_step {
            chain = chain.step(step);
        }

        let outcome = chain.run(name).await;
        match outcome.value {
            Some(ticker) => {
                info!(
                    input = name,
                    ticker = %ticker,
                    step = outcome.selected.as_deref().unwrap_or_default(),
                    "티커 해석 완료"
                );
                Symbol::new(raw, ticker)
            }
            None => {
                info!(input = name, tried = ?outcome.tried, "티커 해석 실패, 입력 그대로 사용");
                Symbol::passthrough(raw)
            }
        }
    }
}
