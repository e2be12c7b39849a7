//! AI 분석 리포트 생성.
//!
//! 최근 시세, 지표, 뉴스 제목, 매수 가격을 하나의 프롬프트로 묶어
//! Gemini 모델에 전달합니다. 결과는 항상 문자열이며, 실패는 진단 메시지로 반환됩니다.

use std::sync::Arc;

use analyzer_core::{Bar, LlmConfig, NewsItem, Symbol};
use analyzer_data::TextGenerator;
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::indicators::IndicatorSnapshot;

/// API 키 없이 리포트를 요청했을 때의 메시지.
pub const API_KEY_REQUIRED: &str = "API key is required for AI analysis.";

/// 사용할 수 있는 모델이 없을 때의 메시지.
pub const NO_COMPATIBLE_MODEL: &str =
    "No compatible Gemini model is available. Check the API key permissions.";

/// 리포트 입력 묶음.
#[derive(Debug, Clone)]
pub struct ReportInput<'a> {
    pub symbol: &'a Symbol,
    pub latest: &'a Bar,
    /// 지표를 생략했으면 `None`
    pub indicators: Option<IndicatorSnapshot>,
    pub news: &'a [NewsItem],
    /// 0보다 클 때만 보유 중으로 봅니다
    pub purchase_price: Option<f64>,
}

/// `Latest Close: 70000.00, Volume: 500000`
pub fn price_summary(bar: &Bar) -> String {
    format!("Latest Close: {:.2}, Volume: {}", bar.close, bar.volume)
}

/// `RSI: 55.12, MACD: 1.20, BB High: 80.00, BB Low: 60.00`
pub fn indicator_summary(snapshot: Option<&IndicatorSnapshot>) -> String {
    fn fmt(value: Option<f64>) -> String {
        value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
    }

    let s = snapshot.copied().unwrap_or_default();
    format!(
        "RSI: {}, MACD: {}, BB High: {}, BB Low: {}",
        fmt(s.rsi),
        fmt(s.macd),
        fmt(s.bb_high),
        fmt(s.bb_low)
    )
}

pub fn purchase_context(purchase_price: Option<f64>) -> String {
    match purchase_price.filter(|p| *p > 0.0) {
        Some(price) => format!("Average purchase price: {}", price),
        None => "Not holding yet, considering a new entry".to_string(),
    }
}

/// 발견된 모델을 선호 모델 순서로 정렬합니다.
///
/// 선호 목록에 있고 실제로 발견된 모델이 먼저, 나머지는 발견 순서대로 뒤에 붙습니다.
pub fn order_models(discovered: &[String], preferred: &[String]) -> Vec<String> {
    let mut ordered: Vec<String> = preferred
        .iter()
        .filter(|p| discovered.contains(p))
        .cloned()
        .collect();
    ordered.extend(
        discovered
            .iter()
            .filter(|m| !preferred.contains(m))
            .cloned(),
    );
    ordered
}

/// AI 리포트 생성기.
pub struct ReportAssembler {
    llm: Arc<dyn TextGenerator>,
    preferred_models: Vec<String>,
    fallback_models: Vec<String>,
    language: String,
}

impl ReportAssembler {
    /// LLM 설정의 모델 목록과 응답 언어를 사용합니다.
    pub fn new(llm: Arc<dyn TextGenerator>, config: &LlmConfig) -> Self {
        Self {
            llm,
            preferred_models: config.preferred_models.clone(),
            fallback_models: config.fallback_models.clone(),
            language: config.report_language.clone(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// 프롬프트를 구성합니다.
    pub fn build_prompt(&self, input: &ReportInput<'_>) -> String {
        let news = input
            .news
            .iter()
            .map(NewsItem::title)
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Analyze the following stock: {ticker}\n\
             Current Price Info: {price}\n\
             Investment Context: {context}\n\
             Technical Indicators: {technicals}\n\
             Latest News Summaries:\n{news}\n\n\
             Based on this information, provide:\n\
             1. Short-term trading strategy (1-4 weeks) including a specific **Target Price**.\n\
             2. Long-term trading strategy (6 months+) including a specific **Target Price**.\n\
             3. Overall recommendation (Buy/Hold/Sell/Add/Trim) with reasoning, \
             CONSIDERING the investor's current purchase price.\n   \
             - If the current price is higher than the purchase price, suggest profit-taking levels.\n   \
             - If lower, suggest stop-loss or averaging down strategies.\n\n\
             Respond in {language}. Ensure the \"Target Price\" is clearly visible for each strategy.",
            ticker = input.symbol.ticker(),
            price = price_summary(input.latest),
            context = purchase_context(input.purchase_price),
            technicals = indicator_summary(input.indicators.as_ref()),
            news = news,
            language = self.language,
        )
    }

    /// 시도할 모델 목록.
    ///
    /// 모델 조회가 실패하면 설정된 고정 목록을 사용합니다.
    pub async fn candidate_models(&self, api_key: &SecretString) -> Vec<String> {
        match self.llm.list_models(api_key).await {
            Ok(discovered) => order_models(&discovered, &self.preferred_models),
            Err(e) => {
                warn!(error = %e, "모델 목록 조회 실패, 고정 목록 사용");
                self.fallback_models.clone()
            }
        }
    }

    /// 리포트를 생성합니다. 실패하지 않으며 실패 시 진단 메시지를 반환합니다.
    pub async fn generate(&self, input: &ReportInput<'_>, api_key: Option<&SecretString>) -> String {
        let Some(api_key) = api_key else {
            return API_KEY_REQUIRED.to_string();
        };

        let models = self.candidate_models(api_key).await;
        if models.is_empty() {
            return NO_COMPATIBLE_MODEL.to_string();
        }

        let prompt = self.build_prompt(input);
        let mut last_error = None;

        for model in &models {
            match self.llm.generate(api_key, model, &prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    info!(symbol = input.symbol.ticker(), model = %model, "AI 리포트 생성 완료");
                    return text;
                }
                Ok(_) => debug!(model = %model, "빈 응답, 다음 모델 시도"),
                Err(e) => {
                    debug!(model = %model, error = %e, "생성 실패, 다음 모델 시도");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => format!("AI analysis error: {}", e),
            None => NO_COMPATIBLE_MODEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyzer_data::{SourceError, SourceResult};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MockLlm {
        models: Option<Vec<String>>,
        failing: Vec<String>,
        generated: Mutex<Vec<String>>,
        list_calls: AtomicUsize,
    }

    impl MockLlm {
        fn new(models: Option<&[&str]>, failing: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                models: models.map(|m| m.iter().map(|s| s.to_string()).collect()),
                failing: failing.iter().map(|s| s.to_string()).collect(),
                generated: Mutex::new(Vec::new()),
                list_calls: AtomicUsize::new(0),
            })
        }

        fn tried(&self) -> Vec<String> {
            self.generated.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl TextGenerator for MockLlm {
        async fn list_models(&self, _api_key: &SecretString) -> SourceResult<Vec<String>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.models
                .clone()
                .ok_or_else(|| SourceError::Status {
                    status: 403,
                    message: "forbidden".into(),
                })
        }

        async fn generate(&self, _key: &SecretString, model: &str, prompt: &str) -> SourceResult<String> {
            self.generated.lock().unwrap().push(model.to_string());
            if self.failing.iter().any(|m| m == model) {
                return Err(SourceError::Provider(format!("quota exceeded for {}", model)));
            }
            Ok(format!("[{}] {}", model, prompt.lines().next().unwrap_or_default()))
        }
    }

    fn bar() -> Bar {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        Bar::new(date, 69_000.0, 71_000.0, 68_500.0, 70_000.0, 500_000)
    }

    fn key() -> SecretString {
        SecretString::from("k")
    }

    fn config() -> LlmConfig {
        LlmConfig {
            preferred_models: vec!["models/pro".into(), "models/flash".into()],
            fallback_models: vec!["models/fixed".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_summaries() {
        assert_eq!(price_summary(&bar()), "Latest Close: 70000.00, Volume: 500000");
        assert_eq!(
            indicator_summary(None),
            "RSI: n/a, MACD: n/a, BB High: n/a, BB Low: n/a"
        );

        let snapshot = IndicatorSnapshot {
            rsi: Some(55.123),
            macd: Some(-1.2),
            bb_high: Some(80.0),
            ..Default::default()
        };
        assert_eq!(
            indicator_summary(Some(&snapshot)),
            "RSI: 55.12, MACD: -1.20, BB High: 80.00, BB Low: n/a"
        );
    }

    #[test]
    fn test_purchase_context() {
        assert_eq!(purchase_context(Some(65_000.0)), "Average purchase price: 65000");
        assert!(purchase_context(Some(0.0)).starts_with("Not holding"));
        assert!(purchase_context(None).starts_with("Not holding"));
    }

    #[test]
    fn test_order_models() {
        let discovered = vec!["models/a".to_string(), "models/flash".to_string(), "models/pro".to_string()];
        let preferred = vec!["models/pro".to_string(), "models/flash".to_string(), "models/gone".to_string()];
        assert_eq!(
            order_models(&discovered, &preferred),
            vec!["models/pro", "models/flash", "models/a"]
        );
    }

    #[test]
    fn test_prompt_contents() {
        let llm = MockLlm::new(Some(&[]), &[]);
        let assembler = ReportAssembler::new(llm, &config());
        let symbol = Symbol::new("삼성전자", "005930.KS");
        let bar = bar();
        let news = vec![
            NewsItem::new("Chip demand [Analysis]", analyzer_core::NewsLink::Unresolved, "naver_news").unwrap(),
        ];

        let prompt = assembler.build_prompt(&ReportInput {
            symbol: &symbol,
            latest: &bar,
            indicators: None,
            news: &news,
            purchase_price: Some(65_000.0),
        });

        assert!(prompt.starts_with("Analyze the following stock: 005930.KS"));
        assert!(prompt.contains("Latest Close: 70000.00, Volume: 500000"));
        assert!(prompt.contains("Average purchase price: 65000"));
        assert!(prompt.contains("RSI: n/a"));
        assert!(prompt.contains("Chip demand (Analysis)"));
        assert!(prompt.contains("Respond in Korean."));
    }

    #[tokio::test]
    async fn test_missing_key_is_diagnostic() {
        let llm = MockLlm::new(Some(&["models/pro"]), &[]);
        let assembler = ReportAssembler::new(llm.clone(), &config());
        let symbol = Symbol::new("AAPL", "AAPL");
        let bar = bar();
        let input = ReportInput {
            symbol: &symbol,
            latest: &bar,
            indicators: None,
            news: &[],
            purchase_price: None,
        };

        assert_eq!(assembler.generate(&input, None).await, API_KEY_REQUIRED);
        assert_eq!(llm.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_preferred_model_first_and_failover() {
        let llm = MockLlm::new(Some(&["models/other", "models/flash", "models/pro"]), &["models/pro"]);
        let assembler = ReportAssembler::new(llm.clone(), &config());
        let symbol = Symbol::new("AAPL", "AAPL");
        let bar = bar();
        let input = ReportInput {
            symbol: &symbol,
            latest: &bar,
            indicators: None,
            news: &[],
            purchase_price: None,
        };

        let text = assembler.generate(&input, Some(&key())).await;

        assert!(text.starts_with("[models/flash]"));
        assert_eq!(llm.tried(), vec!["models/pro", "models/flash"]);
    }

    #[tokio::test]
    async fn test_discovery_failure_uses_fixed_list() {
        let llm = MockLlm::new(None, &[]);
        let assembler = ReportAssembler::new(llm.clone(), &config());
        let symbol = Symbol::new("AAPL", "AAPL");
        let bar = bar();
        let input = ReportInput {
            symbol: &symbol,
            latest: &bar,
            indicators: None,
            news: &[],
            purchase_price: None,
        };

        let text = assembler.generate(&input, Some(&key())).await;

        assert!(text.starts_with("[models/fixed]"));
        assert_eq!(llm.tried(), vec!["models/fixed"]);
    }

    #[tokio::test]
    async fn test_no_models_and_provider_error() {
        let symbol = Symbol::new("AAPL", "AAPL");
        let bar = bar();
        let input = ReportInput {
            symbol: &symbol,
            latest: &bar,
            indicators: None,
            news: &[],
            purchase_price: None,
        };

        let empty = ReportAssembler::new(MockLlm::new(Some(&[]), &[]), &config());
        assert_eq!(empty.generate(&input, Some(&key())).await, NO_COMPATIBLE_MODEL);

        let broken = ReportAssembler::new(MockLlm::new(Some(&["models/pro"]), &["models/pro"]), &config());
        let text = broken.generate(&input, Some(&key())).await;
        assert!(text.starts_with("AI analysis error: "));
        assert!(text.contains("quota exceeded for models/pro"));
    }
}
