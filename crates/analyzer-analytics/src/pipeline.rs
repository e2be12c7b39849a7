//! 분석 파이프라인.
//!
//! 한 번의 분석은 다음 단계를 순서대로 실행합니다:
//!
//! 1. 티커 해석 (`TickerResolver`)
//! 2. 과거 시세 수집 + 실시간 시세 보완 (`PriceReconciler`, 실패 시 중단)
//! 3. 지표 계산 (바가 부족하면 생략)
//! 4. 뉴스 수집 (`NewsAggregator`)
//! 5. AI 리포트 (API 키가 있을 때만)
//!
//! 단계 사이에 공유 상태는 없으며, 실행 간에도 상태를 남기지 않습니다.

use std::sync::Arc;

use analyzer_core::{
    analysis_span, AnalyzerConfig, AnalyzerResult, Bar, MarketClock, NewsItem, Series, Symbol,
    SystemClock,
};
use analyzer_data::{
    GeminiClient, GoogleNewsSource, HistoricalProvider, LiveQuoteSource, NaverFinanceFetcher,
    NewsAggregator, NewsSource, PriceReconciler, SymbolSearch, TextGenerator, TickerResolver,
    YahooHistoryProvider, YahooSearchClient,
};
use secrecy::SecretString;
use serde::Serialize;
use tracing::{info, warn, Instrument};

use crate::indicators::{IndicatorCalculator, IndicatorColumns, IndicatorSnapshot};
use crate::report::{ReportAssembler, ReportInput};

/// 분석 요청.
#[derive(Debug, Default)]
pub struct AnalysisRequest {
    /// 종목명, 종목코드 또는 티커
    pub raw_input: String,
    /// 조회 기간 (없으면 설정 기본값)
    pub period: Option<String>,
    /// 평균 매수 가격 (0 이하이면 미보유로 간주)
    pub purchase_price: Option<f64>,
    /// Gemini API 키
    pub api_key: Option<SecretString>,
}

impl AnalysisRequest {
    pub fn new(raw_input: impl Into<String>) -> Self {
        Self {
            raw_input: raw_input.into(),
            ..Default::default()
        }
    }

    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }

    pub fn with_purchase_price(mut self, price: f64) -> Self {
        self.purchase_price = Some(price);
        self
    }

    pub fn with_api_key(mut self, api_key: Option<SecretString>) -> Self {
        self.api_key = api_key;
        self
    }
}

/// 분석 결과.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub symbol: Symbol,
    pub series: Series,
    /// 바가 부족해 생략했으면 `None`
    pub indicators: Option<IndicatorColumns>,
    /// 마지막 바의 지표 값
    pub latest_indicators: Option<IndicatorSnapshot>,
    pub news: Vec<NewsItem>,
    /// 뉴스가 없을 때 안내할 종목 뉴스 페이지
    pub news_fallback_url: String,
    /// API 키가 없으면 `None`
    pub narrative: Option<String>,
}

impl AnalysisReport {
    /// 마지막 바.
    pub fn latest_bar(&self) -> Option<&Bar> {
        self.series.last()
    }
}

/// 분석 파이프라인.
pub struct AnalysisPipeline {
    resolver: TickerResolver,
    reconciler: PriceReconciler,
    news: NewsAggregator,
    calculator: IndicatorCalculator,
    report: ReportAssembler,
    default_period: String,
}

impl AnalysisPipeline {
    /// 구성 요소를 직접 지정해 생성합니다.
    pub fn new(
        resolver: TickerResolver,
        reconciler: PriceReconciler,
        news: NewsAggregator,
        report: ReportAssembler,
    ) -> Self {
        Self {
            resolver,
            reconciler,
            news,
            calculator: IndicatorCalculator::default(),
            report,
            default_period: "1y".to_string(),
        }
    }

    pub fn with_calculator(mut self, calculator: IndicatorCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn with_default_period(mut self, period: impl Into<String>) -> Self {
        self.default_period = period.into();
        self
    }

    /// trait 객체로 주입된 소스와 시계로 파이프라인을 구성합니다.
    ///
    /// 실제 구성에서는 같은 Yahoo 클라이언트가 `search`와 `news_sources`에,
    /// 같은 네이버 클라이언트가 `live`와 `korean_news`에 들어갑니다.
    #[allow(clippy::too_many_arguments)]
    pub fn with_sources(
        config: &AnalyzerConfig,
        history: Arc<dyn HistoricalProvider>,
        live: Arc<dyn LiveQuoteSource>,
        search: Arc<dyn SymbolSearch>,
        news_sources: Vec<Arc<dyn NewsSource>>,
        korean_news: Arc<dyn NewsSource>,
        llm: Arc<dyn TextGenerator>,
        clock: Arc<dyn MarketClock>,
    ) -> Self {
        let resolver = TickerResolver::new(search)
            .with_llm(llm.clone(), config.llm.resolver_model.clone())
            .with_max_ticker_len(config.llm.max_ticker_len);

        let reconciler = PriceReconciler::new(history, live, clock);

        let news = NewsAggregator::with_priority(&config.sources.priority, news_sources, korean_news)
            .with_limit(config.sources.news_limit)
            .with_naver_base_url(config.sources.naver_base_url.clone());

        let report = ReportAssembler::new(llm, &config.llm);

        Self::new(resolver, reconciler, news, report)
            .with_calculator(IndicatorCalculator::new(config.analysis.min_bars_for_indicators))
            .with_default_period(config.analysis.default_period.clone())
    }

    /// 설정으로 실제 HTTP 소스를 생성해 파이프라인을 구성합니다.
    pub fn from_config(config: &AnalyzerConfig) -> AnalyzerResult<Self> {
        let http = &config.http;
        let sources = &config.sources;

        let history = Arc::new(YahooHistoryProvider::new()?);
        let yahoo = Arc::new(YahooSearchClient::new(http, sources.yahoo_search_url.clone())?);
        let google = Arc::new(GoogleNewsSource::new(
            http,
            sources.google_news_url.clone(),
            &sources.preferred_news_domains,
        )?);
        let naver = Arc::new(NaverFinanceFetcher::new(http, sources.naver_base_url.clone())?);
        let gemini = Arc::new(GeminiClient::new(http, config.llm.base_url.clone())?);

        info!(
            yahoo = %sources.yahoo_search_url,
            naver = %sources.naver_base_url,
            google = %sources.google_news_url,
            "분석 파이프라인 구성"
        );

        let news_sources: Vec<Arc<dyn NewsSource>> = vec![yahoo.clone(), google];

        Ok(Self::with_sources(
            config,
            history,
            naver.clone(),
            yahoo,
            news_sources,
            naver,
            gemini,
            Arc::new(SystemClock),
        ))
    }

    pub fn resolver(&self) -> &TickerResolver {
        &self.resolver
    }

    pub fn reconciler(&self) -> &PriceReconciler {
        &self.reconciler
    }

    pub fn news(&self) -> &NewsAggregator {
        &self.news
    }

    pub fn default_period(&self) -> &str {
        &self.default_period
    }

    /// 분석 한 건을 실행합니다.
    ///
    /// 시세가 비어 있으면(`NoData`) 이후 단계를 실행하지 않고 에러를 반환합니다.
    /// 다른 단계의 실패는 결과 안에서 빈 값이나 진단 메시지로 나타납니다.
    pub async fn run(&self, request: &AnalysisRequest) -> AnalyzerResult<AnalysisReport> {
        let symbol = self
            .resolver
            .resolve(&request.raw_input, request.api_key.as_ref())
            .await;
        let span = analysis_span!("analysis", symbol.ticker());

        self.analyze(symbol, request).instrument(span).await
    }

    async fn analyze(&self, symbol: Symbol, request: &AnalysisRequest) -> AnalyzerResult<AnalysisReport> {
        let period = request.period.as_deref().unwrap_or(&self.default_period);
        let series = self.reconciler.fetch_and_patch(&symbol, period).await?;

        let indicators = match self.calculator.compute(&series) {
            Ok(columns) => columns,
            Err(e) => {
                warn!(error = %e, "지표 계산 실패, 지표 생략");
                None
            }
        };
        if indicators.is_none() {
            info!(
                bars = series.len(),
                required = self.calculator.min_bars(),
                "지표 생략"
            );
        }
        let latest_indicators = indicators.as_ref().map(IndicatorColumns::latest);

        let news = self.news.fetch_news(&symbol).await;
        let news_fallback_url = self.news.fallback_url(&symbol);

        let narrative = match (request.api_key.as_ref(), series.last()) {
            (Some(key), Some(latest)) => {
                let input = ReportInput {
                    symbol: &symbol,
                    latest,
                    indicators: latest_indicators,
                    news: &news,
                    purchase_price: request.purchase_price,
                };
                Some(self.report.generate(&input, Some(key)).await)
            }
            _ => None,
        };

        info!(
            bars = series.len(),
            news = news.len(),
            narrative = narrative.is_some(),
            "분석 완료"
        );

        Ok(AnalysisReport {
            symbol,
            series,
            indicators,
            latest_indicators,
            news,
            news_fallback_url,
            narrative,
        })
    }
}
