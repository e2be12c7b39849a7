//! 과거 시세와 실시간 시세 정합화.
//!
//! Yahoo Finance 일봉에 네이버 금융 당일 시세를 덮어써서 하나의 시계열을 만듭니다.
//!
//! | 마지막 바 날짜 | 동작 |
//! |---|---|
//! | (없음) | 오늘 날짜 바 하나로 시계열 생성 |
//! | 오늘 | 마지막 바 교체 (배당/분할 유지) |
//! | 오늘 이전 | 오늘 날짜 바 추가 |
//! | 오늘 이후 | 변경 없음 (경고) |

use std::sync::Arc;

use analyzer_core::{AnalyzerError, AnalyzerResult, LiveQuote, MarketClock, Series, Symbol};
use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::error::SourceResult;
use crate::parse::{parse_grouped_f64, parse_grouped_u64};
use crate::provider::{HistoricalProvider, LiveQuoteFields, LiveQuoteSource, QuoteField};

/// Yahoo Finance 조회 기간.
pub const LOOKBACK_PERIODS: [&str; 11] = [
    "1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max",
];

/// 실시간 시세 병합 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// 빈 시계열에 오늘 바 하나 생성
    Created,
    /// 마지막 바(오늘) 교체
    Overwritten,
    /// 오늘 바 추가
    Appended,
    /// 과거 시세가 오늘보다 미래 날짜로 끝나 병합하지 않음
    SkippedFutureHistory,
}

/// 원시 시세 필드를 숫자로 변환합니다.
pub fn parse_live_quote(fields: &LiveQuoteFields) -> SourceResult<LiveQuote> {
    Ok(LiveQuote {
        price: parse_grouped_f64(fields.get(QuoteField::Price))?,
        open: parse_grouped_f64(fields.get(QuoteField::Open))?,
        high: parse_grouped_f64(fields.get(QuoteField::High))?,
        low: parse_grouped_f64(fields.get(QuoteField::Low))?,
        volume: parse_grouped_u64(fields.get(QuoteField::Volume))?,
    })
}

/// 실시간 시세를 시계열에 병합합니다. I/O가 없는 순수 함수입니다.
pub fn merge_live_quote(
    series: &mut Series,
    quote: &LiveQuote,
    today: NaiveDate,
    tz: Tz,
) -> AnalyzerResult<MergeOutcome> {
    let Some(last) = series.last() else {
        series.push_bar(quote.to_bar(today, tz))?;
        return Ok(MergeOutcome::Created);
    };

    if last.date == today {
        let patched = last.overlaid_with(quote, tz);
        series.replace_last(patched)?;
        Ok(MergeOutcome::Overwritten)
    } else if last.date < today {
        series.push_bar(quote.to_bar(today, tz))?;
        Ok(MergeOutcome::Appended)
    } else {
        warn!(
            symbol = series.ticker(),
            last_date = %last.date,
            today = %today,
            "과거 시세 마지막 날짜가 오늘 이후, 실시간 시세 병합 생략"
        );
        Ok(MergeOutcome::SkippedFutureHistory)
    }
}

/// 과거 시세 + 실시간 시세 정합화기.
pub struct PriceReconciler {
    history: Arc<dyn HistoricalProvider>,
    live: Arc<dyn LiveQuoteSource>,
    clock: Arc<dyn MarketClock>,
}

impl PriceReconciler {
    pub fn new(
        history: Arc<dyn HistoricalProvider>,
        live: Arc<dyn LiveQuoteSource>,
        clock: Arc<dyn MarketClock>,
    ) -> Self {
        Self {
            history,
            live,
            clock,
        }
    }

    /// 과거 시세를 가져오고, 한국 종목이면 당일 시세로 보완합니다.
    ///
    /// 결과 시계열은 1개 이상의 바를 가지며 날짜가 엄격히 증가합니다.
    /// 그렇지 못하면 `NoData` 오류를 반환합니다. 과거 시세 조회 실패와
    /// 실시간 시세 실패는 로그만 남깁니다.
    pub async fn fetch_and_patch(&self, symbol: &Symbol, period: &str) -> AnalyzerResult<Series> {
        if !LOOKBACK_PERIODS.contains(&period) {
            return Err(AnalyzerError::InvalidInput(format!(
                "지원하지 않는 조회 기간: {} (가능: {})",
                period,
                LOOKBACK_PERIODS.join(", ")
            )));
        }

        let ticker = symbol.ticker();
        let market = symbol.market();

        // 알 수 없는 티커는 404로 돌아오므로 조회 실패도 빈 시세로 취급
        let bars = match self.history.history(ticker, market, period).await {
            Ok(bars) => bars,
            Err(e) => {
                warn!(symbol = ticker, source = self.history.name(), error = %e, "과거 시세 조회 실패");
                Vec::new()
            }
        };

        let mut series = Series::from_unordered(ticker, bars);
        debug!(symbol = ticker, bars = series.len(), "과거 시세 수집");

        if symbol.is_korean() {
            self.patch_with_live_quote(symbol, &mut series).await;
        }

        if series.is_empty() {
            return Err(AnalyzerError::NoData(ticker.to_string()));
        }

        Ok(series)
    }

    async fn patch_with_live_quote(&self, symbol: &Symbol, series: &mut Series) {
        let ticker = symbol.ticker();
        let code = symbol.base_code();

        let quote = match self.live.fetch_fields(code).await.and_then(|f| parse_live_quote(&f)) {
            Ok(quote) => quote,
            Err(e) => {
                warn!(symbol = ticker, source = self.live.name(), error = %e, "실시간 시세 보완 실패");
                return;
            }
        };

        let market = symbol.market();
        let today = self.clock.today(market);

        match merge_live_quote(series, &quote, today, market.timezone()) {
            Ok(outcome) => {
                info!(symbol = ticker, outcome = ?outcome, price = quote.price, "실시간 시세 병합");
            }
            Err(e) => {
                warn!(symbol = ticker, error = %e, "실시간 시세 병합 실패");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use analyzer_core::{Bar, FixedClock, Market};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn series(days: &[u32]) -> Series {
        let bars = days
            .iter()
            .map(|&d| {
                let mut bar = Bar::new(date(d), 100.0, 110.0, 90.0, 105.0, 1_000);
                bar.dividends = 0.5;
                bar
            })
            .collect();
        Series::from_unordered("005930.KS", bars)
    }

    fn quote() -> LiveQuote {
        LiveQuote {
            price: 70_000.0,
            open: 69_000.0,
            high: 71_000.0,
            low: 68_500.0,
            volume: 500_000,
        }
    }

    const SEOUL: Tz = chrono_tz::Asia::Seoul;

    #[test]
    fn test_merge_into_empty_series() {
        let mut s = Series::new("005930.KS");
        let outcome = merge_live_quote(&mut s, &quote(), date(10), SEOUL).unwrap();

        assert_eq!(outcome, MergeOutcome::Created);
        assert_eq!(s.len(), 1);
        assert_eq!(s.last().unwrap().close, 70_000.0);
        assert_eq!(s.last().unwrap().timezone, Some(SEOUL));
    }

    #[test]
    fn test_merge_same_day_overwrites() {
        let mut s = series(&[8, 9, 10]);
        let outcome = merge_live_quote(&mut s, &quote(), date(10), SEOUL).unwrap();

        assert_eq!(outcome, MergeOutcome::Overwritten);
        assert_eq!(s.len(), 3);
        let last = s.last().unwrap();
        assert_eq!(last.date, date(10));
        assert_eq!(last.close, 70_000.0);
        assert_eq!(last.volume, 500_000);
        assert_eq!(last.dividends, 0.5);
        assert_eq!(last.timezone, Some(SEOUL));
    }

    #[test]
    fn test_merge_new_day_appends() {
        let mut s = series(&[8, 9]);
        let before = s.bars().to_vec();
        let outcome = merge_live_quote(&mut s, &quote(), date(10), SEOUL).unwrap();

        assert_eq!(outcome, MergeOutcome::Appended);
        assert_eq!(s.len(), 3);
        assert_eq!(&s.bars()[..2], before.as_slice());
        assert_eq!(s.last().unwrap().dividends, 0.0);
        assert!(s.is_strictly_increasing());
    }

    #[test]
    fn test_merge_future_history_is_noop() {
        let mut s = series(&[9, 11]);
        let before = s.clone();
        let outcome = merge_live_quote(&mut s, &quote(), date(10), SEOUL).unwrap();

        assert_eq!(outcome, MergeOutcome::SkippedFutureHistory);
        assert_eq!(s, before);
    }

    #[test]
    fn test_merge_is_idempotent_within_a_day() {
        let mut once = series(&[8, 9]);
        merge_live_quote(&mut once, &quote(), date(10), SEOUL).unwrap();

        let mut twice = once.clone();
        merge_live_quote(&mut twice, &quote(), date(10), SEOUL).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_parse_live_quote() {
        let fields = LiveQuoteFields::from_values([
            (QuoteField::Price, "70,000"),
            (QuoteField::Open, "69,000"),
            (QuoteField::High, "71,000"),
            (QuoteField::Low, "68,500"),
            (QuoteField::Volume, "500,000"),
        ])
        .unwrap();

        assert_eq!(parse_live_quote(&fields).unwrap(), quote());
    }

    #[test]
    fn test_parse_live_quote_rejects_garbage() {
        let fields = LiveQuoteFields::from_values([
            (QuoteField::Price, "70,000"),
            (QuoteField::Open, "69,000"),
            (QuoteField::High, "71,000"),
            (QuoteField::Low, "68,500"),
            (QuoteField::Volume, "1.5"),
        ])
        .unwrap();

        assert!(parse_live_quote(&fields).is_err());
    }

    struct FailingHistory;

    #[async_trait::async_trait]
    impl HistoricalProvider for FailingHistory {
        fn name(&self) -> &str {
            "failing_history"
        }

        async fn history(&self, _ticker: &str, _market: Market, _period: &str) -> SourceResult<Vec<Bar>> {
            Err(SourceError::Provider("failed: 404".into()))
        }
    }

    struct StaticLive {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl LiveQuoteSource for StaticLive {
        fn name(&self) -> &str {
            "static_live"
        }

        async fn fetch_fields(&self, code: &str) -> SourceResult<LiveQuoteFields> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(code, "450080");
            LiveQuoteFields::from_values([
                (QuoteField::Price, "70,000"),
                (QuoteField::Open, "69,000"),
                (QuoteField::High, "71,000"),
                (QuoteField::Low, "68,500"),
                (QuoteField::Volume, "500,000"),
            ])
        }
    }

    fn reconciler_without_history() -> (PriceReconciler, Arc<StaticLive>) {
        let live = Arc::new(StaticLive {
            calls: AtomicUsize::new(0),
        });
        let reconciler = PriceReconciler::new(
            Arc::new(FailingHistory),
            live.clone(),
            Arc::new(FixedClock(date(10))),
        );
        (reconciler, live)
    }

    #[tokio::test]
    async fn test_history_failure_still_patches_korean_symbol() {
        let (reconciler, live) = reconciler_without_history();
        let symbol = Symbol::new("450080", "450080.KQ");

        let s = reconciler.fetch_and_patch(&symbol, "1y").await.unwrap();

        assert_eq!(live.calls.load(Ordering::SeqCst), 1);
        assert_eq!(s.len(), 1);
        let bar = s.last().unwrap();
        assert_eq!(bar.date, date(10));
        assert_eq!(bar.close, 70_000.0);
        assert_eq!(bar.volume, 500_000);
    }

    #[tokio::test]
    async fn test_history_failure_on_us_symbol_is_no_data() {
        let (reconciler, live) = reconciler_without_history();
        let symbol = Symbol::new("ZZZZINVALID", "ZZZZINVALID");

        let err = reconciler.fetch_and_patch(&symbol, "1y").await.unwrap_err();

        assert!(matches!(err, AnalyzerError::NoData(ref t) if t == "ZZZZINVALID"));
        assert_eq!(err.to_string(), "No data found for ZZZZINVALID");
        assert_eq!(live.calls.load(Ordering::SeqCst), 0);
    }
}
