//! OHLCV 바와 시계열.
//!
//! - `Bar` - 하루 단위 OHLCV 레코드
//! - `LiveQuote` - 실시간 시세 스냅샷
//! - `Series` - 한 종목의 날짜 오름차순 바 목록

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, AnalyzerResult};

/// 일봉 OHLCV 레코드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// 거래일
    pub date: NaiveDate,
    /// 실시간 시세에서 만들어진 바에만 설정되는 시간대
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<Tz>,
    /// 시가
    pub open: f64,
    /// 고가
    pub high: f64,
    /// 저가
    pub low: f64,
    /// 종가
    pub close: f64,
    /// 거래량
    pub volume: u64,
    /// 배당금
    #[serde(default)]
    pub dividends: f64,
    /// 주식 분할 비율
    #[serde(default)]
    pub stock_splits: f64,
}

impl Bar {
    /// 과거 시세 바를 생성합니다. 보조 필드는 0입니다.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            timezone: None,
            open,
            high,
            low,
            close,
            volume,
            dividends: 0.0,
            stock_splits: 0.0,
        }
    }

    /// 시간대를 지정합니다.
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.timezone = Some(tz);
        self
    }

    /// 가격/거래량 필드를 실시간 시세 값으로 교체한 바를 반환합니다.
    ///
    /// 날짜와 보조 필드(배당/분할)는 유지되고, 시간대는 시세 시장의 것으로 설정됩니다.
    pub fn overlaid_with(&self, quote: &LiveQuote, tz: Tz) -> Self {
        Self {
            timezone: Some(tz),
            open: quote.open,
            high: quote.high,
            low: quote.low,
            close: quote.price,
            volume: quote.volume,
            ..self.clone()
        }
    }
}

/// 실시간 시세 스냅샷 (현재가, 당일 시가/고가/저가/거래량).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveQuote {
    /// 현재가
    pub price: f64,
    /// 당일 시가
    pub open: f64,
    /// 당일 고가
    pub high: f64,
    /// 당일 저가
    pub low: f64,
    /// 당일 누적 거래량
    pub volume: u64,
}

impl LiveQuote {
    /// 주어진 거래일의 새 바로 변환합니다.
    pub fn to_bar(&self, date: NaiveDate, tz: Tz) -> Bar {
        Bar::new(date, self.open, self.high, self.low, self.price, self.volume).with_timezone(tz)
    }
}

/// 한 종목의 일봉 시계열.
///
/// 날짜는 항상 엄격한 오름차순이며 중복이 없습니다.
/// 생성 이후 변경은 `push_bar`(추가)와 `replace_last`(마지막 바 교체)로만 가능합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    ticker: String,
    bars: Vec<Bar>,
}

impl Series {
    /// 빈 시계열을 생성합니다.
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            bars: Vec::new(),
        }
    }

    /// 정렬되지 않았거나 중복 날짜가 있는 바 목록으로 시계열을 생성합니다.
    ///
    /// 날짜순으로 정렬하고, 같은 날짜가 여러 번 나오면 마지막 바를 남깁니다.
    pub fn from_unordered(ticker: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.date);

        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }

        Self {
            ticker: ticker.into(),
            bars: deduped,
        }
    }

    /// 종목 티커.
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// 바 목록.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 마지막 바.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// 종가 목록.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// 새 바를 끝에 추가합니다.
    ///
    /// 마지막 바보다 늦은 날짜가 아니면 거부합니다.
    pub fn push_bar(&mut self, bar: Bar) -> AnalyzerResult<()> {
        if let Some(last) = self.bars.last() {
            if bar.date <= last.date {
                return Err(AnalyzerError::InvalidInput(format!(
                    "{}: bar {} is not after last bar {}",
                    self.ticker, bar.date, last.date
                )));
            }
        }
        self.bars.push(bar);
        Ok(())
    }

    /// 마지막 바를 통째로 교체하고 이전 바를 반환합니다.
    ///
    /// 교체 후에도 날짜 오름차순이 유지되어야 합니다.
    pub fn replace_last(&mut self, bar: Bar) -> AnalyzerResult<Bar> {
        let len = self.bars.len();
        if len == 0 {
            return Err(AnalyzerError::InvalidInput(format!(
                "{}: cannot replace last bar of an empty series",
                self.ticker
            )));
        }
        if len >= 2 && bar.date <= self.bars[len - 2].date {
            return Err(AnalyzerError::InvalidInput(format!(
                "{}: replacement bar {} would break ordering",
                self.ticker, bar.date
            )));
        }
        Ok(std::mem::replace(&mut self.bars[len - 1], bar))
    }

    /// 날짜가 엄격한 오름차순인지 확인합니다.
    pub fn is_strictly_increasing(&self) -> bool {
        self.bars.windows(2).all(|w| w[0].date < w[1].date)
    }

    /// 바 목록을 소유권과 함께 반환합니다.
    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }
}
