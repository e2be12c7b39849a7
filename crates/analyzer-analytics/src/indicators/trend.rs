//! 추세 지표 (Trend Indicators).
//!
//! - MACD (Moving Average Convergence Divergence)

use serde::{Deserialize, Serialize};
use ta::indicators::ExponentialMovingAverage;
use ta::Next;

use super::{IndicatorError, IndicatorResult};

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 EMA 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// MACD 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    /// MACD 라인 (단기 EMA - 장기 EMA).
    pub macd: Option<f64>,
    /// 시그널 라인 (MACD의 EMA).
    pub signal: Option<f64>,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: Option<f64>,
}

fn ema(period: usize) -> IndicatorResult<ExponentialMovingAverage> {
    ExponentialMovingAverage::new(period)
        .map_err(|e| IndicatorError::InvalidParameter(format!("EMA({}): {:?}", period, e)))
}

/// MACD 계산.
///
/// 단기/장기 EMA는 첫 가격부터 누적하고, 장기 기간이 채워진 시점
/// (`slow_period - 1`)부터 MACD를 냅니다. 시그널 EMA는 첫 MACD 값부터 누적하여
/// `signal_period`개가 쌓인 뒤부터 냅니다.
///
/// # 인자
/// * `prices` - 가격 데이터 (종가)
/// * `params` - MACD 파라미터
pub fn macd(prices: &[f64], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
    if params.fast_period >= params.slow_period {
        return Err(IndicatorError::InvalidParameter(
            "단기 기간은 장기 기간보다 작아야 합니다".to_string(),
        ));
    }

    let mut fast = ema(params.fast_period)?;
    let mut slow = ema(params.slow_period)?;
    let mut signal = ema(params.signal_period)?;

    let first_macd = params.slow_period - 1;
    let first_signal = first_macd + params.signal_period - 1;

    let result = prices
        .iter()
        .enumerate()
        .map(|(i, &price)| {
            let fast_value = fast.next(price);
            let slow_value = slow.next(price);

            if i < first_macd {
                return MacdResult::default();
            }

            let macd_value = fast_value - slow_value;
            let signal_value = signal.next(macd_value);

            if i < first_signal {
                MacdResult {
                    macd: Some(macd_value),
                    ..Default::default()
                }
            } else {
                MacdResult {
                    macd: Some(macd_value),
                    signal: Some(signal_value),
                    histogram: Some(macd_value - signal_value),
                }
            }
        })
        .collect();

    Ok(result)
}
