//! 모멘텀 지표 (Momentum Indicators).
//!
//! - RSI (Relative Strength Index)

use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// RSI (Relative Strength Index) 계산.
///
/// RSI = 100 - (100 / (1 + RS))
/// RS = 평균 상승폭 / 평균 하락폭
///
/// 평균은 Wilder 방식 EWM (alpha = 1/period, 첫 값으로 시작)이며
/// 처음 `period - 1`개는 `None`입니다. 평균 하락폭이 0이면 100입니다.
///
/// # 인자
/// * `prices` - 가격 데이터 (종가)
/// * `params` - RSI 파라미터
pub fn rsi(prices: &[f64], params: RsiParams) -> IndicatorResult<Vec<Option<f64>>> {
    let period = params.period;

    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "기간은 0보다 커야 합니다".to_string(),
        ));
    }

    if prices.len() < period {
        return Err(IndicatorError::InsufficientData {
            required: period,
            provided: prices.len(),
        });
    }

    // 첫 번째는 변화 없음
    let deltas: Vec<f64> = std::iter::once(0.0)
        .chain(prices.windows(2).map(|w| w[1] - w[0]))
        .collect();

    let gains: Vec<f64> = deltas.iter().map(|&d| d.max(0.0)).collect();
    let losses: Vec<f64> = deltas.iter().map(|&d| (-d).max(0.0)).collect();

    let alpha = 1.0 / period as f64;
    let avg_gains = ewm(&gains, alpha, period);
    let avg_losses = ewm(&losses, alpha, period);

    let result = avg_gains
        .iter()
        .zip(&avg_losses)
        .map(|pair| match pair {
            (Some(_), Some(loss)) if *loss == 0.0 => Some(100.0),
            (Some(gain), Some(loss)) => Some(100.0 - 100.0 / (1.0 + gain / loss)),
            _ => None,
        })
        .collect();

    Ok(result)
}

/// EWM (Exponential Weighted Mean) 계산.
///
/// y[0] = x[0], y[i] = alpha * x[i] + (1 - alpha) * y[i-1].
/// `min_periods`개가 쌓이기 전에는 `None`.
fn ewm(values: &[f64], alpha: f64, min_periods: usize) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(values.len());
    let mut current = match values.first() {
        Some(&first) => first,
        None => return result,
    };

    for (i, &value) in values.iter().enumerate() {
        if i > 0 {
            current = alpha * value + (1.0 - alpha) * current;
        }
        result.push((i + 1 >= min_periods).then_some(current));
    }

    result
}
