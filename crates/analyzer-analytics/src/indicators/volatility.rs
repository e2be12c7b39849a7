//! 변동성 지표 (Volatility Indicators).
//!
//! - Bollinger Bands

use serde::{Deserialize, Serialize};
use ta::indicators::BollingerBands;
use ta::Next;

use super::{IndicatorError, IndicatorResult};

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerBandsParams {
    /// 기간 (기본: 20).
    pub period: usize,
    /// 표준편차 배수 (기본: 2.0).
    pub std_dev_multiplier: f64,
}

impl Default for BollingerBandsParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

/// 볼린저 밴드 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerBandsResult {
    /// 상단 밴드.
    pub upper: Option<f64>,
    /// 중간 밴드 (이동평균).
    pub middle: Option<f64>,
    /// 하단 밴드.
    pub lower: Option<f64>,
}

/// 볼린저 밴드 계산.
///
/// 상단 밴드 = MA + (k × σ)
/// 중간 밴드 = MA (이동평균)
/// 하단 밴드 = MA - (k × σ)
///
/// σ는 모표준편차이며, 처음 `period - 1`개는 `None`입니다.
pub fn bollinger_bands(
    prices: &[f64],
    params: BollingerBandsParams,
) -> IndicatorResult<Vec<BollingerBandsResult>> {
    let period = params.period;

    let mut bands = BollingerBands::new(period, params.std_dev_multiplier)
        .map_err(|e| IndicatorError::InvalidParameter(format!("BB({}): {:?}", period, e)))?;

    let result = prices
        .iter()
        .enumerate()
        .map(|(i, &price)| {
            let out = bands.next(price);
            if i + 1 < period {
                BollingerBandsResult::default()
            } else {
                BollingerBandsResult {
                    upper: Some(out.upper),
                    middle: Some(out.average),
                    lower: Some(out.lower),
                }
            }
        })
        .collect();

    Ok(result)
}
