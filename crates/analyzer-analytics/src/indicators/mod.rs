//! 기술적 지표 모듈.
//!
//! 종가 시계열에서 리포트에 쓰이는 지표 컬럼을 계산합니다.
//! EMA와 볼린저 밴드는 ta-rs 라이브러리를, RSI는 Wilder 방식 EWM 커스텀 구현을 사용합니다.
//!
//! # 지원 지표
//!
//! - **RSI** (기간 20)
//! - **MACD** (12, 26, 9): MACD, 시그널, 히스토그램
//! - **Bollinger Bands** (20, 2.0): 상단, 하단, 중간
//!
//! 각 컬럼의 길이는 시계열 길이와 같고, 워밍업 구간은 `None`입니다.
//!
//! # 사용 예시
//!
//! ```ignore
//! use analyzer_analytics::indicators::IndicatorCalculator;
//!
//! let calculator = IndicatorCalculator::new(30);
//! if let Some(columns) = calculator.compute(&series)? {
//!     println!("RSI: {:?}", columns.latest().rsi);
//! }
//! ```

pub mod momentum;
pub mod trend;
pub mod volatility;

use analyzer_core::Series;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use momentum::{rsi, RsiParams};
pub use trend::{macd, MacdParams, MacdResult};
pub use volatility::{bollinger_bands, BollingerBandsParams, BollingerBandsResult};

/// 지표 계산에 필요한 최소 바 개수 기본값.
pub const DEFAULT_MIN_BARS: usize = 30;

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 바 단위 지표 컬럼.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorColumns {
    pub rsi: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub macd_diff: Vec<Option<f64>>,
    pub bb_high: Vec<Option<f64>>,
    pub bb_low: Vec<Option<f64>>,
    pub bb_mid: Vec<Option<f64>>,
}

/// 한 시점의 지표 값.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_diff: Option<f64>,
    pub bb_high: Option<f64>,
    pub bb_low: Option<f64>,
    pub bb_mid: Option<f64>,
}

impl IndicatorColumns {
    pub fn len(&self) -> usize {
        self.rsi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rsi.is_empty()
    }

    /// 모든 컬럼을 (이름, 값) 쌍으로 반환합니다.
    pub fn columns(&self) -> [(&'static str, &[Option<f64>]); 7] {
        [
            ("rsi", self.rsi.as_slice()),
            ("macd", self.macd.as_slice()),
            ("macd_signal", self.macd_signal.as_slice()),
            ("macd_diff", self.macd_diff.as_slice()),
            ("bb_high", self.bb_high.as_slice()),
            ("bb_low", self.bb_low.as_slice()),
            ("bb_mid", self.bb_mid.as_slice()),
        ]
    }

    /// `index` 위치의 지표 값.
    pub fn at(&self, index: usize) -> IndicatorSnapshot {
        fn get(col: &[Option<f64>], index: usize) -> Option<f64> {
            col.get(index).copied().flatten()
        }
        IndicatorSnapshot {
            rsi: get(&self.rsi, index),
            macd: get(&self.macd, index),
            macd_signal: get(&self.macd_signal, index),
            macd_diff: get(&self.macd_diff, index),
            bb_high: get(&self.bb_high, index),
            bb_low: get(&self.bb_low, index),
            bb_mid: get(&self.bb_mid, index),
        }
    }

    /// 마지막 바의 지표 값.
    pub fn latest(&self) -> IndicatorSnapshot {
        match self.len() {
            0 => IndicatorSnapshot::default(),
            n => self.at(n - 1),
        }
    }
}

/// 지표 계산기.
#[derive(Debug, Clone)]
pub struct IndicatorCalculator {
    min_bars: usize,
    rsi: RsiParams,
    macd: MacdParams,
    bollinger: BollingerBandsParams,
}

impl Default for IndicatorCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_BARS)
    }
}

impl IndicatorCalculator {
    /// 기본 파라미터(RSI 20, MACD 12/26/9, BB 20/2.0)로 생성.
    pub fn new(min_bars: usize) -> Self {
        Self {
            min_bars,
            rsi: RsiParams { period: 20 },
            macd: MacdParams::default(),
            bollinger: BollingerBandsParams::default(),
        }
    }

    pub fn min_bars(&self) -> usize {
        self.min_bars
    }

    /// 지표 컬럼을 계산합니다.
    ///
    /// 바가 최소 개수보다 적으면 `Ok(None)`을 반환합니다 (지표 생략).
    pub fn compute(&self, series: &Series) -> IndicatorResult<Option<IndicatorColumns>> {
        if series.len() < self.min_bars {
            return Ok(None);
        }

        let closes = series.closes();

        let rsi_values = rsi(&closes, self.rsi)?;
        let macd_values = macd(&closes, self.macd)?;
        let bands = bollinger_bands(&closes, self.bollinger)?;

        Ok(Some(IndicatorColumns {
            rsi: rsi_values,
            macd: macd_values.iter().map(|m| m.macd).collect(),
            macd_signal: macd_values.iter().map(|m| m.signal).collect(),
            macd_diff: macd_values.iter().map(|m| m.histogram).collect(),
            bb_high: bands.iter().map(|b| b.upper).collect(),
            bb_low: bands.iter().map(|b| b.lower).collect(),
            bb_mid: bands.iter().map(|b| b.middle).collect(),
        }))
    }
}
