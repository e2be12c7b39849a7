//! 심볼 및 시장 정의.
//!
//! - `Market` - 티커 접미사로 판별되는 시장 (한국/미국)
//! - `Symbol` - 사용자 입력과 해석된 티커의 쌍

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 한국 시장 기본 접미사 (KOSPI).
pub const PRIMARY_KR_SUFFIX: &str = ".KS";

/// 한국 시장 보조 접미사 (KOSDAQ).
pub const SECONDARY_KR_SUFFIX: &str = ".KQ";

/// 한국 시장으로 인식하는 접미사 목록.
pub const KR_SUFFIXES: [&str; 2] = [PRIMARY_KR_SUFFIX, SECONDARY_KR_SUFFIX];

/// 시장 구분.
///
/// 접미사가 없는 티커는 미국(기본) 시장으로 간주합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
    /// 한국 거래소 (KOSPI/KOSDAQ)
    Korea,
    /// 미국 및 기타 (기본값)
    #[default]
    Us,
}

impl Market {
    /// 티커 접미사로 시장을 판별합니다.
    pub fn from_ticker(ticker: &str) -> Self {
        if has_korean_suffix(ticker) {
            Market::Korea
        } else {
            Market::Us
        }
    }

    /// 시장의 현지 시간대.
    pub fn timezone(&self) -> Tz {
        match self {
            Market::Korea => chrono_tz::Asia::Seoul,
            Market::Us => chrono_tz::America::New_York,
        }
    }

    /// 시장 코드 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Korea => "KR",
            Market::Us => "US",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 티커가 한국 시장 접미사로 끝나는지 확인합니다.
pub fn has_korean_suffix(ticker: &str) -> bool {
    KR_SUFFIXES.iter().any(|suffix| ticker.ends_with(suffix))
}

/// 해석된 종목 심볼.
///
/// 시장 구분은 저장하지 않고 티커 문자열에서 매번 계산하므로
/// 티커와 시장 정보가 어긋날 수 없습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    raw: String,
    ticker: String,
}

impl Symbol {
    /// 원본 입력과 해석된 티커로 심볼을 생성합니다.
    pub fn new(raw: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            ticker: ticker.into().trim().to_string(),
        }
    }

    /// 해석 없이 입력을 그대로 티커로 사용하는 심볼.
    pub fn passthrough(raw: &str) -> Self {
        Self::new(raw, raw.trim())
    }

    /// 사용자가 입력한 원본 문자열.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// 해석된 티커 (예: "005930.KS", "AAPL").
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// 티커 접미사에서 판별한 시장.
    pub fn market(&self) -> Market {
        Market::from_ticker(&self.ticker)
    }

    /// 한국 시장 종목인지 확인합니다.
    pub fn is_korean(&self) -> bool {
        self.market() == Market::Korea
    }

    /// 시장 접미사를 제거한 기본 코드 (예: "005930.KS" → "005930").
    pub fn base_code(&self) -> &str {
        match self.ticker.find('.') {
            Some(pos) => &self.ticker[..pos],
            None => &self.ticker,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ticker)
    }
}
