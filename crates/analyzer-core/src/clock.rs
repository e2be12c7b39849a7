//! 시장 현지 날짜를 제공하는 시계.

use chrono::{NaiveDate, Utc};

use crate::types::Market;

/// 시장 현지 시간대 기준의 오늘 날짜를 제공합니다.
pub trait MarketClock: Send + Sync {
    /// 주어진 시장의 현지 날짜.
    fn today(&self, market: Market) -> NaiveDate;
}

/// 시스템 시계.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl MarketClock for SystemClock {
    fn today(&self, market: Market) -> NaiveDate {
        Utc::now().with_timezone(&market.timezone()).date_naive()
    }
}

/// 고정된 날짜를 반환하는 시계 (테스트용).
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl MarketClock for FixedClock {
    fn today(&self, _market: Market) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_ignores_market() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let clock = FixedClock(date);
        assert_eq!(clock.today(Market::Korea), date);
        assert_eq!(clock.today(Market::Us), date);
    }
}
