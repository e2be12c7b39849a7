//! 시세 조회 명령.

use analyzer_analytics::AnalysisPipeline;
use analyzer_core::Series;
use anyhow::{Context, Result};
use secrecy::SecretString;

/// 최근 `tail`개 바를 표로 렌더링합니다.
pub fn format_bars(series: &Series, tail: usize) -> String {
    let bars = series.bars();
    let start = bars.len().saturating_sub(tail);

    let mut lines = vec![format!(
        "{:<10} {:>12} {:>12} {:>12} {:>12} {:>14}",
        "date", "open", "high", "low", "close", "volume"
    )];
    lines.extend(bars[start..].iter().map(|b| {
        format!(
            "{:<10} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>14}",
            b.date.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        )
    }));
    lines.join("\n")
}

pub async fn run_quote(
    pipeline: &AnalysisPipeline,
    input: &str,
    period: Option<&str>,
    tail: usize,
    api_key: Option<&SecretString>,
) -> Result<()> {
    let symbol = pipeline.resolver().resolve(input, api_key).await;
    let period = period.unwrap_or(pipeline.default_period());

    let series = pipeline
        .reconciler()
        .fetch_and_patch(&symbol, period)
        .await
        .with_context(|| format!("시세 조회 실패: {}", symbol.ticker()))?;

    println!("{} ({}개 바, 기간 {})", symbol.ticker(), series.len(), period);
    println!("{}", format_bars(&series, tail));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyzer_core::Bar;
    use chrono::NaiveDate;

    #[test]
    fn test_format_bars_tail() {
        let bars = (1..=3)
            .map(|d| {
                let date = NaiveDate::from_ymd_opt(2026, 10, d).unwrap();
                Bar::new(date, 1.0, 2.0, 0.5, 1.5, 100 * d as u64)
            })
            .collect();
        let series = Series::from_unordered("AAPL", bars);

        let text = format_bars(&series, 2);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2026-10-02"));
        assert!(lines[2].ends_with("300"));
    }
}
