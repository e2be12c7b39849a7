//! 전체 분석 명령.

use analyzer_analytics::report::{indicator_summary, price_summary};
use analyzer_analytics::{AnalysisPipeline, AnalysisReport, AnalysisRequest};
use anyhow::{Context, Result};
use secrecy::SecretString;
use tracing::info;

use super::news::format_news;

/// 분석 명령 인자.
#[derive(Debug)]
pub struct AnalyzeArgs {
    pub input: String,
    pub period: Option<String>,
    pub purchase_price: Option<f64>,
    pub json: bool,
}

/// 분석 결과를 사람이 읽는 텍스트로 렌더링합니다.
pub fn format_report(report: &AnalysisReport) -> String {
    let symbol = &report.symbol;
    let mut lines = vec![format!("== {} ({}) ==", symbol.ticker(), symbol.raw().trim())];

    if let (Some(first), Some(last)) = (report.series.bars().first(), report.latest_bar()) {
        lines.push(format!(
            "기간: {} ~ {} ({}개 바)",
            first.date,
            last.date,
            report.series.len()
        ));
        lines.push(price_summary(last));
    }

    match &report.latest_indicators {
        Some(snapshot) => lines.push(indicator_summary(Some(snapshot))),
        None => lines.push("지표 생략 (데이터 부족)".to_string()),
    }

    lines.push(String::new());
    lines.push("-- 최신 관련 뉴스 --".to_string());
    lines.push(format_news(&report.news, &report.news_fallback_url));

    lines.push(String::new());
    lines.push("-- AI 분석 리포트 --".to_string());
    lines.push(match &report.narrative {
        Some(text) => text.clone(),
        None => "AI 분석을 보려면 Gemini API 키를 설정하세요 (--api-key 또는 GEMINI_API_KEY).".to_string(),
    });

    lines.join("\n")
}

pub async fn run_analyze(
    pipeline: &AnalysisPipeline,
    args: AnalyzeArgs,
    api_key: Option<SecretString>,
) -> Result<()> {
    let mut request = AnalysisRequest::new(args.input).with_api_key(api_key);
    request.period = args.period;
    request.purchase_price = args.purchase_price;

    let report = pipeline
        .run(&request)
        .await
        .with_context(|| format!("분석 실패: {}", request.raw_input))?;

    info!(symbol = report.symbol.ticker(), "분석 결과 출력");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", format_report(&report));
    }
    Ok(())
}
