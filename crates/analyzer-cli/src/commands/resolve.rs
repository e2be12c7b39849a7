//! 티커 해석 명령.

use analyzer_analytics::AnalysisPipeline;
use analyzer_core::Symbol;
use secrecy::SecretString;

pub fn format_symbol(symbol: &Symbol) -> String {
    format!("{} → {} ({})", symbol.raw().trim(), symbol.ticker(), symbol.market())
}

/// 입력을 티커로 해석해 출력합니다. 해석은 실패하지 않습니다.
pub async fn run_resolve(pipeline: &AnalysisPipeline, input: &str, api_key: Option<&SecretString>) {
    let symbol = pipeline.resolver().resolve(input, api_key).await;
    println!("{}", format_symbol(&symbol));
}
