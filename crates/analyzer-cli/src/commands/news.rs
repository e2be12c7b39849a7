//! 뉴스 조회 명령.

use analyzer_analytics::AnalysisPipeline;
use analyzer_core::NewsItem;
use secrecy::SecretString;

/// 뉴스 목록을 마크다운 목록으로 렌더링합니다.
///
/// 목록이 비어 있으면 종목 뉴스 페이지를 안내합니다.
pub fn format_news(items: &[NewsItem], fallback_url: &str) -> String {
    if items.is_empty() {
        return format!("관련 뉴스를 찾을 수 없습니다. 직접 확인: {}", fallback_url);
    }

    items
        .iter()
        .map(|item| format!("- {}", item.to_markdown()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn run_news(pipeline: &AnalysisPipeline, input: &str, api_key: Option<&SecretString>) {
    let symbol = pipeline.resolver().resolve(input, api_key).await;
    let items = pipeline.news().fetch_news(&symbol).await;

    println!("{} 뉴스", symbol.ticker());
    println!("{}", format_news(&items, &pipeline.news().fallback_url(&symbol)));
}
