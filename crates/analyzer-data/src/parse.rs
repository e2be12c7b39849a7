//! 스크래핑 텍스트 파싱 헬퍼.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{SourceError, SourceResult};

/// 쉼표로 그룹된 숫자 문자열을 f64로 파싱합니다.
///
/// "150,400" -> 150400.0
pub fn parse_grouped_f64(text: &str) -> SourceResult<f64> {
    let cleaned = text.trim().replace(',', "");
    let value: f64 = cleaned
        .parse()
        .map_err(|_| SourceError::Parse(format!("숫자 변환 실패: {:?}", text)))?;
    if !value.is_finite() {
        return Err(SourceError::Parse(format!("유한하지 않은 값: {:?}", text)));
    }
    Ok(value)
}

/// 쉼표로 그룹된 정수 문자열을 u64로 파싱합니다.
///
/// "12,345,678" -> 12345678
pub fn parse_grouped_u64(text: &str) -> SourceResult<u64> {
    let cleaned = text.trim().replace(',', "");
    cleaned
        .parse()
        .map_err(|_| SourceError::Parse(format!("정수 변환 실패: {:?}", text)))
}

/// 실시간 시세 요약 텍스트의 라벨 (현재가, 시가, 고가, 저가, 거래량).
pub const QUOTE_LABELS: [&str; 5] = ["현재가", "시가", "고가", "저가", "거래량"];

fn labeled_value_regex() -> &'static Regex {
    static LABELED_RE: OnceLock<Regex> = OnceLock::new();
    LABELED_RE.get_or_init(|| {
        let labels: Vec<String> = QUOTE_LABELS.iter().map(|l| regex::escape(l)).collect();
        Regex::new(&format!(r"({})\s+([\d,]+)", labels.join("|")))
            .expect("quote label pattern is valid")
    })
}

/// 텍스트에서 `라벨 공백 숫자` 형태의 값을 찾아 숫자 부분을 반환합니다.
///
/// `dl.blind` 요약 텍스트처럼 "현재가 150,400 전일대비 ..." 형태를 가정합니다.
/// 라벨 바로 뒤에 공백이 와야 하므로 "시가"는 "시가총액"과 겹치지 않습니다.
/// `QUOTE_LABELS`에 없는 라벨은 항상 `None`입니다.
pub fn extract_labeled_value(text: &str, label: &str) -> Option<String> {
    labeled_value_regex()
        .captures_iter(text)
        .find(|caps| caps.get(1).map(|m| m.as_str()) == Some(label))
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str().to_string())
}

fn url_regex() -> &'static Regex {
    static URL_RE: OnceLock<Regex> = OnceLock::new();
    URL_RE.get_or_init(|| {
        Regex::new(r#"https?://[^\s"'<>]+"#).expect("URL pattern is valid")
    })
}

/// 자유 텍스트에 등장하는 절대 URL을 순서대로 반환합니다.
pub fn find_absolute_urls(text: &str) -> Vec<&str> {
    url_regex()
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ')', ';']))
        .collect()
}

/// 한글 음절이 포함되어 있는지 확인합니다.
pub fn contains_hangul(text: &str) -> bool {
    text.chars().any(|c| ('\u{AC00}'..='\u{D7A3}').contains(&c))
}
