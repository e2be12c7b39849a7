//! 뉴스 항목과 뉴스 소스 우선순위.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 뉴스 링크.
///
/// 일부 소스는 링크가 없는 레코드를 정상적으로 내려주므로
/// 링크 해석 여부를 명시적인 상태로 가집니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "url", rename_all = "snake_case")]
pub enum NewsLink {
    /// 절대 URL로 해석된 링크
    Resolved(String),
    /// 해석할 수 없는 링크 (제목만 표시)
    Unresolved,
}

impl NewsLink {
    /// 해석된 URL.
    pub fn url(&self) -> Option<&str> {
        match self {
            NewsLink::Resolved(url) => Some(url),
            NewsLink::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, NewsLink::Resolved(_))
    }
}

/// 정규화된 뉴스 항목.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    title: String,
    link: NewsLink,
    source: String,
}

impl NewsItem {
    /// 제목을 정규화해 뉴스 항목을 생성합니다.
    ///
    /// 정규화 후 제목이 비어 있으면 `None`을 반환합니다.
    pub fn new(title: &str, link: NewsLink, source: impl Into<String>) -> Option<Self> {
        let title = normalize_title(title);
        if title.is_empty() {
            return None;
        }
        Some(Self {
            title,
            link,
            source: source.into(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> &NewsLink {
        &self.link
    }

    /// 항목을 만든 소스 이름.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 클릭 가능한 링크가 있는지 확인합니다.
    pub fn is_clickable(&self) -> bool {
        self.link.is_resolved()
    }

    /// 마크다운 링크로 렌더링합니다. 링크가 없으면 제목만 반환합니다.
    pub fn to_markdown(&self) -> String {
        match self.link.url() {
            Some(url) => format!("[{}]({})", self.title, url),
            None => self.title.clone(),
        }
    }
}

/// 뉴스 제목 정규화.
///
/// 앞뒤 공백을 제거하고, 마크다운 링크를 깨뜨리는 대괄호를 소괄호로 바꿉니다.
pub fn normalize_title(title: &str) -> String {
    title.trim().replace('[', "(").replace(']', ")")
}

/// 뉴스 소스 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsSourceKind {
    /// Yahoo Finance 종목 뉴스 피드
    Yahoo,
    /// Google News RSS 검색
    GoogleNews,
    /// 네이버 금융 종목 뉴스 (한국 종목 전용)
    Naver,
}

impl fmt::Display for NewsSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewsSourceKind::Yahoo => write!(f, "yahoo"),
            NewsSourceKind::GoogleNews => write!(f, "google_news"),
            NewsSourceKind::Naver => write!(f, "naver"),
        }
    }
}

/// 기능별 소스 우선순위 (정적 설정).
///
/// 시세는 과거 시세(Yahoo)와 실시간 시세(네이버) 두 소스로 고정이며,
/// 뉴스만 순서를 설정할 수 있습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePriority {
    /// 한국 외 종목의 뉴스 소스 순서
    pub news: Vec<NewsSourceKind>,
}

impl Default for SourcePriority {
    fn default() -> Self {
        Self {
            news: vec![NewsSourceKind::Yahoo, NewsSourceKind::GoogleNews],
        }
    }
}
