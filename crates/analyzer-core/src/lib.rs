//! # Analyzer Core
//!
//! 주식 분석기의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 분석 파이프라인 전반에서 사용되는 기본 타입을 제공합니다:
//! - 시장 및 심볼 타입 (접미사 기반 시장 판별)
//! - OHLCV 바와 시계열
//! - 뉴스 항목
//! - 설정 관리
//! - 로깅 인프라
//! - 시장 시계

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use clock::*;
pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;
