//! 기술적 지표와 분석 파이프라인.
//!
//! 이 crate는 다음을 제공합니다:
//! - 기술적 지표 (RSI, MACD, 볼린저 밴드)
//! - AI 분석 리포트 (`ReportAssembler`)
//! - 해석 → 시세 → 지표 → 뉴스 → 리포트 순서의 분석 파이프라인 (`AnalysisPipeline`)

pub mod indicators;
pub mod pipeline;
pub mod report;

pub use indicators::{
    IndicatorCalculator, IndicatorColumns, IndicatorError, IndicatorResult, IndicatorSnapshot,
};
pub use pipeline::{AnalysisPipeline, AnalysisReport, AnalysisRequest};
pub use report::{ReportAssembler, ReportInput, API_KEY_REQUIRED, NO_COMPATIBLE_MODEL};
