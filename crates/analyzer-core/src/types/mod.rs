//! 분석 파이프라인 전반에서 사용되는 공통 타입.

mod bar;
mod news;
mod symbol;

pub use bar::*;
pub use news::*;
pub use symbol::*;
