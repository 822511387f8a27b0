//! 가격 이력 분석.
//!
//! - [`PriceBuffer`]: 고정 용량 슬라이딩 윈도우
//! - [`PivotDetector`]: 윈도우 중앙 기준 국소 고점/저점 판정

pub mod buffer;
pub mod pivot;

pub use buffer::PriceBuffer;
pub use pivot::PivotDetector;
