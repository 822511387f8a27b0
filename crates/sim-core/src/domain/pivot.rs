//! 피벗 태그.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 국소 극값의 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PivotKind {
    PivotHigh,
    PivotLow,
}

impl fmt::Display for PivotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PivotHigh => f.write_str("PivotHigh"),
            Self::PivotLow => f.write_str("PivotLow"),
        }
    }
}

/// 버퍼 중앙에서 확인된 피벗.
///
/// 호가는 중앙 항목의 값이며 최신 틱보다 `window` 스텝 늦습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pivot {
    pub kind: PivotKind,
    pub bid: Decimal,
    pub ask: Decimal,
    pub mid: Decimal,
}
