//! 레짐 타임라인 구성 요소.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::regime::{Regime, Sign};
use super::scenario::{BreakoutSpeed, BreakoutType};

/// 타임라인의 한 구간. `[start_time, end_time)` 반개구간 (초).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeSegment {
    pub start_time: f64,
    pub end_time: f64,
    pub regime: Regime,
    pub sign: Sign,
    pub target_price: Option<Decimal>,
    pub description: String,
}

impl RegimeSegment {
    /// 경과 시간이 이 구간에 속하는지 확인합니다.
    pub fn contains(&self, elapsed: f64) -> bool {
        elapsed >= self.start_time && elapsed < self.end_time
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// 현재 구간의 조회 결과.
    pub fn query(&self) -> RegimeQuery {
        RegimeQuery {
            regime: self.regime,
            sign: self.sign,
            target_price: self.target_price,
        }
    }
}

/// `get_current_regime` 조회 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeQuery {
    pub regime: Regime,
    pub sign: Sign,
    pub target_price: Option<Decimal>,
}

/// 시나리오의 주 브레이크아웃 기록.
///
/// 가짜 돌파는 타임라인 세그먼트로만 존재하며 이 레코드를 만들지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutEvent {
    pub start_time: f64,
    pub end_time: f64,
    pub breakout_type: BreakoutType,
    pub target_price: Decimal,
    pub speed: BreakoutSpeed,
}

impl BreakoutEvent {
    /// 경과 시간이 주 브레이크아웃 구간에 속하는지 확인합니다.
    pub fn contains(&self, elapsed: f64) -> bool {
        elapsed >= self.start_time && elapsed < self.end_time
    }
}
