//! 틱과 가격 스냅샷.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// 호가 최소 스프레드 (1센트).
pub const MIN_SPREAD: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// 가격을 센트 단위로 반올림합니다 (0.5는 0에서 먼 쪽으로).
pub fn round_to_cents(price: Decimal) -> Decimal {
    price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// 한 번의 서브 업데이트로 생성된 매수/매도 호가.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub timestamp: DateTime<Utc>,
    pub bid: Decimal,
    pub ask: Decimal,
    pub bid_size: u64,
    pub ask_size: u64,
}

impl Tick {
    /// 잔량 가중 중간가.
    ///
    /// 매도 잔량이 많으면 매수호가 쪽으로 기웁니다. 양쪽 잔량이 모두 0이면
    /// 산술 평균으로 대체합니다.
    pub fn weighted_mid(&self) -> Decimal {
        let total = self.bid_size + self.ask_size;
        if total == 0 {
            return (self.bid + self.ask) / Decimal::TWO;
        }
        (self.bid * Decimal::from(self.ask_size) + self.ask * Decimal::from(self.bid_size))
            / Decimal::from(total)
    }

    /// 스프레드.
    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }
}

/// 가격 버퍼에 쌓이는 스텝 단위 스냅샷.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub bid: Decimal,
    pub ask: Decimal,
    pub mid: Decimal,
}

impl PriceSnapshot {
    /// 산술 중간가로 스냅샷을 만듭니다.
    pub fn from_quotes(bid: Decimal, ask: Decimal) -> Self {
        Self {
            bid,
            ask,
            mid: (bid + ask) / Decimal::TWO,
        }
    }

    /// 틱의 잔량 가중 중간가로 스냅샷을 만듭니다.
    pub fn from_tick(tick: &Tick) -> Self {
        Self {
            bid: tick.bid,
            ask: tick.ask,
            mid: tick.weighted_mid(),
        }
    }
}
