//! 스텝 스냅샷.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{Pivot, PivotKind, PriceSnapshot, Regime, Sign};
use sim_market::VenueQuote;

/// 한 스텝이 끝난 뒤의 시장 상태.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketState {
    /// 스텝 시각
    pub timestamp: DateTime<Utc>,
    /// 시나리오 시작 후 경과 시간 (초)
    pub elapsed: f64,
    /// 최우선 매수호가
    pub bid: Decimal,
    /// 최우선 매도호가
    pub ask: Decimal,
    /// 잔량 가중 중간가
    pub mid: Decimal,
    /// 현재 레짐
    pub regime: Regime,
    /// 현재 방향
    pub sign: Sign,
    /// 현재 세그먼트 목표가
    pub target_price: Option<Decimal>,
    /// 이번 스텝 피벗 (중앙 항목 기준, `window` 스텝 지연)
    pub pivot: Option<PivotKind>,
    pub pivot_bid: Option<Decimal>,
    pub pivot_ask: Option<Decimal>,
    /// 브레이크아웃 세그먼트(가짜 포함) 안인지
    pub in_breakout: bool,
    /// 주 브레이크아웃 구간 안인지
    pub in_primary_breakout: bool,
    /// 주 브레이크아웃까지 남은 시간 (초)
    pub time_until_breakout: Option<f64>,
    /// 이번 스텝에 생성된 틱 수
    pub tick_count: usize,
    /// 거래소별 호가
    pub venue_quotes: Vec<VenueQuote>,
}

impl MarketState {
    /// 시작 호가로 초기 상태를 만듭니다.
    pub(crate) fn initial(timestamp: DateTime<Utc>, snapshot: PriceSnapshot) -> Self {
        Self {
            timestamp,
            elapsed: 0.0,
            bid: snapshot.bid,
            ask: snapshot.ask,
            mid: snapshot.mid,
            regime: Regime::RANGING,
            sign: Sign::Flat,
            target_price: None,
            pivot: None,
            pivot_bid: None,
            pivot_ask: None,
            in_breakout: false,
            in_primary_breakout: false,
            time_until_breakout: None,
            tick_count: 0,
            venue_quotes: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> PriceSnapshot {
        PriceSnapshot {
            bid: self.bid,
            ask: self.ask,
            mid: self.mid,
        }
    }

    pub(crate) fn set_pivot(&mut self, pivot: Option<Pivot>) {
        self.pivot = pivot.map(|p| p.kind);
        self.pivot_bid = pivot.map(|p| p.bid);
        self.pivot_ask = pivot.map(|p| p.ask);
    }

    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }
}
