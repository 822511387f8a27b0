//! 거래소별 호가 분배.
//!
//! 합성 틱 하나를 여러 거래소 호가로 나누는 로직은 외부 협력자 몫입니다.
//! 엔진은 스텝마다 최신 틱을 한 번 넘기고 결과를 그대로 노출합니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::Tick;

/// 한 거래소의 호가.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueQuote {
    pub venue: String,
    pub bid: Decimal,
    pub ask: Decimal,
    pub bid_size: u64,
    pub ask_size: u64,
}

/// 합성 틱을 거래소별 호가로 분배하는 협력자.
pub trait QuoteSplitter: Send {
    fn split(&mut self, tick: &Tick) -> Vec<VenueQuote>;
}

impl<F> QuoteSplitter for F
where
    F: FnMut(&Tick) -> Vec<VenueQuote> + Send,
{
    fn split(&mut self, tick: &Tick) -> Vec<VenueQuote> {
        self(tick)
    }
}

/// 모든 거래소에 같은 가격을 내고 잔량을 균등 분배하는 기본 구현.
///
/// 나머지 잔량은 첫 거래소에 붙습니다.
#[derive(Debug, Clone)]
pub struct MirrorSplitter {
    venues: Vec<String>,
}

impl MirrorSplitter {
    pub fn new<I, S>(venues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            venues: venues.into_iter().map(Into::into).collect(),
        }
    }
}

impl QuoteSplitter for MirrorSplitter {
    fn split(&mut self, tick: &Tick) -> Vec<VenueQuote> {
        let n = self.venues.len() as u64;
        if n == 0 {
            return Vec::new();
        }

        self.venues
            .iter()
            .enumerate()
            .map(|(i, venue)| {
                let first = i == 0;
                VenueQuote {
                    venue: venue.clone(),
                    bid: tick.bid,
                    ask: tick.ask,
                    bid_size: tick.bid_size / n + if first { tick.bid_size % n } else { 0 },
                    ask_size: tick.ask_size / n + if first { tick.ask_size % n } else { 0 },
                }
            })
            .collect()
    }
}
