//! 합성 매수/매도 호가 생성기.
//!
//! 스텝마다 포아송 분포로 업데이트 횟수를 뽑고, 각 서브 업데이트에서
//! 모델 틱을 뽑아 현재 호가에 반영합니다.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sim_core::{round_to_cents, Regime, Sign, Tick, MIN_SPREAD};
use std::sync::Arc;
use tracing::trace;

use crate::bias::target_biased_delta;
use crate::model::RegimeModel;

/// 합성 틱 생성기.
///
/// 현재 매수/매도 호가는 스텝 사이에 유지되며 `reinitialize`로만 덮어씁니다.
pub struct TickGenerator {
    model: Arc<RegimeModel>,
    rng: StdRng,
    bid: Decimal,
    ask: Decimal,
}

impl TickGenerator {
    /// 새로운 생성기를 만듭니다.
    ///
    /// # 인자
    ///
    /// * `model` - 공유 레짐 모델
    /// * `start_price` - 시작 매수호가
    /// * `initial_spread` - 시작 스프레드 (최소 1센트로 보정)
    /// * `seed` - 난수 시드
    pub fn new(
        model: Arc<RegimeModel>,
        start_price: Decimal,
        initial_spread: Decimal,
        seed: u64,
    ) -> Self {
        let (bid, ask) = Self::initial_quotes(start_price, initial_spread);
        Self {
            model,
            rng: StdRng::seed_from_u64(seed),
            bid,
            ask,
        }
    }

    fn initial_quotes(start_price: Decimal, initial_spread: Decimal) -> (Decimal, Decimal) {
        let bid = round_to_cents(start_price);
        let ask = round_to_cents(bid + initial_spread.max(MIN_SPREAD));
        (bid, ask)
    }

    /// 호가 상태와 난수 시드를 한 번에 덮어씁니다.
    pub fn reinitialize(&mut self, start_price: Decimal, initial_spread: Decimal, seed: u64) {
        let (bid, ask) = Self::initial_quotes(start_price, initial_spread);
        *self = Self {
            model: Arc::clone(&self.model),
            rng: StdRng::seed_from_u64(seed),
            bid,
            ask,
        };
    }

    /// 현재 매수호가.
    pub fn bid(&self) -> Decimal {
        self.bid
    }

    /// 현재 매도호가.
    pub fn ask(&self) -> Decimal {
        self.ask
    }

    /// 공유 모델.
    pub fn model(&self) -> &Arc<RegimeModel> {
        &self.model
    }

    /// 한 스텝을 진행하고 도착 순서대로 틱을 반환합니다 (비어 있을 수 있음).
    ///
    /// 방향은 스텝마다 `sign`에서 시작해, 서브 업데이트마다 직전 델타의
    /// 부호로 바뀝니다. 목표가가 있으면 델타를 목표 쪽으로 편향합니다.
    pub fn step(
        &mut self,
        timestamp: DateTime<Utc>,
        regime: Regime,
        sign: Sign,
        target_price: Option<Decimal>,
    ) -> Vec<Tick> {
        let count = self.model.sample_update_count(regime, &mut self.rng);
        let mut ticks = Vec::with_capacity(count as usize);
        let mut sign = sign;

        for _ in 0..count {
            let raw = self.model.sample_tick(regime, sign, &mut self.rng);

            let delta = match target_price {
                Some(target) => target_biased_delta(
                    raw.price_delta,
                    self.bid.to_f64().unwrap_or_default(),
                    target.to_f64().unwrap_or_default(),
                ),
                None => raw.price_delta,
            };

            let bid = round_to_cents(self.bid + Decimal::from_f64(delta).unwrap_or_default());
            let spread = Decimal::from_f64(raw.spread).unwrap_or_default();
            let ask = round_to_cents((bid + spread).max(bid + MIN_SPREAD));

            self.bid = bid;
            self.ask = ask;
            sign = Sign::from_delta(delta);

            let half = raw.size / 2;
            ticks.push(Tick {
                timestamp,
                bid,
                ask,
                bid_size: half,
                ask_size: half,
            });
        }

        trace!(%regime, count, bid = %self.bid, ask = %self.ask, "Generator step");
        ticks
    }
}
