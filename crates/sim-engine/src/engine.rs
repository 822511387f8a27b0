//! 시뮬레이션 엔진.
//!
//! 외부 스케줄러가 스텝마다 [`SimulationEngine::step`]을 호출합니다. 한 스텝은
//! 다음 순서로 진행됩니다:
//!
//! 1. 경과 시간 계산
//! 2. 스케줄러에서 현재 레짐, 방향, 목표가 조회
//! 3. 브레이크아웃 알림 (경고, 시작, 진행률, 완료)
//! 4. 틱 생성. 틱이 없으면 직전 호가를 유지
//! 5. 가격 버퍼 갱신과 피벗 판정
//! 6. 최신 틱을 거래소 분배기에 전달

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::{debug, info};

use sim_analytics::{PivotDetector, PriceBuffer};
use sim_core::{EngineConfig, NotificationConfig, PriceSnapshot, ScenarioSpec, SimResult, Tick};
use sim_market::{QuoteSplitter, RegimeModel, TickGenerator};
use sim_notification::BreakoutNotifier;
use sim_scenario::RegimeScheduler;

use crate::state::MarketState;

/// 브레이크아웃 구간 안에서 완료로 보는 목표가 근접 비율 (0.2%).
const IN_WINDOW_COMPLETION_RATIO: Decimal = dec!(0.002);

/// 브레이크아웃 구간이 끝난 뒤 완료로 보는 목표가 근접 비율 (0.5%).
const POST_WINDOW_COMPLETION_RATIO: Decimal = dec!(0.005);

/// 레짐 조건부 시세 시뮬레이션 엔진.
pub struct SimulationEngine {
    config: EngineConfig,
    scenario: ScenarioSpec,
    rng: StdRng,
    generator: TickGenerator,
    scheduler: RegimeScheduler,
    notifier: BreakoutNotifier,
    detector: PivotDetector,
    splitter: Option<Box<dyn QuoteSplitter>>,
    started_at: DateTime<Utc>,
    /// 진행 중인 브레이크아웃 에피소드의 현재 세그먼트 목표가
    episode_target: Option<Decimal>,
    last_tick: Option<Tick>,
    state: MarketState,
}

impl SimulationEngine {
    /// 새 엔진을 생성하고 시나리오를 스케줄합니다.
    ///
    /// # 인자
    ///
    /// * `config` - 엔진 설정 (피벗 윈도우, 시드)
    /// * `notification` - 알림 스로틀 설정
    /// * `model` - 공유 레짐 모델
    /// * `scenario` - 실행할 시나리오 (검증 실패 시 에러)
    /// * `now` - 시나리오 시작 시각
    pub fn new(
        config: EngineConfig,
        notification: NotificationConfig,
        model: Arc<RegimeModel>,
        scenario: ScenarioSpec,
        now: DateTime<Utc>,
    ) -> SimResult<Self> {
        scenario.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let scheduler = RegimeScheduler::from_scenario(&scenario, &mut rng);
        let generator = TickGenerator::new(
            model,
            scenario.start_price,
            scenario.spread.base,
            rng.gen(),
        );
        let state = MarketState::initial(
            now,
            PriceSnapshot::from_quotes(generator.bid(), generator.ask()),
        );

        info!(
            start_price = %scenario.start_price,
            duration = scenario.duration,
            breakout = %scenario.breakout.breakout_type,
            pivot_window = config.pivot_window,
            seed = ?config.seed,
            "Simulation engine created"
        );

        Ok(Self {
            detector: PivotDetector::new(config.pivot_window),
            config,
            scenario,
            rng,
            generator,
            scheduler,
            notifier: BreakoutNotifier::new(notification),
            splitter: None,
            started_at: now,
            episode_target: None,
            last_tick: None,
            state,
        })
    }

    /// 거래소 분배기를 설정합니다.
    pub fn with_splitter<S>(mut self, splitter: S) -> Self
    where
        S: QuoteSplitter + 'static,
    {
        self.splitter = Some(Box::new(splitter));
        self
    }

    /// 실행 중인 시나리오를 교체합니다.
    ///
    /// 검증을 통과해야만 스케줄러, 알림기, 버퍼, 생성기 상태를 함께 교체합니다.
    /// 실패하면 기존 상태가 그대로 남습니다. 리스너와 분배기는 유지됩니다.
    pub fn reset_with_scenario(&mut self, scenario: ScenarioSpec, now: DateTime<Utc>) -> SimResult<()> {
        scenario.validate()?;

        let scheduler = RegimeScheduler::from_scenario(&scenario, &mut self.rng);
        let seed = self.rng.gen();
        self.generator
            .reinitialize(scenario.start_price, scenario.spread.base, seed);
        self.scheduler = scheduler;
        self.notifier.reset();
        self.detector.reset();
        self.started_at = now;
        self.episode_target = None;
        self.last_tick = None;
        self.state = MarketState::initial(
            now,
            PriceSnapshot::from_quotes(self.generator.bid(), self.generator.ask()),
        );

        info!(
            start_price = %scenario.start_price,
            duration = scenario.duration,
            breakout = %scenario.breakout.breakout_type,
            "Scenario reset"
        );
        self.scenario = scenario;
        Ok(())
    }

    /// 한 스텝을 진행합니다.
    pub fn step(&mut self, now: DateTime<Utc>) -> &MarketState {
        let elapsed = self.elapsed(now);
        let query = self.scheduler.get_current_regime(elapsed);
        let in_breakout = self.scheduler.is_in_breakout(elapsed);

        self.drive_notifications(now, elapsed, in_breakout, query.target_price);

        let ticks = self
            .generator
            .step(now, query.regime, query.sign, query.target_price);
        let snapshot = match ticks.last() {
            Some(tick) => {
                self.last_tick = Some(tick.clone());
                PriceSnapshot::from_tick(tick)
            }
            None => self.state.snapshot(),
        };
        let pivot = self.detector.update(snapshot);

        if let (Some(splitter), Some(tick)) = (self.splitter.as_mut(), self.last_tick.as_ref()) {
            self.state.venue_quotes = splitter.split(tick);
        }

        let state = &mut self.state;
        state.timestamp = now;
        state.elapsed = elapsed;
        state.bid = snapshot.bid;
        state.ask = snapshot.ask;
        state.mid = snapshot.mid;
        state.regime = query.regime;
        state.sign = query.sign;
        state.target_price = query.target_price;
        state.set_pivot(pivot);
        state.in_breakout = in_breakout;
        state.in_primary_breakout = self.scheduler.is_in_primary_breakout(elapsed);
        state.time_until_breakout = self.scheduler.time_until_breakout(elapsed);
        state.tick_count = ticks.len();

        debug!(
            elapsed,
            regime = %query.regime,
            sign = %query.sign,
            ticks = ticks.len(),
            bid = %snapshot.bid,
            ask = %snapshot.ask,
            mid = %snapshot.mid,
            pivot = ?state.pivot,
            "Step"
        );
        &self.state
    }

    /// 알림 시퀀스 (a)~(d).
    fn drive_notifications(
        &mut self,
        now: DateTime<Utc>,
        elapsed: f64,
        in_breakout: bool,
        target_price: Option<Decimal>,
    ) {
        if !self.scenario.breakout.notify {
            return;
        }
        let price = self.state.mid;

        // (a) 사전 경고
        if self.scenario.notifications_enabled() {
            if let (Some(event), Some(lead), Some(time_to_breakout)) = (
                self.scheduler.breakout_event(),
                self.scenario.breakout.pre_warning,
                self.scheduler.time_until_breakout(elapsed),
            ) {
                self.notifier
                    .schedule_warning(now, event, time_to_breakout, lead);
            }
        }

        if in_breakout {
            // (b) 에피소드 시작
            if self.episode_target.is_none() {
                let target = target_price.unwrap_or(price);
                self.notifier.notify_breakout_start(now, price, target);
            }
            // 가짜 돌파의 되돌림처럼 이어지는 세그먼트는 같은 에피소드지만
            // 완료 판정은 현재 세그먼트 목표가를 기준으로 합니다.
            let target = target_price.or(self.episode_target).unwrap_or(price);
            self.episode_target = Some(target);

            // (c) 진행률과 구간 내 완료
            self.notifier.notify_progress(now, price);
            if near_target(price, target, IN_WINDOW_COMPLETION_RATIO) {
                self.notifier.notify_breakout_completion(now, price);
            }
        } else if let Some(target) = self.episode_target.take() {
            // (d) 구간 종료 후 완료 확인
            if near_target(price, target, POST_WINDOW_COMPLETION_RATIO) {
                self.notifier.notify_breakout_completion(now, price);
            }
        }
    }

    /// 시나리오 시작 후 경과 시간 (초).
    pub fn elapsed(&self, now: DateTime<Utc>) -> f64 {
        (now - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// 마지막 스텝의 상태.
    pub fn state(&self) -> &MarketState {
        &self.state
    }

    /// 피벗 판정용 가격 이력.
    pub fn history(&self) -> &PriceBuffer {
        self.detector.buffer()
    }

    pub fn scenario(&self) -> &ScenarioSpec {
        &self.scenario
    }

    pub fn scheduler(&self) -> &RegimeScheduler {
        &self.scheduler
    }

    pub fn notifier(&self) -> &BreakoutNotifier {
        &self.notifier
    }

    /// 리스너 등록용.
    pub fn notifier_mut(&mut self) -> &mut BreakoutNotifier {
        &mut self.notifier
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// 경과 시간이 시나리오 길이를 넘었는지 확인합니다.
    pub fn is_finished(&self, now: DateTime<Utc>) -> bool {
        self.elapsed(now) >= self.scenario.duration
    }
}

fn near_target(price: Decimal, target: Decimal, ratio: Decimal) -> bool {
    (price - target).abs() <= target.abs() * ratio
}
