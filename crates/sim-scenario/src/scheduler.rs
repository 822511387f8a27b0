//! 레짐 스케줄러.
//!
//! 시나리오 시작 시 한 번 [`RegimeScheduler::schedule`]을 호출해 겹치지 않는
//! 세그먼트 타임라인을 만들고, 이후에는 경과 시간으로 조회만 합니다.
//!
//! `schedule`은 호출할 때마다 브레이크아웃 시각을 새로 뽑으므로 멱등이 아닙니다.

use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sim_core::{
    BreakoutEvent, BreakoutSpeed, BreakoutType, Regime, RegimeQuery, RegimeSegment, ScenarioSpec,
    Sign, TimeWindow,
};
use tracing::{debug, info};

/// 속도 정책에 따른 브레이크아웃 지속 시간 (초).
///
/// - instant: 2초 고정
/// - gradual: clamp(10 + 변동폭% × 5, 8, 30)
/// - accelerating: clamp(15 + 변동폭% × 8, 10, 40)
pub fn breakout_duration(speed: BreakoutSpeed, magnitude_pct: f64) -> f64 {
    let magnitude = magnitude_pct.abs();
    match speed {
        BreakoutSpeed::Instant => 2.0,
        BreakoutSpeed::Gradual => (10.0 + magnitude * 5.0).clamp(8.0, 30.0),
        BreakoutSpeed::Accelerating => (15.0 + magnitude * 8.0).clamp(10.0, 40.0),
    }
}

/// 시작가에 부호 있는 변동폭(%)을 적용한 목표가.
///
/// 목표가는 반올림하지 않습니다. 센트 단위 반올림은 생성된 호가에만 적용됩니다.
pub fn target_price(start_price: Decimal, magnitude_pct: f64) -> Decimal {
    let magnitude = Decimal::from_f64(magnitude_pct).unwrap_or_default();
    start_price * (Decimal::ONE + magnitude / Decimal::ONE_HUNDRED)
}

/// 타임라인에 올리기 전의 이동 구간.
#[derive(Debug, Clone)]
struct ScheduledMove {
    start: f64,
    end: f64,
    origin_price: Decimal,
    target: Decimal,
    description: String,
}

impl ScheduledMove {
    fn sign(&self) -> Sign {
        if self.target > self.origin_price {
            Sign::Up
        } else {
            Sign::Down
        }
    }
}

/// 시나리오를 레짐 타임라인으로 변환하고 경과 시간으로 조회합니다.
#[derive(Debug, Clone, Default)]
pub struct RegimeScheduler {
    timeline: Vec<RegimeSegment>,
    breakout: Option<BreakoutEvent>,
    duration: f64,
}

impl RegimeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 시나리오로 스케줄러를 만듭니다.
    pub fn from_scenario<R: Rng + ?Sized>(scenario: &ScenarioSpec, rng: &mut R) -> Self {
        let mut scheduler = Self::new();
        scheduler.schedule(scenario, rng);
        scheduler
    }

    /// 타임라인을 새로 만들고 주 브레이크아웃 기록을 반환합니다.
    pub fn schedule<R: Rng + ?Sized>(
        &mut self,
        scenario: &ScenarioSpec,
        rng: &mut R,
    ) -> Option<&BreakoutEvent> {
        let duration = scenario.duration.max(0.0);
        let start_price = scenario.start_price;
        let mut moves = Vec::new();

        // 가짜 돌파를 먼저 넣어 같은 시작 시각이면 주 브레이크아웃보다 앞서게 합니다.
        for fake in scenario.fake_breakouts() {
            let start = draw_start(fake.time_window, rng);
            let end = start + breakout_duration(BreakoutSpeed::Gradual, fake.magnitude);
            let target = target_price(start_price, fake.magnitude);

            moves.push(ScheduledMove {
                start,
                end,
                origin_price: start_price,
                target,
                description: format!("fake breakout to {target}"),
            });
            moves.push(ScheduledMove {
                start: end,
                end: end + fake.reversal_speed,
                origin_price: target,
                target: start_price,
                description: format!("fake reversal to {start_price}"),
            });
        }

        let config = &scenario.breakout;
        self.breakout = if config.breakout_type.is_none() {
            None
        } else {
            let magnitude = signed_magnitude(config.breakout_type, config.magnitude);
            let start = draw_start(config.time_window, rng);
            let end = (start + breakout_duration(config.speed, magnitude))
                .min(duration)
                .max(start);
            let target = target_price(start_price, magnitude);

            moves.push(ScheduledMove {
                start,
                end,
                origin_price: start_price,
                target,
                description: format!("{} breakout to {target}", config.breakout_type),
            });

            if config.breakout_type == BreakoutType::Fake {
                let reversal_end = end + breakout_duration(BreakoutSpeed::Gradual, magnitude);
                moves.push(ScheduledMove {
                    start: end,
                    end: reversal_end,
                    origin_price: target,
                    target: start_price,
                    description: format!("fake reversal to {start_price}"),
                });
            }

            Some(BreakoutEvent {
                start_time: start,
                end_time: end,
                breakout_type: config.breakout_type,
                target_price: target,
                speed: config.speed,
            })
        };

        // 안정 정렬: 시작 시각이 같으면 삽입 순서를 유지합니다.
        moves.sort_by(|a, b| a.start.total_cmp(&b.start));

        self.timeline = build_timeline(&moves, duration);
        self.duration = duration;

        info!(
            segments = self.timeline.len(),
            breakout = %config.breakout_type,
            start = self.breakout.as_ref().map(|e| e.start_time),
            target = ?self.breakout.as_ref().map(|e| e.target_price),
            "Regime timeline built"
        );
        for segment in &self.timeline {
            debug!(
                start = segment.start_time,
                end = segment.end_time,
                regime = %segment.regime,
                sign = %segment.sign,
                description = %segment.description,
                "Segment"
            );
        }

        self.breakout.as_ref()
    }

    /// 만들어진 타임라인.
    pub fn timeline(&self) -> &[RegimeSegment] {
        &self.timeline
    }

    /// 주 브레이크아웃 기록.
    pub fn breakout_event(&self) -> Option<&BreakoutEvent> {
        self.breakout.as_ref()
    }

    /// 스케줄된 시나리오 길이 (초).
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// 경과 시간에 해당하는 세그먼트.
    ///
    /// 마지막 세그먼트 이후는 마지막 세그먼트를, 0 이전은 첫 세그먼트를 반환합니다.
    pub fn segment_at(&self, elapsed: f64) -> Option<&RegimeSegment> {
        let index = self.timeline.partition_point(|s| s.end_time <= elapsed);
        self.timeline
            .get(index)
            .or_else(|| self.timeline.last())
    }

    /// 현재 레짐, 방향, 목표가를 조회합니다.
    pub fn get_current_regime(&self, elapsed: f64) -> RegimeQuery {
        self.segment_at(elapsed)
            .map(RegimeSegment::query)
            .unwrap_or(RegimeQuery {
                regime: Regime::RANGING,
                sign: Sign::Flat,
                target_price: None,
            })
    }

    /// 브레이크아웃 태그가 붙은 세그먼트(가짜 포함) 안에 있는지 확인합니다.
    pub fn is_in_breakout(&self, elapsed: f64) -> bool {
        self.segment_at(elapsed)
            .is_some_and(|s| s.regime.is_breakout())
    }

    /// 주 브레이크아웃 기록의 구간 안에 있는지 확인합니다.
    pub fn is_in_primary_breakout(&self, elapsed: f64) -> bool {
        self.breakout.as_ref().is_some_and(|e| e.contains(elapsed))
    }

    /// 주 브레이크아웃 시작까지 남은 시간. 이미 시작했거나 없으면 `None`.
    pub fn time_until_breakout(&self, elapsed: f64) -> Option<f64> {
        self.breakout
            .as_ref()
            .filter(|e| elapsed < e.start_time)
            .map(|e| e.start_time - elapsed)
    }
}

/// 유형에 맞게 변동폭 부호를 정합니다. fake는 설정값의 부호를 따릅니다.
fn signed_magnitude(breakout_type: BreakoutType, magnitude: f64) -> f64 {
    match breakout_type {
        BreakoutType::Bullish => magnitude.abs(),
        BreakoutType::Bearish => -magnitude.abs(),
        BreakoutType::Fake | BreakoutType::None => magnitude,
    }
}

/// `[min, max)`에서 균등하게 시작 시각을 뽑습니다.
fn draw_start<R: Rng + ?Sized>(window: TimeWindow, rng: &mut R) -> f64 {
    if window.max > window.min {
        rng.gen_range(window.min..window.max)
    } else {
        window.min
    }
    .max(0.0)
}

fn ranging_segment(start: f64, end: f64) -> RegimeSegment {
    RegimeSegment {
        start_time: start,
        end_time: end,
        regime: Regime::RANGING,
        sign: Sign::Flat,
        target_price: None,
        description: "ranging".to_string(),
    }
}

/// 정렬된 이동 구간을 빈틈 없는 타임라인으로 펼칩니다.
///
/// 앞 구간과 겹치는 부분은 잘라내고, 시나리오 길이를 넘는 부분은 버립니다.
fn build_timeline(moves: &[ScheduledMove], duration: f64) -> Vec<RegimeSegment> {
    let mut timeline = Vec::with_capacity(moves.len() * 2 + 1);
    let mut cursor = 0.0;

    for mv in moves {
        let start = mv.start.max(cursor);
        let end = mv.end.min(duration);
        if end <= start {
            continue;
        }
        if start > cursor {
            timeline.push(ranging_segment(cursor, start));
        }
        timeline.push(RegimeSegment {
            start_time: start,
            end_time: end,
            regime: Regime::BREAKOUT,
            sign: mv.sign(),
            target_price: Some(mv.target),
            description: mv.description.clone(),
        });
        cursor = end;
    }

    if cursor < duration || timeline.is_empty() {
        timeline.push(ranging_segment(cursor, duration));
    }
    timeline
}
