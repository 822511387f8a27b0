//! 자주 쓰는 시나리오 프리셋.

use rust_decimal::Decimal;
use sim_core::{
    AdvancedFeatures, BreakoutConfig, BreakoutSpeed, BreakoutType, FakeBreakoutConfig,
    ScenarioSpec, SpreadConfig, TimeWindow,
};
use std::fmt;
use std::str::FromStr;

/// 프리셋 기본 사전 경고 리드 타임 (초).
pub const DEFAULT_PRE_WARNING: f64 = 5.0;

/// 브레이크아웃 없는 박스권 시나리오.
pub fn ranging(start_price: Decimal, duration: f64) -> ScenarioSpec {
    ScenarioSpec {
        start_price,
        duration,
        breakout: BreakoutConfig::default(),
        spread: SpreadConfig::default(),
        advanced: None,
    }
}

/// 상방 돌파 시나리오.
pub fn bullish_breakout(
    start_price: Decimal,
    duration: f64,
    magnitude: f64,
    window: TimeWindow,
    speed: BreakoutSpeed,
) -> ScenarioSpec {
    directional(BreakoutType::Bullish, start_price, duration, magnitude, window, speed)
}

/// 하방 이탈 시나리오. `magnitude`는 절댓값으로 해석합니다.
pub fn bearish_breakout(
    start_price: Decimal,
    duration: f64,
    magnitude: f64,
    window: TimeWindow,
    speed: BreakoutSpeed,
) -> ScenarioSpec {
    directional(BreakoutType::Bearish, start_price, duration, magnitude, window, speed)
}

fn directional(
    breakout_type: BreakoutType,
    start_price: Decimal,
    duration: f64,
    magnitude: f64,
    window: TimeWindow,
    speed: BreakoutSpeed,
) -> ScenarioSpec {
    ScenarioSpec {
        start_price,
        duration,
        breakout: BreakoutConfig {
            breakout_type,
            time_window: window,
            magnitude,
            speed,
            pre_warning: Some(DEFAULT_PRE_WARNING),
            notify: true,
        },
        spread: SpreadConfig::default(),
        advanced: None,
    }
}

/// 초반에 하방 가짜 이탈 후 되돌림, 이어서 진짜 상방 돌파가 나오는 시나리오.
///
/// 시나리오 길이는 최소 90초를 가정합니다.
pub fn fake_then_real(start_price: Decimal, duration: f64) -> ScenarioSpec {
    let mut spec = bullish_breakout(
        start_price,
        duration,
        1.5,
        TimeWindow::new(50.0, 60.0),
        BreakoutSpeed::Gradual,
    );
    spec.advanced = Some(AdvancedFeatures {
        fake_breakouts: vec![FakeBreakoutConfig {
            time_window: TimeWindow::new(10.0, 20.0),
            magnitude: -0.6,
            speed: BreakoutSpeed::Instant,
            reversal_speed: 6.0,
        }],
        ..Default::default()
    });
    spec
}

/// CLI 등에서 이름으로 고르는 프리셋.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Ranging,
    Bullish,
    Bearish,
    FakeThenReal,
}

impl Preset {
    /// 프리셋 기본값으로 시나리오를 만듭니다.
    pub fn build(self, start_price: Decimal, duration: f64) -> ScenarioSpec {
        let window = TimeWindow::new(duration * 0.3, duration * 0.6);
        match self {
            Self::Ranging => ranging(start_price, duration),
            Self::Bullish => {
                bullish_breakout(start_price, duration, 1.0, window, BreakoutSpeed::Gradual)
            }
            Self::Bearish => {
                bearish_breakout(start_price, duration, 1.0, window, BreakoutSpeed::Accelerating)
            }
            Self::FakeThenReal => fake_then_real(start_price, duration),
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ranging" | "none" => Ok(Self::Ranging),
            "bullish" => Ok(Self::Bullish),
            "bearish" => Ok(Self::Bearish),
            "fake" | "fake-then-real" | "fake_then_real" => Ok(Self::FakeThenReal),
            _ => Err(format!(
                "Unknown preset: {s}. Supported: ranging, bullish, bearish, fake-then-real"
            )),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ranging => "ranging",
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::FakeThenReal => "fake-then-real",
        };
        f.write_str(s)
    }
}
