//! 시나리오 명세.
//!
//! 한 번의 시뮬레이션 실행을 기술하는 불변 설정입니다. 동작은 없고,
//! 스케줄러가 시작 시점에 한 번 읽어 타임라인을 만듭니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{SimError, SimResult};

/// 브레이크아웃 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BreakoutType {
    /// 상방 돌파
    Bullish,
    /// 하방 이탈
    Bearish,
    /// 돌파 후 시작가로 되돌림
    Fake,
    /// 브레이크아웃 없음 (박스권만)
    #[default]
    None,
}

impl BreakoutType {
    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

impl fmt::Display for BreakoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Fake => "fake",
            Self::None => "none",
        };
        f.write_str(s)
    }
}

/// 브레이크아웃 진행 속도.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BreakoutSpeed {
    Instant,
    #[default]
    Gradual,
    Accelerating,
}

/// 초 단위 시간 구간 `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub min: f64,
    pub max: f64,
}

impl TimeWindow {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// 주 브레이크아웃 설정.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutConfig {
    #[serde(rename = "type")]
    pub breakout_type: BreakoutType,
    /// 시작 시각을 뽑을 구간 (초)
    pub time_window: TimeWindow,
    /// 목표 변동폭 (%)
    pub magnitude: f64,
    #[serde(default)]
    pub speed: BreakoutSpeed,
    /// 사전 경고 리드 타임 (초)
    #[serde(default)]
    pub pre_warning: Option<f64>,
    /// 알림 활성화 여부
    #[serde(default = "default_true")]
    pub notify: bool,
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        Self {
            breakout_type: BreakoutType::None,
            time_window: TimeWindow::new(0.0, 0.0),
            magnitude: 0.0,
            speed: BreakoutSpeed::Gradual,
            pre_warning: None,
            notify: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// 스프레드 동작 설정.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadConfig {
    /// 기본 스프레드 (시작 호가에 사용)
    pub base: Decimal,
    pub volatility_multiplier: f64,
    pub min: Decimal,
    pub max: Decimal,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            base: Decimal::new(1, 2),
            volatility_multiplier: 1.0,
            min: Decimal::new(1, 2),
            max: Decimal::new(10, 2),
        }
    }
}

/// 가짜 돌파 설정.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FakeBreakoutConfig {
    pub time_window: TimeWindow,
    /// 부호 있는 변동폭 (%), 음수면 하방
    pub magnitude: f64,
    /// 설정은 받지만 기간 계산에는 항상 gradual 정책을 씁니다
    #[serde(default)]
    pub speed: BreakoutSpeed,
    /// 시작가로 되돌아가는 데 걸리는 시간 (초)
    pub reversal_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiddenLiquidityConfig {
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpoofingConfig {
    pub frequency: f64,
    pub size_multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeProfile {
    Uniform,
    UShaped,
    FrontLoaded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFlowConfig {
    pub toxicity: f64,
    pub aggressiveness: f64,
}

/// 고급 옵션.
///
/// 현재 스케줄링에 반영되는 것은 `fake_breakouts`뿐이며, 나머지는 받아서
/// 보관만 합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvancedFeatures {
    #[serde(default)]
    pub fake_breakouts: Vec<FakeBreakoutConfig>,
    #[serde(default)]
    pub hidden_liquidity: Option<HiddenLiquidityConfig>,
    #[serde(default)]
    pub spoofing: Option<SpoofingConfig>,
    #[serde(default)]
    pub momentum_persistence: Option<f64>,
    #[serde(default)]
    pub volatility_clustering: Option<f64>,
    #[serde(default)]
    pub volume_profile: Option<VolumeProfile>,
    #[serde(default)]
    pub order_flow: Option<OrderFlowConfig>,
}

/// 시뮬레이션 실행 하나의 선언적 명세.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub start_price: Decimal,
    /// 시나리오 길이 (초)
    pub duration: f64,
    pub breakout: BreakoutConfig,
    #[serde(default)]
    pub spread: SpreadConfig,
    #[serde(default)]
    pub advanced: Option<AdvancedFeatures>,
}

impl ScenarioSpec {
    /// 설정된 가짜 돌파 목록 (없으면 빈 슬라이스).
    pub fn fake_breakouts(&self) -> &[FakeBreakoutConfig] {
        self.advanced
            .as_ref()
            .map(|a| a.fake_breakouts.as_slice())
            .unwrap_or(&[])
    }

    /// 브레이크아웃 알림을 보내야 하는지 여부.
    pub fn notifications_enabled(&self) -> bool {
        !self.breakout.breakout_type.is_none() && self.breakout.notify
    }

    /// 명세의 구조적 일관성을 검증합니다.
    pub fn validate(&self) -> SimResult<()> {
        if !(self.duration > 0.0) {
            return Err(SimError::InvalidScenario(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        if self.start_price <= Decimal::ZERO {
            return Err(SimError::InvalidScenario(format!(
                "start price must be positive, got {}",
                self.start_price
            )));
        }
        let window = self.breakout.time_window;
        if !self.breakout.breakout_type.is_none() && window.min > window.max {
            return Err(SimError::InvalidScenario(format!(
                "breakout window min {} exceeds max {}",
                window.min, window.max
            )));
        }
        if self.spread.min > self.spread.max {
            return Err(SimError::InvalidScenario(format!(
                "spread min {} exceeds max {}",
                self.spread.min, self.spread.max
            )));
        }
        for fake in self.fake_breakouts() {
            if fake.time_window.min > fake.time_window.max {
                return Err(SimError::InvalidScenario(format!(
                    "fake breakout window min {} exceeds max {}",
                    fake.time_window.min, fake.time_window.max
                )));
            }
            if fake.reversal_speed < 0.0 {
                return Err(SimError::InvalidScenario(format!(
                    "reversal speed must not be negative, got {}",
                    fake.reversal_speed
                )));
            }
        }
        Ok(())
    }

    /// TOML 문자열에서 시나리오를 읽고 검증합니다.
    pub fn from_toml_str(s: &str) -> SimResult<Self> {
        let spec: ScenarioSpec = toml::from_str(s)?;
        spec.validate()?;
        Ok(spec)
    }

    /// TOML 파일에서 시나리오를 읽고 검증합니다.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ranging() -> ScenarioSpec {
        ScenarioSpec {
            start_price: dec!(100),
            duration: 60.0,
            breakout: BreakoutConfig::default(),
            spread: SpreadConfig::default(),
            advanced: None,
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(ranging().validate().is_ok());
        assert!(!ranging().notifications_enabled());
        assert!(ranging().fake_breakouts().is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut spec = ranging();
        spec.duration = 0.0;
        assert!(spec.validate().is_err());

        let mut spec = ranging();
        spec.start_price = dec!(-1);
        assert!(spec.validate().is_err());

        let mut spec = ranging();
        spec.breakout.breakout_type = BreakoutType::Bullish;
        spec.breakout.time_window = TimeWindow::new(40.0, 20.0);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_from_toml() {
        let spec = ScenarioSpec::from_toml_str(
            r#"
            start_price = "100.0"
            duration = 120.0

            [breakout]
            type = "bullish"
            time_window = { min = 20.0, max = 40.0 }
            magnitude = 1.5
            speed = "accelerating"
            pre_warning = 5.0

            [[advanced.fake_breakouts]]
            time_window = { min = 5.0, max = 10.0 }
            magnitude = -0.5
            reversal_speed = 4.0
            "#,
        )
        .unwrap();

        assert_eq!(spec.breakout.breakout_type, BreakoutType::Bullish);
        assert_eq!(spec.breakout.speed, BreakoutSpeed::Accelerating);
        assert!(spec.breakout.notify);
        assert_eq!(spec.spread, SpreadConfig::default());
        assert_eq!(spec.fake_breakouts().len(), 1);
        assert!(spec.notifications_enabled());
    }
}
