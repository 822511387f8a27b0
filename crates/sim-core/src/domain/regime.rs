//! 레짐 태그와 가격 방향.
//!
//! 레짐은 (모멘텀, 브레이크아웃) 두 범주 태그의 쌍이며, 틱 모델의 조건이 됩니다.
//! 모델 파일의 복합 키 문자열은 이 모듈에서만 만들고 해석합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 복합 키 구분자.
pub const KEY_SEPARATOR: char = ',';

/// 모멘텀 범주.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MomentumTag {
    /// 약한 모멘텀
    Low,
    /// 보통 모멘텀
    #[default]
    Normal,
    /// 강한 모멘텀
    High,
}

impl MomentumTag {
    /// 모델 파일에서 사용하는 태그 문자열.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Normal => "Normal",
            Self::High => "High",
        }
    }
}

impl FromStr for MomentumTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Low" => Ok(Self::Low),
            "Normal" => Ok(Self::Normal),
            "High" => Ok(Self::High),
            other => Err(format!("unknown momentum tag: {other}")),
        }
    }
}

/// 브레이크아웃 범주.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BreakoutTag {
    /// 박스권 내부 (평상시)
    #[default]
    Outside,
    /// 브레이크아웃 진행 중
    Breakout,
}

impl BreakoutTag {
    /// 모델 파일에서 사용하는 태그 문자열.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Outside => "Outside",
            Self::Breakout => "Breakout",
        }
    }
}

impl FromStr for BreakoutTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Outside" => Ok(Self::Outside),
            "Breakout" => Ok(Self::Breakout),
            other => Err(format!("unknown breakout tag: {other}")),
        }
    }
}

/// 가격 변화 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Sign {
    Up,
    Down,
    #[default]
    Flat,
}

impl Sign {
    /// 가격 변화량에서 방향을 결정합니다.
    pub fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            Self::Up
        } else if delta < 0.0 {
            Self::Down
        } else {
            Self::Flat
        }
    }

    /// 모델 파일에서 사용하는 태그 문자열.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "Up",
            Self::Down => "Down",
            Self::Flat => "Flat",
        }
    }
}

impl FromStr for Sign {
    type Err = String;

    /// `Up`/`Down`/`Flat` 또는 숫자 표기 `1`/`-1`/`0`을 받습니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Up" | "1" | "+1" => Ok(Self::Up),
            "Down" | "-1" => Ok(Self::Down),
            "Flat" | "0" => Ok(Self::Flat),
            other => Err(format!("unknown sign tag: {other}")),
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// (모멘텀, 브레이크아웃) 레짐 쌍.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Regime {
    pub momentum: MomentumTag,
    pub breakout: BreakoutTag,
}

impl Regime {
    /// 평상시 박스권 레짐 (Normal, Outside).
    pub const RANGING: Regime = Regime {
        momentum: MomentumTag::Normal,
        breakout: BreakoutTag::Outside,
    };

    /// 브레이크아웃 레짐 (Normal, Breakout).
    pub const BREAKOUT: Regime = Regime {
        momentum: MomentumTag::Normal,
        breakout: BreakoutTag::Breakout,
    };

    pub fn new(momentum: MomentumTag, breakout: BreakoutTag) -> Self {
        Self { momentum, breakout }
    }

    /// 브레이크아웃 태그가 붙은 레짐인지 확인합니다.
    pub fn is_breakout(&self) -> bool {
        self.breakout == BreakoutTag::Breakout
    }

    /// 업데이트 빈도 테이블용 키 (`"Normal,Outside"`).
    pub fn key(&self) -> String {
        format!(
            "{}{KEY_SEPARATOR}{}",
            self.momentum.as_str(),
            self.breakout.as_str()
        )
    }

    /// 전이 테이블용 키 (`"Normal,Outside,Up"`).
    pub fn transition_key(&self, sign: Sign) -> String {
        format!("{}{KEY_SEPARATOR}{}", self.key(), sign.as_str())
    }

    /// 전이 테이블 키를 (레짐, 방향)으로 해석합니다.
    pub fn parse_transition_key(key: &str) -> Result<(Regime, Sign), String> {
        let parts: Vec<&str> = key.split(KEY_SEPARATOR).collect();
        if parts.len() != 3 {
            return Err(format!(
                "transition key must have 3 fields, got {}: {key:?}",
                parts.len()
            ));
        }
        let regime = Regime::new(parts[0].parse()?, parts[1].parse()?);
        let sign = parts[2].parse()?;
        Ok((regime, sign))
    }
}

impl FromStr for Regime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(KEY_SEPARATOR).collect();
        if parts.len() != 2 {
            return Err(format!(
                "regime key must have 2 fields, got {}: {s:?}",
                parts.len()
            ));
        }
        Ok(Regime::new(parts[0].parse()?, parts[1].parse()?))
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.momentum.as_str(), self.breakout.as_str())
    }
}
