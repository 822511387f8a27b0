//! 시나리오 선택.
//!
//! 시나리오 파일이 주어지면 파일을, 아니면 프리셋을 사용합니다.

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use sim_core::ScenarioSpec;
use sim_scenario::Preset;
use std::path::PathBuf;
use tracing::info;

/// 시나리오 출처.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioSource {
    /// 이름 있는 프리셋 (시작가, 길이 지정)
    Preset {
        preset: Preset,
        start_price: Decimal,
        duration: f64,
    },
    /// TOML 시나리오 파일
    File(PathBuf),
}

impl ScenarioSource {
    /// CLI 인자에서 출처를 정합니다. 파일이 프리셋보다 우선합니다.
    pub fn from_args(
        preset: &str,
        file: Option<&str>,
        start_price: Decimal,
        duration: f64,
    ) -> Result<Self> {
        if let Some(path) = file {
            return Ok(Self::File(PathBuf::from(path)));
        }
        let preset = preset.parse::<Preset>().map_err(|e| anyhow!(e))?;
        Ok(Self::Preset {
            preset,
            start_price,
            duration,
        })
    }

    /// 시나리오를 만들고 검증합니다.
    pub fn load(&self) -> Result<ScenarioSpec> {
        let scenario = match self {
            Self::Preset {
                preset,
                start_price,
                duration,
            } => {
                let scenario = preset.build(*start_price, *duration);
                scenario
                    .validate()
                    .with_context(|| format!("preset {preset} is invalid"))?;
                scenario
            }
            Self::File(path) => ScenarioSpec::load(path)
                .with_context(|| format!("failed to load scenario {}", path.display()))?,
        };

        info!(
            source = %self,
            breakout = %scenario.breakout.breakout_type,
            start_price = %scenario.start_price,
            duration = scenario.duration,
            "Scenario loaded"
        );
        Ok(scenario)
    }
}

impl std::fmt::Display for ScenarioSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preset { preset, .. } => write!(f, "preset:{preset}"),
            Self::File(path) => write!(f, "file:{}", path.display()),
        }
    }
}
