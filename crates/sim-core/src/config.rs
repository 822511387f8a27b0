//! 설정 관리.
//!
//! 애플리케이션 설정을 정의하고 파일 및 환경 변수에서 로드합니다.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::SimResult;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SimConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 레짐 모델 설정
    #[serde(default)]
    pub model: ModelConfig,
    /// 시뮬레이션 엔진 설정
    #[serde(default)]
    pub engine: EngineConfig,
    /// 브레이크아웃 알림 설정
    #[serde(default)]
    pub notification: NotificationConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 레짐 모델 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    /// 모델 데이터 파일 경로 (없으면 빈 모델로 실행)
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/regime_model.json"),
        }
    }
}

/// 시뮬레이션 엔진 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// 피벗 윈도우 (버퍼 용량 = 2 * window + 1)
    #[serde(default = "default_pivot_window")]
    pub pivot_window: usize,
    /// 외부 스텝 간격 (밀리초)
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,
    /// 난수 시드 (없으면 엔트로피에서 생성)
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_pivot_window() -> usize {
    5
}

fn default_step_interval_ms() -> u64 {
    1000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pivot_window: default_pivot_window(),
            step_interval_ms: default_step_interval_ms(),
            seed: None,
        }
    }
}

/// 브레이크아웃 알림 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// 진행률 알림 최소 간격 (초)
    #[serde(default = "default_one_second")]
    pub progress_interval_secs: f64,
    /// 사전 경고 알림 최소 간격 (초)
    #[serde(default = "default_one_second")]
    pub warning_interval_secs: f64,
}

fn default_one_second() -> f64 {
    1.0
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            progress_interval_secs: default_one_second(),
            warning_interval_secs: default_one_second(),
        }
    }
}

impl SimConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 환경 변수는 `SIM__ENGINE__PIVOT_WINDOW=7` 형식으로 파일 값을 덮어씁니다.
    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let builder = config::Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("SIM")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
