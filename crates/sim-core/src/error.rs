//! 시뮬레이터의 에러 타입.
//!
//! 정상 경로에서는 에러가 발생하지 않습니다. 손상된 모델 파일, 잘못된
//! 시나리오, 설정 로드 실패만 호출자에게 전달됩니다.

use thiserror::Error;

/// 핵심 시뮬레이터 에러.
#[derive(Debug, Error)]
pub enum SimError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 모델 파일 형식 에러 (파일은 존재하지만 구조가 잘못됨)
    #[error("모델 형식 에러: {0}")]
    ModelFormat(String),

    /// 잘못된 시나리오
    #[error("잘못된 시나리오: {0}")]
    InvalidScenario(String),

    /// 입출력 에러
    #[error("입출력 에러: {0}")]
    Io(#[from] std::io::Error),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),
}

/// 시뮬레이터 작업을 위한 Result 타입.
pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    /// 손상된 에셋으로 인한 에러인지 확인합니다.
    ///
    /// 이 경우 재시도해도 결과가 달라지지 않습니다.
    pub fn is_corrupt_asset(&self) -> bool {
        matches!(self, SimError::ModelFormat(_) | SimError::Serialization(_))
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for SimError {
    fn from(err: toml::de::Error) -> Self {
        SimError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for SimError {
    fn from(err: config::ConfigError) -> Self {
        SimError::Config(err.to_string())
    }
}
