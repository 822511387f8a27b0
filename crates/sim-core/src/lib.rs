//! # Sim Core
//!
//! 브레이크아웃 시뮬레이터의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시뮬레이션 파이프라인 전반에서 사용되는 기본 타입을 제공합니다:
//! - 레짐 태그 및 가격 방향(Sign)
//! - 틱 및 가격 스냅샷
//! - 시나리오 명세와 레짐 타임라인 세그먼트
//! - 피벗 태그
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
