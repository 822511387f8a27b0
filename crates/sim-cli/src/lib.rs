//! 브레이크아웃 시뮬레이터 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 프리셋 또는 TOML 파일에서 시나리오 읽기
//! - 헤드리스/실시간 시뮬레이션 실행
//! - 스케줄된 레짐 타임라인 출력

pub mod commands;
