//! CLI 명령어 구현 모듈.

pub mod output;
pub mod run;
pub mod scenario;
pub mod timeline;
