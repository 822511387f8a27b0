//! # Sim Notification
//!
//! 브레이크아웃 생애주기 알림.
//!
//! 지원 이벤트:
//! - 사전 경고 (warning)
//! - 시작 (start)
//! - 진행률 (progress)
//! - 완료 (completion)
//!
//! 리스너는 이벤트 종류별로 등록 순서대로 동기 호출됩니다.

pub mod log_listener;
pub mod notifier;
pub mod types;

pub use log_listener::*;
pub use notifier::*;
pub use types::*;
