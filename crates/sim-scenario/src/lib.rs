//! 시나리오 프리셋과 레짐 타임라인 스케줄링.
//!
//! - [`presets`]: 박스권, 상방/하방 돌파, 가짜 돌파 후 진짜 돌파 시나리오
//! - [`RegimeScheduler`]: 시나리오를 `[start, end)` 세그먼트 타임라인으로 변환

pub mod presets;
pub mod scheduler;

pub use presets::Preset;
pub use scheduler::{breakout_duration, target_price, RegimeScheduler};
