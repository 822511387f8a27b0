//! 시뮬레이터 도메인 모델.
//!
//! 이 모듈은 시뮬레이션 파이프라인을 위한 핵심 도메인 타입을 포함합니다.

pub mod pivot;
pub mod regime;
pub mod scenario;
pub mod tick;
pub mod timeline;

pub use pivot::*;
pub use regime::*;
pub use scenario::*;
pub use tick::*;
pub use timeline::*;
