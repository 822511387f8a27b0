//! 스텝 구동 시뮬레이션 엔진.
//!
//! 이 crate는 다음을 제공합니다:
//! - 레짐 조회, 틱 생성, 피벗 판정, 알림을 묶는 [`SimulationEngine`]
//! - UI 협력자에게 노출하는 스텝 스냅샷 [`MarketState`]
//!
//! # 예제
//!
//! ```rust,ignore
//! use sim_engine::SimulationEngine;
//!
//! let model = Arc::new(RegimeModel::load(&config.model.path)?);
//! let scenario = Preset::Bullish.build(dec!(100), 120.0);
//! let mut engine = SimulationEngine::new(
//!     config.engine.clone(),
//!     config.notification.clone(),
//!     model,
//!     scenario,
//!     Utc::now(),
//! )?;
//!
//! let state = engine.step(Utc::now());
//! println!("{} / {} pivot={:?}", state.bid, state.ask, state.pivot);
//! ```

pub mod engine;
pub mod state;

pub use engine::SimulationEngine;
pub use state::MarketState;
