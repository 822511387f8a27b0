//! 레짐 조건부 합성 시세 생성.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 모델 파일 로딩과 레짐별 포아송/가중 추출 ([`RegimeModel`])
//! - 목표가 편향 함수 ([`target_biased_delta`])
//! - 스텝 단위 매수/매도 틱 생성기 ([`TickGenerator`])
//! - 거래소별 호가 분배 협력자 ([`QuoteSplitter`])
//!
//! # 예제
//!
//! ```rust,ignore
//! use sim_market::{RegimeModel, TickGenerator};
//!
//! let model = Arc::new(RegimeModel::load("data/regime_model.json")?);
//! let mut generator = TickGenerator::new(model, dec!(100), dec!(0.01), 42);
//! let ticks = generator.step(Utc::now(), Regime::RANGING, Sign::Flat, None);
//! ```

pub mod bias;
pub mod generator;
pub mod model;
pub mod venue;

pub use bias::target_biased_delta;
pub use generator::TickGenerator;
pub use model::{
    sample_poisson, ModelDocument, RegimeModel, SampledTick, TickBucket, MAX_UPDATE_RATE,
};
pub use venue::{MirrorSplitter, QuoteSplitter, VenueQuote};
