//! 배포용 모델 파일 통합 테스트.
//!
//! `data/regime_model.json`이 로드되고, 생성기가 그 위에서 정상적인
//! 호가를 만드는지 검증합니다.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal_macros::dec;
use std::path::PathBuf;
use std::sync::Arc;

use sim_core::{BreakoutTag, MomentumTag, Regime, Sign, MIN_SPREAD};
use sim_market::{RegimeModel, SampledTick, TickGenerator};

fn model_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/regime_model.json")
}

#[test]
fn test_bundled_model_loads() {
    let model = RegimeModel::load(model_path()).expect("bundled model must parse");

    assert!(!model.is_empty());
    assert_eq!(model.len(), 8);
    assert!((model.update_rate(Regime::RANGING) - 3.0).abs() < 1e-9);
    assert!((model.update_rate(Regime::BREAKOUT) - 6.0).abs() < 1e-9);
    assert!(
        (model.update_rate(Regime::new(MomentumTag::High, BreakoutTag::Breakout)) - 10.0).abs()
            < 1e-9
    );
}

#[test]
fn test_bundled_model_has_no_ranging_high_momentum() {
    let model = RegimeModel::load(model_path()).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let regime = Regime::new(MomentumTag::High, BreakoutTag::Outside);
    assert_eq!(model.update_rate(regime), 0.0);
    assert_eq!(model.sample_tick(regime, Sign::Up, &mut rng), SampledTick::FALLBACK);
}

#[test]
fn test_generator_on_bundled_model() {
    let model = Arc::new(RegimeModel::load(model_path()).unwrap());
    let mut generator = TickGenerator::new(model, dec!(100), dec!(0.01), 2024);

    let mut count = 0;
    for _ in 0..120 {
        for tick in generator.step(Utc::now(), Regime::RANGING, Sign::Flat, None) {
            assert!(tick.ask >= tick.bid + MIN_SPREAD);
            assert_eq!(tick.bid, tick.bid.round_dp(2));
            assert_eq!(tick.bid_size, tick.ask_size);
            count += 1;
        }
    }
    // λ = 3 이므로 120 스텝에 대략 360틱
    assert!(count > 250 && count < 470, "count = {count}");
}

#[test]
fn test_target_bias_reaches_breakout_target() {
    let model = Arc::new(RegimeModel::load(model_path()).unwrap());
    let target = dec!(101);
    let runs = 20;

    let mut total = dec!(0);
    for seed in 0..runs {
        let mut generator = TickGenerator::new(Arc::clone(&model), dec!(100), dec!(0.01), seed);
        for _ in 0..100 {
            generator.step(Utc::now(), Regime::BREAKOUT, Sign::Up, Some(target));
        }
        total += generator.bid();
    }

    let average = total / rust_decimal::Decimal::from(runs);
    assert!(
        (average - target).abs() < dec!(0.5),
        "average final bid {average} far from target"
    );
}
