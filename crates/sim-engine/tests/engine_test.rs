//! 엔진 통합 테스트.

use chrono::{DateTime, Duration, Utc};
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::{Arc, Mutex};

use sim_core::{
    BreakoutSpeed, EngineConfig, NotificationConfig, Regime, ScenarioSpec, SimError, TimeWindow,
};
use sim_engine::SimulationEngine;
use sim_market::{MirrorSplitter, RegimeModel};
use sim_notification::{
    BreakoutListener, Notification, NotificationKind, NotificationResult,
};
use sim_scenario::presets;

/// 모든 키가 가중치 0인 모델. 업데이트는 일어나지만 항상 대체 틱이 나옵니다.
fn zero_weight_model() -> Arc<RegimeModel> {
    let doc = json!({
        "transition": {
            "Normal,Outside,Flat": { "1,1,1": 0 },
            "Normal,Breakout,Up": { "2,1,2": 0 }
        },
        "ticks_per_regime": { "Normal,Outside": 120, "Normal,Breakout": 120 },
        "seconds_per_regime": { "Normal,Outside": 60, "Normal,Breakout": 60 }
    });
    Arc::new(RegimeModel::from_json_str(&doc.to_string()).unwrap())
}

/// 상승 방향 버킷만 있는 모델.
fn trending_model() -> Arc<RegimeModel> {
    let doc = json!({
        "transition": {
            "Normal,Outside,Flat": { "1,1,1": 1, "-1,1,1": 1 },
            "Normal,Outside,Up": { "1,1,1": 1, "-1,1,1": 1 },
            "Normal,Outside,Down": { "1,1,1": 1, "-1,1,1": 1 },
            "Normal,Breakout,Flat": { "2,1,2": 1 },
            "Normal,Breakout,Up": { "2,1,2": 3, "-1,1,2": 1 },
            "Normal,Breakout,Down": { "2,1,2": 1, "-1,1,2": 1 }
        },
        "ticks_per_regime": { "Normal,Outside": 180, "Normal,Breakout": 600 },
        "seconds_per_regime": { "Normal,Outside": 60, "Normal,Breakout": 60 }
    });
    Arc::new(RegimeModel::from_json_str(&doc.to_string()).unwrap())
}

/// 저장소에 포함된 샘플 모델.
fn bundled_model() -> Arc<RegimeModel> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/regime_model.json");
    Arc::new(RegimeModel::load(path).unwrap())
}

fn config(seed: u64) -> EngineConfig {
    EngineConfig {
        pivot_window: 5,
        step_interval_ms: 1000,
        seed: Some(seed),
    }
}

fn engine(model: Arc<RegimeModel>, scenario: ScenarioSpec, t0: DateTime<Utc>) -> SimulationEngine {
    SimulationEngine::new(config(11), NotificationConfig::default(), model, scenario, t0).unwrap()
}

fn recorder() -> (Arc<Mutex<Vec<Notification>>>, Arc<dyn BreakoutListener>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let listener: Arc<dyn BreakoutListener> =
        Arc::new(move |n: &Notification| -> NotificationResult<()> {
            sink.lock().unwrap().push(n.clone());
            Ok(())
        });
    (seen, listener)
}

fn count(seen: &Mutex<Vec<Notification>>, kind: NotificationKind) -> usize {
    seen.lock().unwrap().iter().filter(|n| n.kind() == kind).count()
}

#[test]
fn test_flat_ranging_has_no_pivot() {
    let t0 = Utc::now();
    let mut engine = engine(zero_weight_model(), presets::ranging(dec!(100.0), 60.0), t0);

    let mut total_ticks = 0;
    for i in 1..=40 {
        let state = engine.step(t0 + Duration::seconds(i));
        assert_eq!(state.pivot, None, "pivot at step {i}");
        assert_eq!(state.bid, dec!(100.00));
        assert_eq!(state.ask, dec!(100.01));
        assert_eq!(state.mid, dec!(100.005));
        assert_eq!(state.regime, Regime::RANGING);
        total_ticks += state.tick_count;
    }

    assert!(total_ticks > 0);
    assert!(engine.history().is_full());
    assert_eq!(engine.history().capacity(), 11);
}

#[test]
fn test_bullish_breakout_event() {
    let scenario = presets::bullish_breakout(
        dec!(100.0),
        120.0,
        1.0,
        TimeWindow::new(20.0, 40.0),
        BreakoutSpeed::Gradual,
    );
    let engine = engine(trending_model(), scenario, Utc::now());

    let event = engine.scheduler().breakout_event().unwrap();
    assert_eq!(event.target_price, dec!(101.0));
    assert!(event.start_time >= 20.0 && event.start_time < 40.0);
}

#[test]
fn test_breakout_lifecycle_notifications() {
    let scenario = presets::bullish_breakout(
        dec!(100.0),
        120.0,
        1.0,
        TimeWindow::new(20.0, 40.0),
        BreakoutSpeed::Gradual,
    );
    let t0 = Utc::now();
    let mut engine = engine(trending_model(), scenario, t0);
    let (seen, listener) = recorder();
    engine.notifier_mut().subscribe_all(listener);

    let event = engine.scheduler().breakout_event().unwrap().clone();
    let mut saw_primary = false;
    for i in 1..=120 {
        let now = t0 + Duration::seconds(i);
        let state = engine.step(now);
        let elapsed = i as f64;

        assert_eq!(state.in_primary_breakout, event.contains(elapsed));
        saw_primary |= state.in_primary_breakout;
        match state.time_until_breakout {
            Some(remaining) => assert!((remaining - (event.start_time - elapsed)).abs() < 1e-9),
            None => assert!(elapsed >= event.start_time),
        }
    }

    assert!(saw_primary);
    assert_eq!(count(&seen, NotificationKind::Start), 1);
    assert!(count(&seen, NotificationKind::Warning) >= 1);
    assert!(count(&seen, NotificationKind::Warning) <= 5);
    assert!(count(&seen, NotificationKind::Progress) >= 1);
    assert!(count(&seen, NotificationKind::Completion) <= 1);
}

#[test]
fn test_fake_then_real_signals_each_episode() {
    let model = bundled_model();
    for seed in 0..8 {
        let t0 = Utc::now();
        let mut engine = SimulationEngine::new(
            config(seed),
            NotificationConfig::default(),
            Arc::clone(&model),
            presets::fake_then_real(dec!(100), 120.0),
            t0,
        )
        .unwrap();
        let (seen, listener) = recorder();
        engine.notifier_mut().subscribe_all(listener);

        for i in 1..=120 {
            engine.step(t0 + Duration::seconds(i));
        }

        let lifecycle: Vec<NotificationKind> = seen
            .lock()
            .unwrap()
            .iter()
            .map(Notification::kind)
            .filter(|k| matches!(k, NotificationKind::Start | NotificationKind::Completion))
            .collect();

        // 가짜 돌파 에피소드가 완료된 뒤 주 브레이크아웃이 새로 시작해야 합니다.
        assert_eq!(count(&seen, NotificationKind::Start), 2, "seed {seed}: {lifecycle:?}");
        assert_eq!(
            &lifecycle[..3],
            &[
                NotificationKind::Start,
                NotificationKind::Completion,
                NotificationKind::Start
            ],
            "seed {seed}"
        );
        assert!(lifecycle.len() <= 4, "seed {seed}: {lifecycle:?}");
        if let Some(last) = lifecycle.get(3) {
            assert_eq!(*last, NotificationKind::Completion);
        }
    }
}

#[test]
fn test_notify_flag_disables_notifications() {
    let mut scenario = presets::bullish_breakout(
        dec!(100.0),
        60.0,
        1.0,
        TimeWindow::new(10.0, 20.0),
        BreakoutSpeed::Instant,
    );
    scenario.breakout.notify = false;
    let t0 = Utc::now();
    let mut engine = engine(trending_model(), scenario, t0);
    let (seen, listener) = recorder();
    engine.notifier_mut().subscribe_all(listener);

    for i in 1..=60 {
        engine.step(t0 + Duration::seconds(i));
    }
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_same_seed_is_reproducible() {
    let t0 = Utc::now();
    let build = || {
        engine(
            trending_model(),
            presets::fake_then_real(dec!(100), 120.0),
            t0,
        )
    };
    let mut a = build();
    let mut b = build();

    assert_eq!(a.scheduler().timeline(), b.scheduler().timeline());
    for i in 1..=90 {
        let now = t0 + Duration::seconds(i);
        let (sa, sb) = (a.step(now).clone(), b.step(now).clone());
        assert_eq!(sa.bid, sb.bid);
        assert_eq!(sa.ask, sb.ask);
        assert_eq!(sa.pivot, sb.pivot);
    }
}

#[test]
fn test_invalid_reset_keeps_running_scenario() {
    let t0 = Utc::now();
    let mut engine = engine(trending_model(), presets::ranging(dec!(100), 60.0), t0);
    for i in 1..=5 {
        engine.step(t0 + Duration::seconds(i));
    }
    let before = engine.history().len();

    let mut invalid = presets::ranging(dec!(50), 60.0);
    invalid.duration = 0.0;
    let err = engine
        .reset_with_scenario(invalid, t0 + Duration::seconds(6))
        .unwrap_err();

    assert!(matches!(err, SimError::InvalidScenario(_)));
    assert_eq!(engine.scenario().start_price, dec!(100));
    assert_eq!(engine.history().len(), before);
    assert_eq!(engine.started_at(), t0);
}

#[test]
fn test_reset_replaces_all_state() {
    let t0 = Utc::now();
    let mut engine = engine(trending_model(), presets::ranging(dec!(100), 60.0), t0);
    for i in 1..=20 {
        engine.step(t0 + Duration::seconds(i));
    }

    let t1 = t0 + Duration::seconds(30);
    let next = presets::bullish_breakout(
        dec!(250),
        90.0,
        2.0,
        TimeWindow::new(30.0, 50.0),
        BreakoutSpeed::Accelerating,
    );
    engine.reset_with_scenario(next, t1).unwrap();

    assert!(engine.history().is_empty());
    assert!(!engine.notifier().is_in_progress());
    assert_eq!(engine.state().bid, dec!(250.00));
    assert_eq!(engine.state().ask, dec!(250.01));
    assert_eq!(engine.scheduler().breakout_event().unwrap().target_price, dec!(255));
    assert_eq!(engine.elapsed(t1 + Duration::seconds(3)), 3.0);
}

#[test]
fn test_splitter_receives_latest_tick() {
    let t0 = Utc::now();
    let mut engine = engine(trending_model(), presets::ranging(dec!(100), 60.0), t0)
        .with_splitter(MirrorSplitter::new(["NYSE", "NASDAQ"]));

    let mut quoted = false;
    for i in 1..=10 {
        let state = engine.step(t0 + Duration::seconds(i));
        if !state.venue_quotes.is_empty() {
            quoted = true;
            assert_eq!(state.venue_quotes.len(), 2);
            assert!(state.venue_quotes.iter().all(|q| q.bid == state.bid && q.ask == state.ask));
        }
    }
    assert!(quoted);
}

#[test]
fn test_engine_on_empty_model_holds_price() {
    let t0 = Utc::now();
    let mut engine = engine(
        Arc::new(RegimeModel::empty()),
        presets::bullish_breakout(
            dec!(100),
            60.0,
            1.0,
            TimeWindow::new(10.0, 20.0),
            BreakoutSpeed::Gradual,
        ),
        t0,
    );

    for i in 1..=30 {
        let state = engine.step(t0 + Duration::seconds(i));
        assert_eq!(state.tick_count, 0);
        assert_eq!(state.bid, dec!(100));
        assert!(state.pivot.is_none());
    }
}
