//! 시뮬레이션 실행 명령어.
//!
//! # 사용 예시
//!
//! ```bash
//! # 상방 돌파 프리셋을 120초 동안 헤드리스로 실행
//! breakout-sim run -p bullish -d 120
//!
//! # 시나리오 파일을 시드 고정으로 실행, JSON 줄 출력
//! breakout-sim run -s scenarios/fake_then_real.toml --seed 42 --format json
//!
//! # 실제 시간 간격(500ms)으로 실행
//! breakout-sim run -p bearish --realtime --interval-ms 500
//! ```

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, Utc};
use sim_core::{PivotKind, SimConfig};
use sim_engine::{MarketState, SimulationEngine};
use sim_market::{MirrorSplitter, RegimeModel};
use sim_notification::{BreakoutListener, Notification, NotificationResult};
use std::sync::{Arc, Mutex};
use tracing::{error, info};

use crate::commands::output::{notification_row, state_header, state_row, OutputFormat, OutputLine};
use crate::commands::scenario::ScenarioSource;

/// 실행 명령 설정.
#[derive(Debug, Clone)]
pub struct RunCliConfig {
    /// 시나리오 출처
    pub source: ScenarioSource,
    /// 난수 시드 (설정 파일 값보다 우선)
    pub seed: Option<u64>,
    /// 실행할 스텝 수 (없으면 시나리오 길이만큼)
    pub steps: Option<usize>,
    /// 스텝 간격 (밀리초, 없으면 설정 파일 값)
    pub interval_ms: Option<u64>,
    /// 실제 시간 간격으로 실행
    pub realtime: bool,
    /// 출력 형식
    pub format: OutputFormat,
    /// 거래소 분배 대상 (비어 있으면 분배 안 함)
    pub venues: Vec<String>,
}

/// 실행 요약.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub steps: usize,
    pub ticks: usize,
    pub pivot_highs: usize,
    pub pivot_lows: usize,
    pub notifications: usize,
    pub final_state: Option<MarketState>,
}

/// 알림을 모아 두었다가 스텝이 끝난 뒤 출력합니다.
#[derive(Default)]
struct Collector {
    pending: Mutex<Vec<Notification>>,
}

impl BreakoutListener for Collector {
    fn on_notification(&self, notification: &Notification) -> NotificationResult<()> {
        if let Ok(mut pending) = self.pending.lock() {
            pending.push(notification.clone());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "cli-collector"
    }
}

impl Collector {
    fn drain(&self) -> Vec<Notification> {
        self.pending
            .lock()
            .map(|mut pending| std::mem::take(&mut *pending))
            .unwrap_or_default()
    }
}

/// 시뮬레이션을 실행합니다.
pub async fn run_simulation(config: RunCliConfig, settings: &SimConfig) -> Result<RunSummary> {
    let scenario = config.source.load()?;
    let model = RegimeModel::load(&settings.model.path)
        .inspect_err(|e| {
            if e.is_corrupt_asset() {
                error!(
                    path = %settings.model.path.display(),
                    "Model file is corrupt, regenerate it before retrying"
                );
            }
        })
        .with_context(|| format!("failed to load model {}", settings.model.path.display()))?;
    let model = Arc::new(model);

    let mut engine_config = settings.engine.clone();
    if config.seed.is_some() {
        engine_config.seed = config.seed;
    }
    let interval_ms = config.interval_ms.unwrap_or(engine_config.step_interval_ms).max(1);
    let steps = config.steps.unwrap_or_else(|| {
        ((scenario.duration * 1000.0) / interval_ms as f64).ceil() as usize
    });

    let span = sim_core::scenario_span!(
        "simulation",
        scenario.breakout.breakout_type,
        engine_config.seed
    );
    let started_at = Utc::now();
    let mut engine = SimulationEngine::new(
        engine_config,
        settings.notification.clone(),
        model,
        scenario,
        started_at,
    )?;
    if !config.venues.is_empty() {
        engine = engine.with_splitter(MirrorSplitter::new(config.venues.clone()));
    }

    let collector = Arc::new(Collector::default());
    engine
        .notifier_mut()
        .subscribe_all(Arc::clone(&collector) as Arc<dyn BreakoutListener>);

    info!(
        steps,
        interval_ms,
        realtime = config.realtime,
        source = %config.source,
        "Simulation started"
    );

    if config.format == OutputFormat::Table {
        println!("{}", state_header());
    }

    let step_interval = std::time::Duration::from_millis(interval_ms);
    let mut ticker = tokio::time::interval(step_interval);
    let mut summary = RunSummary::default();

    for step in 1..=steps {
        let now = if config.realtime {
            ticker.tick().await;
            Utc::now()
        } else {
            let offset = i64::try_from(step as u64 * interval_ms)
                .map_err(|_| anyhow!("step offset overflow"))?;
            started_at + Duration::milliseconds(offset)
        };

        let _entered = span.enter();
        let state = engine.step(now);
        summary.steps += 1;
        summary.ticks += state.tick_count;
        match state.pivot {
            Some(PivotKind::PivotHigh) => summary.pivot_highs += 1,
            Some(PivotKind::PivotLow) => summary.pivot_lows += 1,
            None => {}
        }

        let notifications = collector.drain();
        summary.notifications += notifications.len();
        emit(config.format, state, &notifications)?;

        // 스텝 수를 지정하지 않았으면 시나리오 길이에서 멈춥니다.
        if config.steps.is_none() && engine.is_finished(now) {
            break;
        }
    }

    summary.final_state = Some(engine.state().clone());
    info!(
        steps = summary.steps,
        ticks = summary.ticks,
        pivot_highs = summary.pivot_highs,
        pivot_lows = summary.pivot_lows,
        notifications = summary.notifications,
        "Simulation finished"
    );
    Ok(summary)
}

fn emit(format: OutputFormat, state: &MarketState, notifications: &[Notification]) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", state_row(state));
            for notification in notifications {
                println!("{}", notification_row(notification));
            }
        }
        OutputFormat::Json => {
            println!("{}", OutputLine::State(state).to_json()?);
            for notification in notifications {
                println!("{}", OutputLine::Notification(notification).to_json()?);
            }
        }
    }
    Ok(())
}

/// 실행 요약을 출력합니다.
pub fn print_summary(summary: &RunSummary) {
    println!("\n=== 시뮬레이션 요약 ===");
    println!("스텝: {}", summary.steps);
    println!("틱: {}", summary.ticks);
    println!("피벗 고점/저점: {} / {}", summary.pivot_highs, summary.pivot_lows);
    println!("알림: {}", summary.notifications);
    if let Some(state) = &summary.final_state {
        println!("최종 호가: {} / {}", state.bid, state.ask);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sim_core::ModelConfig;
    use sim_scenario::Preset;

    fn settings() -> SimConfig {
        SimConfig {
            model: ModelConfig {
                path: std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                    .join("../../data/regime_model.json"),
            },
            ..Default::default()
        }
    }

    fn run_config(steps: usize) -> RunCliConfig {
        RunCliConfig {
            source: ScenarioSource::Preset {
                preset: Preset::Bullish,
                start_price: dec!(100),
                duration: 60.0,
            },
            seed: Some(5),
            steps: Some(steps),
            interval_ms: None,
            realtime: false,
            format: OutputFormat::Json,
            venues: vec!["NYSE".to_string()],
        }
    }

    #[tokio::test]
    async fn test_headless_run() {
        let summary = run_simulation(run_config(60), &settings()).await.unwrap();
        assert_eq!(summary.steps, 60);
        assert!(summary.ticks > 0);
        assert!(summary.notifications > 0);
        let state = summary.final_state.unwrap();
        assert!(state.ask > state.bid);
        assert_eq!(state.venue_quotes.len(), 1);
    }

    #[tokio::test]
    async fn test_steps_default_to_duration() {
        let mut config = run_config(0);
        config.steps = None;
        config.interval_ms = Some(2000);
        let summary = run_simulation(config, &settings()).await.unwrap();
        assert_eq!(summary.steps, 30);
    }

    #[tokio::test]
    async fn test_corrupt_model_fails() {
        let path = std::env::temp_dir().join(format!("corrupt-model-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "transition": { "Normal,Sideways,Up": { "1,1,1": 1 } } }"#)
            .unwrap();
        let mut settings = settings();
        settings.model.path = path.clone();

        let err = run_simulation(run_config(5), &settings).await.unwrap_err();
        let _ = std::fs::remove_file(&path);
        let sim_err = err.downcast_ref::<sim_core::SimError>().unwrap();
        assert!(sim_err.is_corrupt_asset());
    }

    #[tokio::test]
    async fn test_missing_model_runs_on_empty_model() {
        let mut settings = settings();
        settings.model.path = "does/not/exist.json".into();
        let summary = run_simulation(run_config(10), &settings).await.unwrap();
        assert_eq!(summary.ticks, 0);
    }
}
