//! 브레이크아웃 시뮬레이터 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 상방 돌파 프리셋 실행 (표 출력)
//! breakout-sim run -p bullish
//!
//! # 시나리오 파일, 시드 고정, JSON 줄 출력
//! breakout-sim run -s scenarios/bearish.toml --seed 42 --format json
//!
//! # 거래소 분배 포함 실시간 실행
//! breakout-sim run -p fake-then-real --realtime --venue NYSE --venue NASDAQ
//!
//! # 스케줄된 타임라인만 보기
//! breakout-sim timeline -p fake-then-real --seed 7
//! ```

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sim_core::{init_logging, LogConfig, SimConfig};
use tracing::{error, info};

use sim_cli::commands::output::OutputFormat;
use sim_cli::commands::run::{print_summary, run_simulation, RunCliConfig};
use sim_cli::commands::scenario::ScenarioSource;
use sim_cli::commands::timeline::{build_timeline, print_timeline};

#[derive(Parser)]
#[command(name = "breakout-sim")]
#[command(about = "Synthetic bid/ask breakout simulator - 레짐 기반 합성 시세 시뮬레이터", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 시나리오 실행
    Run {
        /// 프리셋 (ranging, bullish, bearish, fake-then-real)
        #[arg(short, long, default_value = "bullish")]
        preset: String,

        /// 시나리오 TOML 파일 (프리셋보다 우선)
        #[arg(short, long)]
        scenario: Option<String>,

        /// 프리셋 시작가
        #[arg(long, default_value = "100.00")]
        start_price: Decimal,

        /// 프리셋 길이 (초)
        #[arg(short, long, default_value = "120")]
        duration: f64,

        /// 난수 시드
        #[arg(long)]
        seed: Option<u64>,

        /// 실행할 스텝 수 (기본: 시나리오 길이 / 스텝 간격)
        #[arg(long)]
        steps: Option<usize>,

        /// 스텝 간격 (밀리초, 기본: 설정 파일)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// 실제 시간 간격으로 실행
        #[arg(long, default_value = "false")]
        realtime: bool,

        /// 출력 형식 (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// 호가를 분배할 거래소 (여러 번 지정 가능)
        #[arg(long = "venue")]
        venues: Vec<String>,
    },

    /// 스케줄된 레짐 타임라인 출력
    Timeline {
        /// 프리셋 (ranging, bullish, bearish, fake-then-real)
        #[arg(short, long, default_value = "bullish")]
        preset: String,

        /// 시나리오 TOML 파일 (프리셋보다 우선)
        #[arg(short, long)]
        scenario: Option<String>,

        /// 프리셋 시작가
        #[arg(long, default_value = "100.00")]
        start_price: Decimal,

        /// 프리셋 길이 (초)
        #[arg(short, long, default_value = "120")]
        duration: f64,

        /// 난수 시드
        #[arg(long)]
        seed: Option<u64>,

        /// 출력 형식 (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = SimConfig::load(&cli.config)?;
    init_logging(LogConfig::from_section(&settings.logging))
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))?;

    match cli.command {
        Commands::Run {
            preset,
            scenario,
            start_price,
            duration,
            seed,
            steps,
            interval_ms,
            realtime,
            format,
            venues,
        } => {
            let format = format.parse::<OutputFormat>().map_err(|e| anyhow!(e))?;
            let source =
                ScenarioSource::from_args(&preset, scenario.as_deref(), start_price, duration)?;

            let config = RunCliConfig {
                source,
                seed,
                steps,
                interval_ms,
                realtime,
                format,
                venues,
            };

            match run_simulation(config, &settings).await {
                Ok(summary) => {
                    if format == OutputFormat::Table {
                        print_summary(&summary);
                    }
                }
                Err(e) => {
                    error!("Simulation failed: {:#}", e);
                    return Err(e);
                }
            }
        }

        Commands::Timeline {
            preset,
            scenario,
            start_price,
            duration,
            seed,
            format,
        } => {
            let format = format.parse::<OutputFormat>().map_err(|e| anyhow!(e))?;
            let source =
                ScenarioSource::from_args(&preset, scenario.as_deref(), start_price, duration)?;
            let scheduler = build_timeline(&source, seed)?;
            info!(segments = scheduler.timeline().len(), "Timeline scheduled");
            print_timeline(&scheduler, format)?;
        }
    }

    Ok(())
}
