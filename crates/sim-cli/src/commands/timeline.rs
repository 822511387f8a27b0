//! 레짐 타임라인 출력 명령어.
//!
//! ```bash
//! breakout-sim timeline -p fake-then-real --seed 7
//! ```

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sim_scenario::RegimeScheduler;

use crate::commands::output::{segment_row, OutputFormat, OutputLine};
use crate::commands::scenario::ScenarioSource;

/// 시나리오를 스케줄하고 타임라인을 반환합니다.
pub fn build_timeline(source: &ScenarioSource, seed: Option<u64>) -> Result<RegimeScheduler> {
    let scenario = source.load()?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    Ok(RegimeScheduler::from_scenario(&scenario, &mut rng))
}

/// 타임라인과 주 브레이크아웃을 출력합니다.
pub fn print_timeline(scheduler: &RegimeScheduler, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!(
                "{:>8} {:>8} {:<16} {:>5} {:>10}  description",
                "start", "end", "regime", "sign", "target"
            );
            for segment in scheduler.timeline() {
                println!("{}", segment_row(segment));
            }
            match scheduler.breakout_event() {
                Some(event) => println!(
                    "\n주 브레이크아웃: {} {:.2}s ~ {:.2}s, 목표가 {} ({:?})",
                    event.breakout_type,
                    event.start_time,
                    event.end_time,
                    event.target_price,
                    event.speed
                ),
                None => println!("\n주 브레이크아웃 없음"),
            }
        }
        OutputFormat::Json => {
            for segment in scheduler.timeline() {
                println!("{}", OutputLine::Segment(segment).to_json()?);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sim_scenario::Preset;

    #[test]
    fn test_seeded_timeline_is_reproducible() {
        let source = ScenarioSource::Preset {
            preset: Preset::FakeThenReal,
            start_price: dec!(100),
            duration: 120.0,
        };
        let a = build_timeline(&source, Some(7)).unwrap();
        let b = build_timeline(&source, Some(7)).unwrap();
        assert_eq!(a.timeline(), b.timeline());
        assert!(a.breakout_event().is_some());
    }
}
