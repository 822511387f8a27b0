//! 실행 결과 출력 형식.

use serde::Serialize;
use sim_core::RegimeSegment;
use sim_engine::MarketState;
use sim_notification::{LogListener, Notification};
use std::str::FromStr;

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// 사람이 읽는 표
    #[default]
    Table,
    /// 한 줄에 JSON 하나
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" | "jsonl" | "json-lines" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {s}. Supported: table, json")),
        }
    }
}

/// JSON 출력 한 줄.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputLine<'a> {
    State(&'a MarketState),
    Notification(&'a Notification),
    Segment(&'a RegimeSegment),
}

impl OutputLine<'_> {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// 상태 표 머리글.
pub fn state_header() -> String {
    format!(
        "{:>8} {:>10} {:>10} {:>11} {:<16} {:>5} {:<10} {:>6}",
        "elapsed", "bid", "ask", "mid", "regime", "sign", "pivot", "ticks"
    )
}

/// 상태 표 한 행.
pub fn state_row(state: &MarketState) -> String {
    let pivot = state
        .pivot
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    let marker = if state.in_primary_breakout { "*" } else { "" };
    format!(
        "{:>8.1} {:>10} {:>10} {:>11} {:<16} {:>5} {:<10} {:>6}{marker}",
        state.elapsed,
        state.bid,
        state.ask,
        state.mid.round_dp(3),
        state.regime.to_string(),
        state.sign.to_string(),
        pivot,
        state.tick_count,
    )
}

/// 알림 표 한 행.
pub fn notification_row(notification: &Notification) -> String {
    format!(
        "  >> [{}] {}",
        notification.kind(),
        LogListener::format_message(notification)
    )
}

/// 세그먼트 표 한 행.
pub fn segment_row(segment: &RegimeSegment) -> String {
    let target = segment
        .target_price
        .map(|t| t.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:>8.2} {:>8.2} {:<16} {:>5} {:>10}  {}",
        segment.start_time,
        segment.end_time,
        segment.regime.to_string(),
        segment.sign.to_string(),
        target,
        segment.description
    )
}
