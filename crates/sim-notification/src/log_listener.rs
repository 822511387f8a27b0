//! tracing 로그로 알림을 남기는 리스너.

use tracing::{debug, info};

use crate::types::{
    BreakoutListener, Notification, NotificationEvent, NotificationPriority, NotificationResult,
};

/// 알림을 로그 한 줄로 기록합니다.
///
/// 낮은 우선순위 알림(진행률)은 `debug`, 나머지는 `info` 레벨입니다.
#[derive(Debug, Clone, Default)]
pub struct LogListener {
    json: bool,
}

impl LogListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// 사람이 읽는 문장 대신 JSON 페이로드로 기록합니다.
    pub fn json() -> Self {
        Self { json: true }
    }

    /// 알림을 한 줄 메시지로 포맷합니다.
    pub fn format_message(notification: &Notification) -> String {
        match &notification.event {
            NotificationEvent::BreakoutWarning {
                breakout_type,
                time_to_breakout,
                target_price,
            } => format!(
                "{breakout_type} breakout in {time_to_breakout:.1}s (target {target_price})"
            ),
            NotificationEvent::BreakoutStarted {
                start_price,
                target_price,
            } => format!("breakout started at {start_price} toward {target_price}"),
            NotificationEvent::BreakoutProgress {
                progress,
                current_price,
                target_price,
            } => format!(
                "breakout {:.0}% ({current_price} / {target_price})",
                progress * 100.0
            ),
            NotificationEvent::BreakoutCompleted {
                final_price,
                target_price,
            } => format!("breakout completed at {final_price} (target {target_price})"),
        }
    }
}

impl BreakoutListener for LogListener {
    fn on_notification(&self, notification: &Notification) -> NotificationResult<()> {
        let message = if self.json {
            serde_json::to_string(notification)?
        } else {
            Self::format_message(notification)
        };

        if notification.priority == NotificationPriority::Low {
            debug!(id = %notification.id, "{}", message);
        } else {
            info!(id = %notification.id, "{}", message);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
