//! 알림 타입 및 trait 정의.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::BreakoutType;
use std::fmt;

/// 알림 우선순위 레벨.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    /// 낮은 우선순위 (정보성)
    Low,
    /// 일반 우선순위
    #[default]
    Normal,
    /// 높은 우선순위 (중요 이벤트)
    High,
}

/// 구독 단위가 되는 이벤트 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Warning,
    Start,
    Progress,
    Completion,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 4] = [
        NotificationKind::Warning,
        NotificationKind::Start,
        NotificationKind::Progress,
        NotificationKind::Completion,
    ];
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Warning => "warning",
            Self::Start => "start",
            Self::Progress => "progress",
            Self::Completion => "completion",
        };
        f.write_str(s)
    }
}

/// 알림 이벤트 타입.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// 브레이크아웃 임박 경고
    BreakoutWarning {
        breakout_type: BreakoutType,
        time_to_breakout: f64,
        target_price: Decimal,
    },
    /// 브레이크아웃 시작
    BreakoutStarted {
        start_price: Decimal,
        target_price: Decimal,
    },
    /// 브레이크아웃 진행률 (0.0 ~ 1.0)
    BreakoutProgress {
        progress: f64,
        current_price: Decimal,
        target_price: Decimal,
    },
    /// 브레이크아웃 완료
    BreakoutCompleted {
        final_price: Decimal,
        target_price: Decimal,
    },
}

impl NotificationEvent {
    /// 이벤트 종류.
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::BreakoutWarning { .. } => NotificationKind::Warning,
            Self::BreakoutStarted { .. } => NotificationKind::Start,
            Self::BreakoutProgress { .. } => NotificationKind::Progress,
            Self::BreakoutCompleted { .. } => NotificationKind::Completion,
        }
    }

    /// 이벤트 종류별 기본 우선순위.
    pub fn default_priority(&self) -> NotificationPriority {
        match self.kind() {
            NotificationKind::Warning | NotificationKind::Start => NotificationPriority::High,
            NotificationKind::Progress => NotificationPriority::Low,
            NotificationKind::Completion => NotificationPriority::Normal,
        }
    }
}

/// 알림 메시지.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// 고유 알림 ID
    pub id: String,
    /// 알림 이벤트
    pub event: NotificationEvent,
    /// 우선순위 레벨
    pub priority: NotificationPriority,
    /// 타임스탬프
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// 새 알림을 생성합니다. 우선순위는 이벤트 종류의 기본값입니다.
    pub fn new(event: NotificationEvent, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            priority: event.default_priority(),
            event,
            timestamp,
        }
    }

    /// 우선순위 레벨을 설정합니다.
    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn kind(&self) -> NotificationKind {
        self.event.kind()
    }
}

/// 알림 작업용 Result 타입.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// 알림 에러.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("리스너 처리 실패: {0}")]
    ListenerFailed(String),

    #[error("직렬화 에러: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// 등록된 리스너 핸들.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

/// 브레이크아웃 알림 리스너 trait.
///
/// 스텝 안에서 동기 호출되므로 블로킹 작업을 하면 안 됩니다.
pub trait BreakoutListener: Send + Sync {
    /// 알림을 처리합니다.
    fn on_notification(&self, notification: &Notification) -> NotificationResult<()>;

    /// 리스너 이름 (로그용).
    fn name(&self) -> &str {
        "listener"
    }
}

impl<F> BreakoutListener for F
where
    F: Fn(&Notification) -> NotificationResult<()> + Send + Sync,
{
    fn on_notification(&self, notification: &Notification) -> NotificationResult<()> {
        self(notification)
    }

    fn name(&self) -> &str {
        "closure"
    }
}
