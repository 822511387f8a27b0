//! 브레이크아웃 알림 상태 머신.
//!
//! `Idle` ⇄ `InProgress` 두 상태를 오가며 경고, 시작, 진행률, 완료 이벤트를
//! 등록된 리스너에 전달합니다.
//!
//! # 규칙
//!
//! - 이미 진행 중일 때의 시작 신호와 대기 중일 때의 완료 신호는 무시됩니다.
//! - 경고는 상태와 무관하게 경고 간격(기본 1초)당 최대 한 번만 나갑니다.
//! - 진행률은 진행 중일 때만, 진행률 간격(기본 1초)당 최대 한 번 나갑니다.
//! - 리스너 하나의 실패가 나머지 리스너 호출을 막지 않습니다.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sim_core::{BreakoutEvent, NotificationConfig};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::types::{
    BreakoutListener, ListenerId, Notification, NotificationEvent, NotificationKind,
};

/// 알림기 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifierState {
    #[default]
    Idle,
    InProgress,
}

type ListenerEntry = (ListenerId, Arc<dyn BreakoutListener>);

/// 브레이크아웃 알림기.
pub struct BreakoutNotifier {
    config: NotificationConfig,
    state: NotifierState,
    last_warning: Option<DateTime<Utc>>,
    last_progress: Option<DateTime<Utc>>,
    breakout_start_price: Option<Decimal>,
    target_price: Option<Decimal>,
    listeners: HashMap<NotificationKind, Vec<ListenerEntry>>,
    next_id: u64,
}

impl BreakoutNotifier {
    /// 새 알림기를 생성합니다.
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            config,
            state: NotifierState::Idle,
            last_warning: None,
            last_progress: None,
            breakout_start_price: None,
            target_price: None,
            listeners: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn state(&self) -> NotifierState {
        self.state
    }

    pub fn is_in_progress(&self) -> bool {
        self.state == NotifierState::InProgress
    }

    /// 진행 중인 브레이크아웃의 시작가.
    pub fn breakout_start_price(&self) -> Option<Decimal> {
        self.breakout_start_price
    }

    /// 리스너를 등록합니다.
    pub fn subscribe<L>(&mut self, kind: NotificationKind, listener: L) -> ListenerId
    where
        L: BreakoutListener + 'static,
    {
        self.subscribe_arc(kind, Arc::new(listener))
    }

    /// 이미 공유 중인 리스너를 등록합니다.
    pub fn subscribe_arc(
        &mut self,
        kind: NotificationKind,
        listener: Arc<dyn BreakoutListener>,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        debug!(kind = %kind, listener = listener.name(), "Listener subscribed");
        self.listeners.entry(kind).or_default().push((id, listener));
        id
    }

    /// 한 리스너를 모든 이벤트 종류에 등록합니다.
    pub fn subscribe_all(&mut self, listener: Arc<dyn BreakoutListener>) -> Vec<ListenerId> {
        NotificationKind::ALL
            .iter()
            .map(|kind| self.subscribe_arc(*kind, Arc::clone(&listener)))
            .collect()
    }

    /// 리스너 등록을 해제합니다. 해제했으면 `true`.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let mut removed = false;
        for entries in self.listeners.values_mut() {
            let before = entries.len();
            entries.retain(|(entry_id, _)| *entry_id != id);
            removed |= entries.len() != before;
        }
        removed
    }

    pub fn listener_count(&self, kind: NotificationKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// 브레이크아웃 임박 경고를 예약합니다.
    ///
    /// `0 < time_to_breakout <= lead_time`이고 직전 경고 후 경고 간격이 지났을
    /// 때만 발송합니다. 발송했으면 `true`.
    pub fn schedule_warning(
        &mut self,
        now: DateTime<Utc>,
        event: &BreakoutEvent,
        time_to_breakout: f64,
        lead_time: f64,
    ) -> bool {
        if !(time_to_breakout > 0.0 && time_to_breakout <= lead_time) {
            return false;
        }
        if throttled(self.last_warning, now, self.config.warning_interval_secs) {
            return false;
        }

        self.last_warning = Some(now);
        info!(
            breakout = %event.breakout_type,
            time_to_breakout,
            "Breakout warning"
        );
        self.dispatch(Notification::new(
            NotificationEvent::BreakoutWarning {
                breakout_type: event.breakout_type,
                time_to_breakout,
                target_price: event.target_price,
            },
            now,
        ));
        true
    }

    /// 브레이크아웃 시작을 알립니다. 이미 진행 중이면 무시합니다.
    pub fn notify_breakout_start(
        &mut self,
        now: DateTime<Utc>,
        start_price: Decimal,
        target_price: Decimal,
    ) -> bool {
        if self.is_in_progress() {
            debug!("Duplicate breakout start suppressed");
            return false;
        }

        self.state = NotifierState::InProgress;
        self.breakout_start_price = Some(start_price);
        self.target_price = Some(target_price);
        self.last_progress = None;

        info!(%start_price, %target_price, "Breakout started");
        self.dispatch(Notification::new(
            NotificationEvent::BreakoutStarted {
                start_price,
                target_price,
            },
            now,
        ));
        true
    }

    /// 진행률을 알립니다. 진행 중이 아니거나 간격 안이면 무시합니다.
    pub fn notify_progress(&mut self, now: DateTime<Utc>, current_price: Decimal) -> bool {
        let (Some(start_price), Some(target_price)) = (self.breakout_start_price, self.target_price)
        else {
            return false;
        };
        if !self.is_in_progress()
            || throttled(self.last_progress, now, self.config.progress_interval_secs)
        {
            return false;
        }

        self.last_progress = Some(now);
        let progress = breakout_progress(start_price, target_price, current_price);
        debug!(progress, %current_price, "Breakout progress");
        self.dispatch(Notification::new(
            NotificationEvent::BreakoutProgress {
                progress,
                current_price,
                target_price,
            },
            now,
        ));
        true
    }

    /// 브레이크아웃 완료를 알립니다. 대기 상태면 무시합니다.
    pub fn notify_breakout_completion(&mut self, now: DateTime<Utc>, final_price: Decimal) -> bool {
        if !self.is_in_progress() {
            return false;
        }

        let target_price = self.target_price.unwrap_or(final_price);
        self.state = NotifierState::Idle;
        self.breakout_start_price = None;
        self.target_price = None;

        info!(%final_price, %target_price, "Breakout completed");
        self.dispatch(Notification::new(
            NotificationEvent::BreakoutCompleted {
                final_price,
                target_price,
            },
            now,
        ));
        true
    }

    /// 스로틀 시각을 지우고 대기 상태로 되돌립니다. 리스너는 유지됩니다.
    pub fn reset(&mut self) {
        self.state = NotifierState::Idle;
        self.last_warning = None;
        self.last_progress = None;
        self.breakout_start_price = None;
        self.target_price = None;
    }

    /// 등록 순서대로 리스너를 호출합니다.
    ///
    /// 목록 스냅샷을 순회하므로 호출 중 등록 변경이 현재 발송에 영향을 주지 않습니다.
    fn dispatch(&self, notification: Notification) {
        let kind = notification.kind();
        let snapshot: Vec<Arc<dyn BreakoutListener>> = self
            .listeners
            .get(&kind)
            .map(|entries| entries.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();

        for listener in snapshot {
            if let Err(e) = listener.on_notification(&notification) {
                warn!(
                    kind = %kind,
                    listener = listener.name(),
                    error = %e,
                    "Listener failed"
                );
            }
        }
    }
}

impl std::fmt::Debug for BreakoutNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreakoutNotifier")
            .field("state", &self.state)
            .field("last_warning", &self.last_warning)
            .field("last_progress", &self.last_progress)
            .field("breakout_start_price", &self.breakout_start_price)
            .field("target_price", &self.target_price)
            .finish_non_exhaustive()
    }
}

/// clamp((현재가 - 시작가) / (목표가 - 시작가), 0, 1). 목표가와 시작가가 같으면 0.
pub fn breakout_progress(start_price: Decimal, target_price: Decimal, current_price: Decimal) -> f64 {
    let distance = target_price - start_price;
    if distance.is_zero() {
        return 0.0;
    }
    ((current_price - start_price) / distance)
        .to_f64()
        .unwrap_or(0.0)
        .clamp(0.0, 1.0)
}

fn throttled(last: Option<DateTime<Utc>>, now: DateTime<Utc>, interval_secs: f64) -> bool {
    last.is_some_and(|last| {
        let elapsed = (now - last).num_milliseconds() as f64 / 1000.0;
        elapsed < interval_secs
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NotificationError, NotificationResult};
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use sim_core::{BreakoutSpeed, BreakoutType};
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<NotificationEvent>>>, Arc<dyn BreakoutListener>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let listener: Arc<dyn BreakoutListener> = Arc::new(move |n: &Notification| -> NotificationResult<()> {
            sink.lock().unwrap().push(n.event.clone());
            Ok(())
        });
        (events, listener)
    }

    fn event() -> BreakoutEvent {
        BreakoutEvent {
            start_time: 30.0,
            end_time: 45.0,
            breakout_type: BreakoutType::Bullish,
            target_price: dec!(101),
            speed: BreakoutSpeed::Gradual,
        }
    }

    fn notifier() -> BreakoutNotifier {
        BreakoutNotifier::new(NotificationConfig::default())
    }

    #[test]
    fn test_duplicate_start_emits_once() {
        let mut notifier = notifier();
        let (events, listener) = recorder();
        notifier.subscribe_arc(NotificationKind::Start, listener);
        let now = Utc::now();

        assert!(notifier.notify_breakout_start(now, dec!(100), dec!(101)));
        assert!(!notifier.notify_breakout_start(now, dec!(100), dec!(101)));
        assert_eq!(events.lock().unwrap().len(), 1);
        assert_eq!(notifier.state(), NotifierState::InProgress);
    }

    #[test]
    fn test_completion_when_idle_is_noop() {
        let mut notifier = notifier();
        let (events, listener) = recorder();
        notifier.subscribe_arc(NotificationKind::Completion, listener);

        assert!(!notifier.notify_breakout_completion(Utc::now(), dec!(100)));
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_start_complete_cycle() {
        let mut notifier = notifier();
        let (events, listener) = recorder();
        notifier.subscribe_all(listener);
        let now = Utc::now();

        notifier.notify_breakout_start(now, dec!(100), dec!(101));
        notifier.notify_breakout_completion(now, dec!(100.99));
        assert!(!notifier.is_in_progress());
        // 완료 후 다음 에피소드 시작 가능
        assert!(notifier.notify_breakout_start(now, dec!(100.99), dec!(100)));

        let kinds: Vec<NotificationKind> = events.lock().unwrap().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NotificationKind::Start,
                NotificationKind::Completion,
                NotificationKind::Start
            ]
        );
    }

    #[test]
    fn test_warning_throttled_within_one_second() {
        let mut notifier = notifier();
        let (events, listener) = recorder();
        notifier.subscribe_arc(NotificationKind::Warning, listener);
        let now = Utc::now();

        assert!(notifier.schedule_warning(now, &event(), 4.0, 5.0));
        assert!(!notifier.schedule_warning(now + Duration::milliseconds(500), &event(), 3.5, 5.0));
        assert!(notifier.schedule_warning(now + Duration::milliseconds(1000), &event(), 3.0, 5.0));
        assert_eq!(events.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_warning_requires_lead_window() {
        let mut notifier = notifier();
        let now = Utc::now();

        assert!(!notifier.schedule_warning(now, &event(), 6.0, 5.0));
        assert!(!notifier.schedule_warning(now, &event(), 0.0, 5.0));
        assert!(!notifier.schedule_warning(now, &event(), -1.0, 5.0));
        assert!(notifier.schedule_warning(now, &event(), 5.0, 5.0));
    }

    #[test]
    fn test_progress_only_while_in_progress() {
        let mut notifier = notifier();
        let (events, listener) = recorder();
        notifier.subscribe_arc(NotificationKind::Progress, listener);
        let now = Utc::now();

        assert!(!notifier.notify_progress(now, dec!(100.5)));
        notifier.notify_breakout_start(now, dec!(100), dec!(101));
        assert!(notifier.notify_progress(now, dec!(100.5)));
        assert!(!notifier.notify_progress(now + Duration::milliseconds(200), dec!(100.6)));
        assert!(notifier.notify_progress(now + Duration::seconds(1), dec!(100.7)));

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        match &events[0] {
            NotificationEvent::BreakoutProgress { progress, .. } => {
                assert!((progress - 0.5).abs() < 1e-9)
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_progress_value() {
        assert_eq!(breakout_progress(dec!(100), dec!(101), dec!(99)), 0.0);
        assert_eq!(breakout_progress(dec!(100), dec!(101), dec!(102)), 1.0);
        assert!((breakout_progress(dec!(100), dec!(98), dec!(99)) - 0.5).abs() < 1e-9);
        assert_eq!(breakout_progress(dec!(100), dec!(100), dec!(105)), 0.0);
    }

    #[test]
    fn test_failing_listener_does_not_block_others() {
        let mut notifier = notifier();
        notifier.subscribe(NotificationKind::Start, |_: &Notification| -> NotificationResult<()> {
            Err(NotificationError::ListenerFailed("boom".to_string()))
        });
        let (events, listener) = recorder();
        notifier.subscribe_arc(NotificationKind::Start, listener);

        assert!(notifier.notify_breakout_start(Utc::now(), dec!(100), dec!(101)));
        assert_eq!(events.lock().unwrap().len(), 1);
        assert!(notifier.is_in_progress());
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let mut notifier = notifier();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let order = Arc::clone(&order);
            notifier.subscribe(NotificationKind::Start, move |_: &Notification| -> NotificationResult<()> {
                order.lock().unwrap().push(i);
                Ok(())
            });
        }

        notifier.notify_breakout_start(Utc::now(), dec!(100), dec!(101));
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut notifier = notifier();
        let (events, listener) = recorder();
        let id = notifier.subscribe_arc(NotificationKind::Start, listener);

        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        assert_eq!(notifier.listener_count(NotificationKind::Start), 0);

        notifier.notify_breakout_start(Utc::now(), dec!(100), dec!(101));
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_reset_clears_throttles_and_state() {
        let mut notifier = notifier();
        let now = Utc::now();
        notifier.schedule_warning(now, &event(), 2.0, 5.0);
        notifier.notify_breakout_start(now, dec!(100), dec!(101));

        notifier.reset();
        assert_eq!(notifier.state(), NotifierState::Idle);
        assert!(notifier.breakout_start_price().is_none());
        assert!(notifier.schedule_warning(now, &event(), 2.0, 5.0));
    }
}
