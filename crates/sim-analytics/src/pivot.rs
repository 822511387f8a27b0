//! 중앙 기준 피벗 검출.
//!
//! `2 * window + 1` 크기 버퍼의 중앙 항목(인덱스 `window`)이 버퍼 전체의
//! 최대 중간가면 PivotHigh, 최소 중간가면 PivotLow입니다. 양쪽 가격이 모두
//! 확보된 뒤에야 판정하므로 결과는 최신 틱보다 `window` 스텝 늦습니다.

use sim_core::{Pivot, PivotKind, PriceSnapshot};
use tracing::trace;

use crate::buffer::PriceBuffer;

/// 슬라이딩 버퍼를 소유하고 스텝마다 피벗을 판정합니다.
#[derive(Debug, Clone)]
pub struct PivotDetector {
    window: usize,
    buffer: PriceBuffer,
}

impl PivotDetector {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            buffer: PriceBuffer::for_window(window),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn buffer(&self) -> &PriceBuffer {
        &self.buffer
    }

    /// 스냅샷을 넣고 이번 스텝의 피벗을 판정합니다.
    pub fn update(&mut self, snapshot: PriceSnapshot) -> Option<Pivot> {
        self.buffer.push(snapshot);
        let pivot = detect(&self.buffer, self.window);
        if let Some(pivot) = &pivot {
            trace!(kind = %pivot.kind, mid = %pivot.mid, "Pivot detected");
        }
        pivot
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

/// 가득 찬 버퍼의 중앙 항목으로 피벗을 판정합니다.
///
/// 버퍼 전체가 같은 중간가면 극값이 없으므로 `None`입니다.
pub fn detect(buffer: &PriceBuffer, window: usize) -> Option<Pivot> {
    if !buffer.is_full() {
        return None;
    }
    let center = *buffer.get(window)?;

    let mut mids = buffer.iter().map(|s| s.mid);
    let first = mids.next()?;
    let (min, max) = mids.fold((first, first), |(lo, hi), mid| (lo.min(mid), hi.max(mid)));
    if min == max {
        return None;
    }

    let kind = if center.mid == max {
        PivotKind::PivotHigh
    } else if center.mid == min {
        PivotKind::PivotLow
    } else {
        return None;
    };

    Some(Pivot {
        kind,
        bid: center.bid,
        ask: center.ask,
        mid: center.mid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn snap(mid: Decimal) -> PriceSnapshot {
        PriceSnapshot {
            bid: mid - dec!(0.01),
            ask: mid + dec!(0.01),
            mid,
        }
    }

    fn feed(detector: &mut PivotDetector, mids: &[Decimal]) -> Vec<Option<Pivot>> {
        mids.iter().map(|m| detector.update(snap(*m))).collect()
    }

    #[test]
    fn test_no_pivot_until_full() {
        let mut detector = PivotDetector::new(2);
        let results = feed(&mut detector, &[dec!(1), dec!(2), dec!(5), dec!(2)]);
        assert!(results.iter().all(Option::is_none));
    }

    #[test]
    fn test_strict_local_maximum() {
        let mut detector = PivotDetector::new(2);
        let results = feed(
            &mut detector,
            &[dec!(100), dec!(101), dec!(103), dec!(102), dec!(100.5)],
        );
        let pivot = results[4].unwrap();
        assert_eq!(pivot.kind, PivotKind::PivotHigh);
        assert_eq!(pivot.mid, dec!(103));
        assert_eq!(pivot.bid, dec!(102.99));
        assert_eq!(pivot.ask, dec!(103.01));
    }

    #[test]
    fn test_strict_local_minimum() {
        let mut detector = PivotDetector::new(2);
        let results = feed(
            &mut detector,
            &[dec!(100), dec!(99), dec!(98), dec!(99.5), dec!(100)],
        );
        assert_eq!(results[4].unwrap().kind, PivotKind::PivotLow);
    }

    #[test]
    fn test_monotonic_has_no_pivot() {
        let mut detector = PivotDetector::new(3);
        let mids: Vec<Decimal> = (0..20).map(|i| Decimal::from(100 + i)).collect();
        assert!(feed(&mut detector, &mids).iter().all(Option::is_none));
    }

    #[test]
    fn test_flat_has_no_pivot() {
        let mut detector = PivotDetector::new(5);
        let mids = vec![dec!(100.00); 40];
        assert!(feed(&mut detector, &mids).iter().all(Option::is_none));
    }

    #[test]
    fn test_pivot_recomputed_each_step() {
        let mut detector = PivotDetector::new(1);
        let results = feed(&mut detector, &[dec!(1), dec!(3), dec!(2), dec!(4)]);
        assert_eq!(results[2].unwrap().kind, PivotKind::PivotHigh);
        // 다음 스텝에서 중앙은 2: 버퍼 [3, 2, 4]의 최소
        assert_eq!(results[3].unwrap().kind, PivotKind::PivotLow);
    }

    #[test]
    fn test_reset_empties_buffer() {
        let mut detector = PivotDetector::new(1);
        feed(&mut detector, &[dec!(1), dec!(3), dec!(2)]);
        detector.reset();
        assert!(detector.buffer().is_empty());
        assert!(detector.update(snap(dec!(5))).is_none());
    }

    proptest! {
        #[test]
        fn prop_strictly_increasing_never_pivots(
            start in 1i64..10_000,
            steps in prop::collection::vec(1i64..500, 11..60),
        ) {
            let mut detector = PivotDetector::new(5);
            let mut mid = Decimal::new(start, 2);
            for step in steps {
                mid += Decimal::new(step, 2);
                prop_assert!(detector.update(snap(mid)).is_none());
            }
        }
    }
}
