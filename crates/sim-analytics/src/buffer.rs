//! 고정 용량 가격 버퍼.

use sim_core::PriceSnapshot;
use std::collections::VecDeque;

/// 최근 `{bid, ask, mid}` 스냅샷의 슬라이딩 윈도우.
///
/// 용량을 넘으면 가장 오래된 항목이 제거됩니다.
#[derive(Debug, Clone)]
pub struct PriceBuffer {
    capacity: usize,
    entries: VecDeque<PriceSnapshot>,
}

impl PriceBuffer {
    /// 주어진 용량의 버퍼를 생성합니다. 용량은 최소 1입니다.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// 피벗 윈도우에 맞는 `2 * window + 1` 용량의 버퍼를 생성합니다.
    pub fn for_window(window: usize) -> Self {
        Self::new(2 * window + 1)
    }

    /// 스냅샷을 추가하고, 넘친 가장 오래된 항목을 반환합니다.
    pub fn push(&mut self, snapshot: PriceSnapshot) -> Option<PriceSnapshot> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(snapshot);
        evicted
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }

    /// 오래된 순서 기준 인덱스의 항목.
    pub fn get(&self, index: usize) -> Option<&PriceSnapshot> {
        self.entries.get(index)
    }

    pub fn latest(&self) -> Option<&PriceSnapshot> {
        self.entries.back()
    }

    /// 오래된 순서로 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = &PriceSnapshot> + '_ {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
