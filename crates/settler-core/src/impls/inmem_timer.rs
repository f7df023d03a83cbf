//! InMemoryTimer - 開発用・テスト用の遅延実行キュー
//!
//! # 実装詳細
//! - BinaryHeap を min-heap として使い、期限の早い順に取り出す
//! - 期限は注入された Clock で計算するので、FixedClock で時間を進められる
//! - 同じ期限のタスクは登録順（seq）で取り出す

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::{SettlementTask, TimerError};
use crate::ports::{Clock, SettlementTimer};

/// Scheduled task entry for the priority queue.
#[derive(Debug)]
struct ScheduledEntry {
    due: DateTime<Utc>,
    seq: u64,
    task: SettlementTask,
}

impl PartialEq for ScheduledEntry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for ScheduledEntry {}

impl PartialOrd for ScheduledEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering: earlier times (then lower seq) have higher priority
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
struct TimerState {
    heap: BinaryHeap<ScheduledEntry>,
    next_seq: u64,
    closed: bool,
}

/// Heap-backed [`SettlementTimer`] drained by [`TimerLoop`](crate::app::TimerLoop).
pub struct InMemoryTimer {
    clock: Arc<dyn Clock>,
    state: Mutex<TimerState>,
}

impl InMemoryTimer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Mutex::new(TimerState::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remove and return every task whose due time has passed, earliest first.
    pub fn pop_due(&self) -> Vec<SettlementTask> {
        let now = self.clock.now();
        let mut state = self.lock();
        let mut due = Vec::new();
        while let Some(entry) = state.heap.peek() {
            if entry.due > now {
                break; // Heap is sorted, so we can stop
            }
            if let Some(entry) = state.heap.pop() {
                due.push(entry.task);
            }
        }
        due
    }

    /// Due time of the earliest pending task.
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.lock().heap.peek().map(|entry| entry.due)
    }

    /// Pending tasks with their due times, earliest first.
    pub fn pending(&self) -> Vec<(DateTime<Utc>, SettlementTask)> {
        let state = self.lock();
        let mut entries: Vec<&ScheduledEntry> = state.heap.iter().collect();
        entries.sort_by(|a, b| b.cmp(a));
        entries
            .into_iter()
            .map(|entry| (entry.due, entry.task.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Refuse all further scheduling (process teardown). Pending tasks stay
    /// poppable.
    pub fn close(&self) {
        self.lock().closed = true;
    }
}

impl SettlementTimer for InMemoryTimer {
    fn schedule_after(&self, delay: Duration, task: SettlementTask) -> Result<(), TimerError> {
        let delay = chrono::Duration::from_std(delay)
            .map_err(|e| TimerError::Rejected(format!("delay out of range: {e}")))?;
        let due = self
            .clock
            .now()
            .checked_add_signed(delay)
            .ok_or_else(|| TimerError::Rejected("due time overflows".to_string()))?;

        let mut state = self.lock();
        if state.closed {
            return Err(TimerError::Closed);
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.heap.push(ScheduledEntry { due, seq, task });
        Ok(())
    }
}
