//! Append-only turn log.
//!
//! Records are retained up to a fixed capacity; once full, the oldest record
//! is dropped for each new one. [`TurnLog::total_recorded`] keeps counting
//! past the capacity so callers can tell that truncation happened.

use std::collections::VecDeque;

use wayfarer_types::TurnRecord;

/// Default number of records retained.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1024;

/// Bounded, ordered log of resolved turns.
#[derive(Debug, Clone)]
pub struct TurnLog {
    records: VecDeque<TurnRecord>,
    capacity: usize,
    total: u64,
}

impl TurnLog {
    /// Create a log retaining at most `capacity` records (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity,
            total: 0,
        }
    }

    /// Append a record, evicting the oldest if the log is full.
    pub fn push(&mut self, record: TurnRecord) {
        if self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
        self.total = self.total.saturating_add(1);
    }

    /// The last `n` records, oldest first.
    pub fn recent(&self, n: usize) -> Vec<&TurnRecord> {
        let skip = self.records.len().saturating_sub(n);
        self.records.iter().skip(skip).collect()
    }

    /// The last `n` records rendered as context blocks separated by a blank
    /// line. Empty when nothing has been recorded.
    pub fn recent_context(&self, n: usize) -> String {
        self.recent(n)
            .into_iter()
            .map(TurnRecord::context_block)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Every retained record, oldest first.
    pub fn all(&self) -> impl Iterator<Item = &TurnRecord> {
        self.records.iter()
    }

    /// The most recent record.
    pub fn last(&self) -> Option<&TurnRecord> {
        self.records.back()
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ever pushed, including evicted ones.
    pub const fn total_recorded(&self) -> u64 {
        self.total
    }

    /// Drop every record and reset the counter.
    pub fn clear(&mut self) {
        self.records.clear();
        self.total = 0;
    }
}

impl Default for TurnLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
