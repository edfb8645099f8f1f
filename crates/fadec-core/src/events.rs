//! Bounded event log: human-readable annotations of state transitions and
//! periodic conditions, newest first.

use crate::constants::RING_CAPACITY;
use crate::types::{HealthStatus, HistoryPoint, LogEntry};

pub fn entry(tick: u64, message: &str, level: HealthStatus) -> LogEntry {
    LogEntry {
        tick,
        message: message.to_string(),
        level,
    }
}

/// Prepend this tick's entries (in emission order) and drop the tail past
/// the ring capacity.
pub fn merge(logs: &mut Vec<LogEntry>, fresh: Vec<LogEntry>) {
    if fresh.is_empty() {
        return;
    }
    let mut merged = fresh;
    merged.append(logs);
    merged.truncate(RING_CAPACITY);
    *logs = merged;
}

/// Prepend a single entry outside the tick path (control operations).
pub fn push(logs: &mut Vec<LogEntry>, tick: u64, message: &str, level: HealthStatus) {
    logs.insert(0, entry(tick, message, level));
    logs.truncate(RING_CAPACITY);
}

/// Append a chart sample, evicting the oldest past the ring capacity.
pub fn record_history(history: &mut Vec<HistoryPoint>, point: HistoryPoint) {
    history.push(point);
    if history.len() > RING_CAPACITY {
        let excess = history.len() - RING_CAPACITY;
        history.drain(..excess);
    }
}
