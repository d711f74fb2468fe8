//! Bounded, chronological log of tool operations.
//!
//! Every handler that reaches the provider successfully appends one
//! [`HistoryEntry`]. The log keeps at most `limit` entries; appending past the
//! bound drops the oldest ones so the most recent `limit` remain, in call order.

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::VecDeque;

/// Default number of entries retained.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// One recorded operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Local time of the call, ISO-8601.
    pub timestamp: String,
    /// Tool name, e.g. `translate_text`.
    pub operation: String,
    /// Operation specific scalars (`source_lang`, `target_lang`, `character_count`...).
    pub details: Map<String, Value>,
}

impl HistoryEntry {
    /// Entry stamped with the current local time.
    pub fn new(operation: impl Into<String>, details: Map<String, Value>) -> Self {
        Self {
            timestamp: iso_timestamp(),
            operation: operation.into(),
            details,
        }
    }

    /// `details[key]` as a string, if present and a string.
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(Value::as_str)
    }

    /// `details[key]` as an unsigned count, if present and numeric.
    pub fn detail_u64(&self, key: &str) -> Option<u64> {
        self.details.get(key).and_then(Value::as_u64)
    }
}

/// The bounded log itself.
#[derive(Debug, Clone)]
pub struct OperationHistory {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl OperationHistory {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
            limit,
        }
    }

    /// Append an entry, discarding the oldest ones beyond the limit.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    /// Convenience for `push(HistoryEntry::new(..))`.
    pub fn record(&mut self, operation: &str, details: Value) {
        let details = match details {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.push(HistoryEntry::new(operation, details));
    }

    /// Entries oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Owned copy of the entries, oldest first.
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for OperationHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Current local time in ISO-8601 with microseconds, e.g. `2024-05-01T14:03:22.123456`.
pub fn iso_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
