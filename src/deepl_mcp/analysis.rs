//! Aggregate statistics over the operation history.
//!
//! Counts operations per kind and per `(source_lang, target_lang)` pair, sums
//! character counts, and reports the most frequent pair and operation. When
//! two keys share the highest count, the one seen first in the history wins.

use crate::history::HistoryEntry;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Occurrence counts, in order of first sight.
pub type Tally = IndexMap<String, u64>;

fn bump(tally: &mut Tally, key: &str) {
    *tally.entry(key.to_string()).or_insert(0) += 1;
}

/// Highest count; ties resolve to the earliest registered key.
pub fn most_common(tally: &Tally) -> Option<(&str, u64)> {
    let mut best: Option<(&str, u64)> = None;
    for (key, count) in tally {
        match best {
            Some((_, best_count)) if *count <= best_count => {}
            _ => best = Some((key.as_str(), *count)),
        }
    }
    best
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguagePairCount {
    pub pair: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationCount {
    pub operation: String,
    pub count: u64,
}

/// Result of analysing a non-empty history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageAnalysis {
    pub total_operations: usize,
    pub total_characters_processed: u64,
    pub operations_breakdown: Tally,
    pub language_pairs_breakdown: Tally,
    pub most_common_language_pair: Option<LanguagePairCount>,
    pub most_common_operation: Option<OperationCount>,
    pub average_chars_per_operation: f64,
}

/// Analyse `entries`. Returns `None` when there is nothing to analyse.
pub fn analyze<'a, I>(entries: I) -> Option<UsageAnalysis>
where
    I: IntoIterator<Item = &'a HistoryEntry>,
{
    let mut operations = Tally::new();
    let mut language_pairs = Tally::new();
    let mut total_chars: u64 = 0;
    let mut total_operations = 0usize;

    for entry in entries {
        total_operations += 1;
        bump(&mut operations, &entry.operation);

        if let (Some(source), Some(target)) = (
            entry.details.get("source_lang"),
            entry.details.get("target_lang"),
        ) {
            let pair = format!("{}->{}", scalar_text(source), scalar_text(target));
            bump(&mut language_pairs, &pair);
        }

        if let Some(chars) = entry.detail_u64("character_count") {
            total_chars += chars;
        }
    }

    if total_operations == 0 {
        return None;
    }

    let most_common_language_pair =
        most_common(&language_pairs).map(|(pair, count)| LanguagePairCount {
            pair: pair.to_string(),
            count,
        });
    let most_common_operation =
        most_common(&operations).map(|(operation, count)| OperationCount {
            operation: operation.to_string(),
            count,
        });

    Some(UsageAnalysis {
        total_operations,
        total_characters_processed: total_chars,
        operations_breakdown: operations,
        language_pairs_breakdown: language_pairs,
        most_common_language_pair,
        most_common_operation,
        average_chars_per_operation: round2(total_chars as f64 / total_operations as f64),
    })
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}
