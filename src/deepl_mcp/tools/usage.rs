//! Account usage, the operation history and its analysis.

use super::failure;
use crate::analysis::round2;
use crate::history::iso_timestamp;
use crate::provider::{Usage, UsageDetail};
use crate::session::TranslationSession;
use crate::tool_protocol::ToolResult;
use log::debug;
use serde_json::{json, Value};

/// Account usage, served from the session cache while it is fresh.
pub async fn get_usage(session: &TranslationSession) -> ToolResult {
    if let Some(result) = cached_envelope(session) {
        return result;
    }

    let _refresh = session.lock_usage_refresh().await;
    if let Some(result) = cached_envelope(session) {
        return result;
    }

    let usage = match session.provider().usage().await {
        Ok(usage) => usage,
        Err(e) => return failure("Usage", e),
    };

    let result = usage_envelope(&usage);
    session.store_usage(result.to_json());
    result
}

fn cached_envelope(session: &TranslationSession) -> Option<ToolResult> {
    let cached = serde_json::from_value::<ToolResult>(session.cached_usage()?).ok()?;
    debug!("usage served from cache");
    Some(cached.with_field("from_cache", json!(true)))
}

fn usage_envelope(usage: &Usage) -> ToolResult {
    let mut result = ToolResult::success(Value::Null)
        .with_field("character_usage", quota_json(&usage.character))
        .with_field("retrieved_at", json!(iso_timestamp()))
        .with_field("from_cache", json!(false));
    if let Some(document) = &usage.document {
        result = result.with_field("document_usage", quota_json(document));
    }
    result
}

/// `{count, limit}` plus `percentage_used` and `remaining` when the limit is finite.
fn quota_json(detail: &UsageDetail) -> Value {
    match detail.finite_limit() {
        Some(limit) => json!({
            "count": detail.count,
            "limit": limit,
            "percentage_used": round2(detail.count as f64 / limit as f64 * 100.0),
            "remaining": limit as i64 - detail.count as i64,
        }),
        None => json!({
            "count": detail.count,
            "limit": "unlimited",
        }),
    }
}

/// The recorded operations, oldest first.
pub async fn get_translation_history(session: &TranslationSession) -> ToolResult {
    let history = session.history();
    let total = history.len();

    ToolResult::success(json!({
        "history": history,
        "total_operations": total,
        "retrieved_at": iso_timestamp(),
    }))
}

/// Aggregate statistics over the recorded operations.
pub async fn analyze_usage_patterns(session: &TranslationSession) -> ToolResult {
    let analysis = match session.analyze_history() {
        Some(analysis) => analysis,
        None => {
            return ToolResult::success(json!({
                "message": "No translation history available for analysis",
            }))
        }
    };

    match serde_json::to_value(&analysis) {
        Ok(analysis) => ToolResult::success(json!({
            "analysis": analysis,
            "analyzed_at": iso_timestamp(),
        })),
        Err(e) => failure("Usage analysis", e),
    }
}
