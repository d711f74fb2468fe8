//! Language catalogue lookups. These are read-only and not recorded in the history.

use super::failure;
use crate::history::iso_timestamp;
use crate::provider::Language;
use crate::session::TranslationSession;
use crate::tool_protocol::ToolResult;
use serde_json::{json, Map, Value};

/// Languages accepted as translation input.
pub async fn get_source_languages(session: &TranslationSession) -> ToolResult {
    match session.provider().source_languages().await {
        Ok(languages) => language_list("source_languages", &languages),
        Err(e) => failure("Source languages", e),
    }
}

/// Languages accepted as translation output, with formality support where reported.
pub async fn get_target_languages(session: &TranslationSession) -> ToolResult {
    match session.provider().target_languages().await {
        Ok(languages) => language_list("target_languages", &languages),
        Err(e) => failure("Target languages", e),
    }
}

/// Language pairs usable with glossaries.
pub async fn get_glossary_languages(session: &TranslationSession) -> ToolResult {
    let pairs = match session.provider().glossary_languages().await {
        Ok(pairs) => pairs,
        Err(e) => return failure("Glossary languages", e),
    };

    let listed: Vec<Value> = pairs
        .iter()
        .map(|pair| {
            json!({
                "source_language": pair.source_lang,
                "target_language": pair.target_lang,
            })
        })
        .collect();

    ToolResult::success(json!({
        "glossary_language_pairs": listed,
        "total_pairs": listed.len(),
        "retrieved_at": iso_timestamp(),
    }))
}

fn language_list(key: &str, languages: &[Language]) -> ToolResult {
    let listed: Vec<Value> = languages.iter().map(language_json).collect();
    let count = listed.len();

    ToolResult::success(Value::Null)
        .with_field(key, Value::Array(listed))
        .with_field("count", json!(count))
        .with_field("retrieved_at", json!(iso_timestamp()))
}

fn language_json(language: &Language) -> Value {
    let mut obj = Map::new();
    obj.insert("code".into(), json!(language.code));
    obj.insert("name".into(), json!(language.name));
    if let Some(supports) = language.supports_formality {
        obj.insert("supports_formality".into(), json!(supports));
    }
    Value::Object(obj)
}
