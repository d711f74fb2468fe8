//! Tool handlers.
//!
//! Each handler validates and normalises its request, calls the provider
//! through the [`TranslationSession`](crate::session::TranslationSession),
//! shapes a [`ToolResult`] envelope, records the operation in the history and
//! returns. Handlers never return `Err`: validation problems and provider
//! failures both come back as `success: false` envelopes that echo enough of
//! the request for the caller to correlate them.
//!
//! - [`translation`]: `translate_text`, `batch_translate`, `rephrase_text`, `detect_language`
//! - [`document`]: `translate_document`
//! - [`languages`]: `get_source_languages`, `get_target_languages`, `get_glossary_languages`
//! - [`usage`]: `get_usage`, `get_translation_history`, `analyze_usage_patterns`

pub mod document;
pub mod languages;
pub mod translation;
pub mod usage;

use crate::tool_protocol::ToolResult;
use log::error;
use std::fmt::Display;

/// Formality value meaning "let the provider decide".
pub const DEFAULT_FORMALITY: &str = "default";

/// Target used when a handler needs a translation only for its side products.
pub const BRIDGE_TARGET_LANGUAGE: &str = "EN-GB";

/// Drop empty strings so `""` behaves like an omitted argument.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Upper-cased language code, or `None` when not supplied.
pub(crate) fn language_code(value: Option<String>) -> Option<String> {
    non_empty(value).map(|v| v.to_uppercase())
}

/// The formality to send to the provider: omitted when absent or `"default"`.
pub(crate) fn requested_formality(formality: Option<&str>) -> Option<String> {
    match formality {
        Some(f) if !f.is_empty() && f != DEFAULT_FORMALITY => Some(f.to_string()),
        _ => None,
    }
}

/// The formality reported back to the caller.
pub(crate) fn formality_used(formality: Option<&str>) -> String {
    match formality {
        Some(f) if !f.is_empty() => f.to_string(),
        _ => DEFAULT_FORMALITY.to_string(),
    }
}

/// Length in characters, not bytes.
pub(crate) fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// The first `max` characters of `text`.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Log a handler failure and wrap it in an envelope.
pub(crate) fn failure(operation: &str, err: impl Display) -> ToolResult {
    let message = err.to_string();
    error!("{} error: {}", operation, message);
    ToolResult::failure(message)
}
