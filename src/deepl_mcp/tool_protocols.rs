//! `ToolProtocol` implementation that routes tool names to the DeepL handlers.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use deepl_mcp::clients::deepl::DeepLClient;
//! use deepl_mcp::config::DeepLConfig;
//! use deepl_mcp::session::TranslationSession;
//! use deepl_mcp::tool_protocol::ToolProtocol;
//! use deepl_mcp::tool_protocols::DeepLProtocol;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let client = DeepLClient::connect(DeepLConfig::from_env()?).await?;
//!     let session = Arc::new(TranslationSession::new(Arc::new(client)));
//!     let protocol = DeepLProtocol::new(session);
//!
//!     let result = protocol
//!         .execute("translate_text", json!({"text": "Hello world", "target_language": "DE"}))
//!         .await?;
//!     println!("{}", result.to_json());
//!     Ok(())
//! }
//! ```

use crate::session::TranslationSession;
use crate::tool_protocol::{
    ToolError, ToolMetadata, ToolParameter, ToolParameterType, ToolProtocol, ToolResult,
};
use crate::tools::{document, languages, translation, usage};
use async_trait::async_trait;
use log::error;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::error::Error;
use std::sync::Arc;

/// Names of every tool served by [`DeepLProtocol`], in listing order.
pub const TOOL_NAMES: [&str; 11] = [
    "translate_text",
    "get_source_languages",
    "get_target_languages",
    "get_usage",
    "rephrase_text",
    "batch_translate",
    "translate_document",
    "detect_language",
    "get_glossary_languages",
    "get_translation_history",
    "analyze_usage_patterns",
];

const FORMALITY_VALUES: &[&str] = &["default", "more", "less", "prefer_more", "prefer_less"];

/// Exposes the translation tools over the generic tool protocol.
pub struct DeepLProtocol {
    session: Arc<TranslationSession>,
}

impl DeepLProtocol {
    pub fn new(session: Arc<TranslationSession>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<TranslationSession> {
        &self.session
    }
}

/// Decode tool arguments; a decoding error becomes a failure envelope.
fn parse_params<T: DeserializeOwned>(tool_name: &str, parameters: Value) -> Result<T, ToolResult> {
    let parameters = match parameters {
        Value::Null => json!({}),
        other => other,
    };
    serde_json::from_value(parameters).map_err(|e| {
        let message = ToolError::InvalidParameters(e.to_string()).to_string();
        error!("{}: {}", tool_name, message);
        ToolResult::failure(message).with_field("tool", json!(tool_name))
    })
}

macro_rules! dispatch {
    ($session:expr, $tool:expr, $params:expr, $handler:path) => {
        match parse_params($tool, $params) {
            Ok(request) => $handler($session, request).await,
            Err(invalid) => invalid,
        }
    };
}

#[async_trait]
impl ToolProtocol for DeepLProtocol {
    async fn execute(
        &self,
        tool_name: &str,
        parameters: Value,
    ) -> Result<ToolResult, Box<dyn Error + Send + Sync>> {
        let session = self.session.as_ref();
        let result = match tool_name {
            "translate_text" => {
                dispatch!(session, tool_name, parameters, translation::translate_text)
            }
            "batch_translate" => {
                dispatch!(session, tool_name, parameters, translation::batch_translate)
            }
            "rephrase_text" => {
                dispatch!(session, tool_name, parameters, translation::rephrase_text)
            }
            "detect_language" => {
                dispatch!(session, tool_name, parameters, translation::detect_language)
            }
            "translate_document" => {
                dispatch!(session, tool_name, parameters, document::translate_document)
            }
            "get_source_languages" => languages::get_source_languages(session).await,
            "get_target_languages" => languages::get_target_languages(session).await,
            "get_glossary_languages" => languages::get_glossary_languages(session).await,
            "get_usage" => usage::get_usage(session).await,
            "get_translation_history" => usage::get_translation_history(session).await,
            "analyze_usage_patterns" => usage::analyze_usage_patterns(session).await,
            other => return Err(Box::new(ToolError::NotFound(other.to_string()))),
        };
        Ok(result)
    }

    async fn list_tools(&self) -> Result<Vec<ToolMetadata>, Box<dyn Error + Send + Sync>> {
        Ok(TOOL_NAMES.iter().filter_map(|name| tool_metadata(name)).collect())
    }

    async fn get_tool_metadata(
        &self,
        tool_name: &str,
    ) -> Result<ToolMetadata, Box<dyn Error + Send + Sync>> {
        match tool_metadata(tool_name) {
            Some(metadata) => Ok(metadata),
            None => Err(Box::new(ToolError::NotFound(tool_name.to_string()))),
        }
    }

    fn protocol_name(&self) -> &str {
        "deepl"
    }
}

fn text_param(description: &str) -> ToolParameter {
    ToolParameter::new("text", ToolParameterType::String)
        .with_description(description)
        .required()
}

fn target_param() -> ToolParameter {
    ToolParameter::new("target_language", ToolParameterType::String)
        .with_description("Target language code, e.g. DE, FR, EN-GB")
        .required()
}

fn source_param() -> ToolParameter {
    ToolParameter::new("source_language", ToolParameterType::String)
        .with_description("Source language code; detected automatically when omitted")
}

fn formality_param() -> ToolParameter {
    ToolParameter::new("formality", ToolParameterType::String)
        .with_description("Formality level for target languages that support it")
        .with_default(json!("default"))
        .with_allowed_values(FORMALITY_VALUES)
}

fn preserve_formatting_param() -> ToolParameter {
    ToolParameter::new("preserve_formatting", ToolParameterType::Boolean)
        .with_description("Keep the original formatting instead of correcting it")
        .with_default(json!(false))
}

fn tool_metadata(name: &str) -> Option<ToolMetadata> {
    let metadata = match name {
        "translate_text" => ToolMetadata::new(name, "Translate text into a target language")
            .with_parameter(text_param("Text to translate"))
            .with_parameter(target_param())
            .with_parameter(source_param())
            .with_parameter(formality_param())
            .with_parameter(preserve_formatting_param())
            .with_parameter(
                ToolParameter::new("split_sentences", ToolParameterType::String)
                    .with_description("Sentence splitting mode")
                    .with_allowed_values(&["0", "1", "nonewlines"]),
            )
            .with_parameter(
                ToolParameter::new("tag_handling", ToolParameterType::String)
                    .with_description("Markup handling mode")
                    .with_allowed_values(&["xml", "html"]),
            ),
        "batch_translate" => ToolMetadata::new(name, "Translate several texts in one request")
            .with_parameter(
                ToolParameter::new("texts", ToolParameterType::Array)
                    .with_description("Texts to translate, results keep this order")
                    .with_items(ToolParameterType::String)
                    .required(),
            )
            .with_parameter(target_param())
            .with_parameter(source_param())
            .with_parameter(formality_param())
            .with_parameter(preserve_formatting_param()),
        "rephrase_text" => ToolMetadata::new(
            name,
            "Rewrite text in the same language, adjusting formality or paraphrasing via a bridge language",
        )
        .with_parameter(text_param("Text to rephrase"))
        .with_parameter(target_param())
        .with_parameter(formality_param())
        .with_parameter(
            ToolParameter::new("context", ToolParameterType::String)
                .with_description("Extra context that influences the result but is not translated"),
        ),
        "detect_language" => ToolMetadata::new(name, "Detect the language of a text")
            .with_parameter(text_param("Text whose language should be detected")),
        "translate_document" => ToolMetadata::new(name, "Translate a document file on the local disk")
            .with_parameter(
                ToolParameter::new("file_path", ToolParameterType::String)
                    .with_description("Path of the document to translate (max 20MB)")
                    .required(),
            )
            .with_parameter(target_param())
            .with_parameter(
                ToolParameter::new("output_path", ToolParameterType::String).with_description(
                    "Where to write the result; defaults to <name>_translated_<lang>.<ext>",
                ),
            )
            .with_parameter(source_param())
            .with_parameter(formality_param()),
        "get_source_languages" => ToolMetadata::new(name, "List supported source languages"),
        "get_target_languages" => ToolMetadata::new(
            name,
            "List supported target languages and whether they support formality",
        ),
        "get_glossary_languages" => ToolMetadata::new(name, "List language pairs supported by glossaries"),
        "get_usage" => ToolMetadata::new(name, "Show character and document quota usage")
            .with_protocol_metadata("cache_ttl_secs", json!(300)),
        "get_translation_history" => ToolMetadata::new(name, "List the most recent translation operations"),
        "analyze_usage_patterns" => ToolMetadata::new(
            name,
            "Summarise the operation history by operation and language pair",
        ),
        _ => return None,
    };
    Some(metadata.with_protocol_metadata("provider", json!("deepl")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tool_has_metadata() {
        for name in TOOL_NAMES.iter() {
            let metadata = tool_metadata(name).unwrap();
            assert_eq!(metadata.name, *name);
        }
        assert!(tool_metadata("translate").is_none());
    }

    #[test]
    fn test_required_parameters() {
        let metadata = tool_metadata("batch_translate").unwrap();
        let required: Vec<&str> = metadata
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(required, vec!["texts", "target_language"]);
    }

    #[test]
    fn test_parse_params_reports_missing_field() {
        let err = parse_params::<translation::TranslateTextRequest>("translate_text", json!({"text": "Hi"}))
            .unwrap_err();
        assert!(!err.success);
        assert!(err.error.unwrap().starts_with("Invalid parameters: "));
        assert_eq!(err.fields["tool"], json!("translate_text"));
    }

    #[test]
    fn test_parse_params_treats_null_as_empty_object() {
        let err = parse_params::<translation::DetectLanguageRequest>("detect_language", Value::Null)
            .unwrap_err();
        assert!(err.error.unwrap().contains("missing field `text`"));
    }
}
