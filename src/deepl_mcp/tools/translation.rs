//! Text translation tools: single, batch, rephrase and language detection.

use super::{
    char_count, failure, formality_used, language_code, non_empty, requested_formality,
    truncate_chars, BRIDGE_TARGET_LANGUAGE,
};
use crate::history::iso_timestamp;
use crate::provider::{ProviderResult, TranslateOptions};
use crate::session::TranslationSession;
use crate::tool_protocol::ToolResult;
use serde::Deserialize;
use serde_json::json;

/// Characters submitted to the provider for language detection.
pub const DETECTION_SAMPLE_CHARS: usize = 1000;
/// Characters echoed back as the detection sample.
pub const TEXT_SAMPLE_CHARS: usize = 100;

/// Arguments for `translate_text`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslateTextRequest {
    pub text: String,
    pub target_language: String,
    #[serde(default)]
    pub source_language: Option<String>,
    #[serde(default)]
    pub formality: Option<String>,
    #[serde(default)]
    pub preserve_formatting: bool,
    #[serde(default)]
    pub split_sentences: Option<String>,
    #[serde(default)]
    pub tag_handling: Option<String>,
}

impl TranslateTextRequest {
    pub fn new(text: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target_language: target_language.into(),
            ..Self::default()
        }
    }

    fn options(&self) -> TranslateOptions {
        TranslateOptions {
            target_lang: self.target_language.to_uppercase(),
            source_lang: language_code(self.source_language.clone()),
            formality: requested_formality(self.formality.as_deref()),
            preserve_formatting: self.preserve_formatting,
            split_sentences: non_empty(self.split_sentences.clone()),
            tag_handling: non_empty(self.tag_handling.clone()),
            context: None,
        }
    }
}

/// Translate one text.
pub async fn translate_text(session: &TranslationSession, request: TranslateTextRequest) -> ToolResult {
    let options = request.options();
    let result = match session
        .provider()
        .translate_text(&request.text, &options)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            return failure("Translation", e).with_field("original_text", json!(request.text));
        }
    };

    let characters = char_count(&request.text);
    session.record(
        "translate_text",
        json!({
            "source_lang": result.detected_source_lang,
            "target_lang": options.target_lang,
            "character_count": characters,
            "formality": request.formality,
        }),
    );

    ToolResult::success(json!({
        "original_text": request.text,
        "translated_text": result.text,
        "detected_source_language": result.detected_source_lang,
        "target_language": options.target_lang,
        "formality_used": formality_used(request.formality.as_deref()),
        "character_count": characters,
    }))
}

/// Arguments for `batch_translate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchTranslateRequest {
    pub texts: Vec<String>,
    pub target_language: String,
    #[serde(default)]
    pub source_language: Option<String>,
    #[serde(default)]
    pub formality: Option<String>,
    #[serde(default)]
    pub preserve_formatting: bool,
}

impl BatchTranslateRequest {
    pub fn new(texts: Vec<String>, target_language: impl Into<String>) -> Self {
        Self {
            texts,
            target_language: target_language.into(),
            ..Self::default()
        }
    }
}

/// Translate several texts in one provider call, preserving input order.
pub async fn batch_translate(session: &TranslationSession, request: BatchTranslateRequest) -> ToolResult {
    if request.texts.is_empty() {
        return ToolResult::failure("No texts provided for translation");
    }

    let options = TranslateOptions {
        target_lang: request.target_language.to_uppercase(),
        source_lang: language_code(request.source_language.clone()),
        formality: requested_formality(request.formality.as_deref()),
        preserve_formatting: request.preserve_formatting,
        ..TranslateOptions::default()
    };

    let results = match session
        .provider()
        .translate_batch(&request.texts, &options)
        .await
    {
        Ok(results) => results,
        Err(e) => {
            return failure("Batch translation", e)
                .with_field("attempted_texts_count", json!(request.texts.len()));
        }
    };

    if results.len() != request.texts.len() {
        let message = format!(
            "Provider returned {} translations for {} texts",
            results.len(),
            request.texts.len()
        );
        return failure("Batch translation", message)
            .with_field("attempted_texts_count", json!(request.texts.len()));
    }

    let mut total_chars = 0usize;
    let translations: Vec<_> = request
        .texts
        .iter()
        .zip(results.iter())
        .enumerate()
        .map(|(index, (original, result))| {
            let characters = char_count(original);
            total_chars += characters;
            json!({
                "index": index,
                "original_text": original,
                "translated_text": result.text,
                "detected_source_language": result.detected_source_lang,
                "character_count": characters,
            })
        })
        .collect();

    session.record(
        "batch_translate",
        json!({
            "target_lang": options.target_lang,
            "text_count": request.texts.len(),
            "total_characters": total_chars,
            "formality": request.formality,
        }),
    );

    ToolResult::success(json!({
        "translations": translations,
        "total_texts": request.texts.len(),
        "total_characters": total_chars,
        "target_language": options.target_lang,
        "formality_used": formality_used(request.formality.as_deref()),
        "processed_at": iso_timestamp(),
    }))
}

/// Arguments for `rephrase_text`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RephraseTextRequest {
    pub text: String,
    pub target_language: String,
    #[serde(default)]
    pub formality: Option<String>,
    /// Extra context forwarded to the provider; it is not itself translated.
    #[serde(default)]
    pub context: Option<String>,
}

impl RephraseTextRequest {
    pub fn new(text: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target_language: target_language.into(),
            ..Self::default()
        }
    }
}

/// Rewrite a text in its own language.
///
/// With a non-default formality the text is translated into its stated
/// language at that formality. Otherwise it takes a round trip through a
/// bridge language: `EN-GB` for non-English text, `DE` and back to `EN-GB` for
/// English. The round trip only approximates a rephrasing.
pub async fn rephrase_text(session: &TranslationSession, request: RephraseTextRequest) -> ToolResult {
    let language = request.target_language.to_uppercase();
    let context = non_empty(request.context.clone());

    let outcome = match requested_formality(request.formality.as_deref()) {
        Some(formality) => adjust_formality(session, &request.text, &language, &formality, context).await,
        None => bridge_translate(session, &request.text, &language, context).await,
    };

    let response = match outcome {
        Ok(response) => response,
        Err(e) => {
            return failure("Rephrasing", e).with_field("original_text", json!(request.text));
        }
    };

    session.record(
        "rephrase_text",
        json!({
            "language": language,
            "method": response.get("method").cloned().unwrap_or_default(),
            "character_count": char_count(&request.text),
            "formality": request.formality,
        }),
    );

    response.with_field("original_text", json!(request.text))
}

async fn adjust_formality(
    session: &TranslationSession,
    text: &str,
    language: &str,
    formality: &str,
    context: Option<String>,
) -> ProviderResult<ToolResult> {
    let options = TranslateOptions::new(language)
        .with_formality(formality)
        .with_context(context);
    let result = session.provider().translate_text(text, &options).await?;

    Ok(ToolResult::success(json!({
        "rephrased_text": result.text,
        "language": language,
        "method": "formality_adjustment",
        "formality_applied": formality,
        "detected_source_language": result.detected_source_lang,
    })))
}

async fn bridge_translate(
    session: &TranslationSession,
    text: &str,
    language: &str,
    context: Option<String>,
) -> ProviderResult<ToolResult> {
    let provider = session.provider();

    if language != "EN" {
        let outbound = TranslateOptions::new(BRIDGE_TARGET_LANGUAGE).with_context(context);
        let to_english = provider.translate_text(text, &outbound).await?;
        let back = provider
            .translate_text(&to_english.text, &TranslateOptions::new(language))
            .await?;

        Ok(ToolResult::success(json!({
            "rephrased_text": back.text,
            "language": language,
            "method": "bridge_translation",
            "bridge_language": "EN",
            "intermediate_text": to_english.text,
            "detected_source_language": to_english.detected_source_lang,
        })))
    } else {
        let bridge_language = "DE";
        let outbound = TranslateOptions::new(bridge_language).with_context(context);
        let to_bridge = provider.translate_text(text, &outbound).await?;
        let back = provider
            .translate_text(&to_bridge.text, &TranslateOptions::new(BRIDGE_TARGET_LANGUAGE))
            .await?;

        Ok(ToolResult::success(json!({
            "rephrased_text": back.text,
            "language": language,
            "method": "bridge_translation",
            "bridge_language": bridge_language,
            "intermediate_text": to_bridge.text,
            "detected_source_language": "EN",
        })))
    }
}

/// Arguments for `detect_language`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectLanguageRequest {
    pub text: String,
}

/// Detect the language of `text` by translating a sample of it.
///
/// The provider has no confidence score; `confidence` is always `"high"`.
pub async fn detect_language(session: &TranslationSession, request: DetectLanguageRequest) -> ToolResult {
    let sample = text_sample(&request.text);
    let excerpt = truncate_chars(&request.text, DETECTION_SAMPLE_CHARS);

    let result = match session
        .provider()
        .translate_text(excerpt, &TranslateOptions::new(BRIDGE_TARGET_LANGUAGE))
        .await
    {
        Ok(result) => result,
        Err(e) => return failure("Language detection", e).with_field("text_sample", json!(sample)),
    };

    let characters = char_count(&request.text);
    session.record(
        "detect_language",
        json!({
            "detected_lang": result.detected_source_lang,
            "character_count": characters,
        }),
    );

    ToolResult::success(json!({
        "text_sample": sample,
        "detected_language": result.detected_source_lang,
        "confidence": "high",
        "character_count": characters,
        "detected_at": iso_timestamp(),
    }))
}

/// First 100 characters, with an ellipsis when the text was longer.
fn text_sample(text: &str) -> String {
    if char_count(text) > TEXT_SAMPLE_CHARS {
        format!("{}...", truncate_chars(text, TEXT_SAMPLE_CHARS))
    } else {
        text.to_string()
    }
}
