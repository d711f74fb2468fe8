//! Translation provider abstraction.
//!
//! [`TranslationProvider`] is the narrow seam between the tool handlers and the
//! remote translation service. Implementations are pass-throughs: they do not
//! retry, cache or reshape results beyond decoding them into the types below.
//! Optional provider fields (document quotas, billing figures, formality
//! support) are modelled as `Option` so handlers can match on their presence.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors surfaced by a translation provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The credential was rejected.
    Authorization(String),
    /// The account's character or document quota is exhausted.
    QuotaExceeded(String),
    /// The provider is rate limiting this client.
    TooManyRequests(String),
    /// Any other non-success response.
    Api { status: u16, message: String },
    /// The request never produced a response (DNS, TLS, connection reset...).
    Transport(String),
    /// The response body did not match the expected shape.
    Decode(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Authorization(msg) => write!(f, "Authorization failure: {}", msg),
            ProviderError::QuotaExceeded(msg) => write!(f, "Quota exceeded: {}", msg),
            ProviderError::TooManyRequests(msg) => write!(f, "Too many requests: {}", msg),
            ProviderError::Api { status, message } => {
                write!(f, "Provider error (HTTP {}): {}", status, message)
            }
            ProviderError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ProviderError::Decode(msg) => write!(f, "Unexpected provider response: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// One translated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextResult {
    pub text: String,
    pub detected_source_lang: String,
    pub billed_characters: Option<u64>,
}

/// A source or target language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
    /// Only reported for target languages.
    pub supports_formality: Option<bool>,
}

/// A language pair supported by glossaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryLanguagePair {
    pub source_lang: String,
    pub target_lang: String,
}

/// Count and limit for one quota.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageDetail {
    pub count: u64,
    pub limit: Option<u64>,
}

impl UsageDetail {
    /// The limit, if it is finite. A missing or zero limit means unlimited.
    pub fn finite_limit(&self) -> Option<u64> {
        self.limit.filter(|limit| *limit > 0)
    }
}

/// Account usage report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub character: UsageDetail,
    /// Present only for plans with a document quota.
    pub document: Option<UsageDetail>,
}

/// Request options shared by single and batch text translation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslateOptions {
    pub target_lang: String,
    pub source_lang: Option<String>,
    pub formality: Option<String>,
    pub preserve_formatting: bool,
    pub split_sentences: Option<String>,
    pub tag_handling: Option<String>,
    /// Extra context that influences the translation but is not translated.
    pub context: Option<String>,
}

impl TranslateOptions {
    /// Options translating into `target_lang` with everything else unset.
    pub fn new(target_lang: impl Into<String>) -> Self {
        Self {
            target_lang: target_lang.into(),
            ..Self::default()
        }
    }

    pub fn with_formality(mut self, formality: impl Into<String>) -> Self {
        self.formality = Some(formality.into());
        self
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }
}

/// Options for a document upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentOptions {
    pub target_lang: String,
    pub source_lang: Option<String>,
    pub formality: Option<String>,
}

/// Opaque handle for an in-progress document translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHandle {
    pub document_id: String,
    pub document_key: String,
}

/// Lifecycle state reported by the provider for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentState {
    Queued,
    Translating,
    Done,
    Error,
    /// A state this client does not know about.
    Other(String),
}

impl DocumentState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "queued" => DocumentState::Queued,
            "translating" => DocumentState::Translating,
            "done" => DocumentState::Done,
            "error" => DocumentState::Error,
            other => DocumentState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DocumentState::Queued => "queued",
            DocumentState::Translating => "translating",
            DocumentState::Done => "done",
            DocumentState::Error => "error",
            DocumentState::Other(raw) => raw,
        }
    }

    /// Whether the provider is still working on the document.
    pub fn is_pending(&self) -> bool {
        matches!(self, DocumentState::Queued | DocumentState::Translating)
    }
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a document translation.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStatus {
    pub state: DocumentState,
    pub seconds_remaining: Option<u64>,
    pub billed_characters: Option<u64>,
    pub error_message: Option<String>,
}

impl DocumentStatus {
    pub fn new(state: DocumentState) -> Self {
        Self {
            state,
            seconds_remaining: None,
            billed_characters: None,
            error_message: None,
        }
    }
}

/// Operations offered by a translation provider.
///
/// All methods are async to support network-bound implementations.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate a single text.
    async fn translate_text(
        &self,
        text: &str,
        options: &TranslateOptions,
    ) -> ProviderResult<TextResult>;

    /// Translate several texts in one request.
    ///
    /// Output order matches input order and output length equals input length.
    async fn translate_batch(
        &self,
        texts: &[String],
        options: &TranslateOptions,
    ) -> ProviderResult<Vec<TextResult>>;

    async fn source_languages(&self) -> ProviderResult<Vec<Language>>;

    async fn target_languages(&self) -> ProviderResult<Vec<Language>>;

    async fn glossary_languages(&self) -> ProviderResult<Vec<GlossaryLanguagePair>>;

    async fn usage(&self) -> ProviderResult<Usage>;

    /// Upload document bytes for translation and return the job handle.
    async fn upload_document(
        &self,
        file_name: &str,
        content: Vec<u8>,
        options: &DocumentOptions,
    ) -> ProviderResult<DocumentHandle>;

    async fn document_status(&self, handle: &DocumentHandle) -> ProviderResult<DocumentStatus>;

    /// Fetch the translated document. Only valid once the status is `done`.
    async fn download_document(&self, handle: &DocumentHandle) -> ProviderResult<Vec<u8>>;

    /// Name used in logs.
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_limit_is_unlimited() {
        let detail = UsageDetail {
            count: 10,
            limit: Some(0),
        };
        assert_eq!(detail.finite_limit(), None);

        let detail = UsageDetail {
            count: 10,
            limit: Some(500_000),
        };
        assert_eq!(detail.finite_limit(), Some(500_000));
    }

    #[test]
    fn test_document_state_parse() {
        assert_eq!(DocumentState::parse("done"), DocumentState::Done);
        assert_eq!(DocumentState::parse("queued"), DocumentState::Queued);
        assert_eq!(
            DocumentState::parse("paused"),
            DocumentState::Other("paused".to_string())
        );
        assert_eq!(DocumentState::parse("paused").as_str(), "paused");
    }

    #[test]
    fn test_pending_states() {
        assert!(DocumentState::Queued.is_pending());
        assert!(DocumentState::Translating.is_pending());
        assert!(!DocumentState::Done.is_pending());
        assert!(!DocumentState::Error.is_pending());
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::Api {
            status: 400,
            message: "Value for 'target_lang' not supported.".into(),
        };
        assert_eq!(
            err.to_string(),
            "Provider error (HTTP 400): Value for 'target_lang' not supported."
        );
    }
}
