//! Scriptable in-memory provider shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use deepl_mcp::config::SessionSettings;
use deepl_mcp::provider::{
    DocumentHandle, DocumentOptions, DocumentState, DocumentStatus, GlossaryLanguagePair,
    Language, ProviderError, ProviderResult, TextResult, TranslateOptions, TranslationProvider,
    Usage, UsageDetail,
};
use deepl_mcp::TranslationSession;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Translator = dyn Fn(&str, &TranslateOptions) -> ProviderResult<TextResult> + Send + Sync;

/// One recorded `translate_text` call.
#[derive(Debug, Clone)]
pub struct TranslateCall {
    pub text: String,
    pub options: TranslateOptions,
}

pub struct StubProvider {
    translator: Box<Translator>,
    usage: Mutex<ProviderResult<Usage>>,
    source_languages: Vec<Language>,
    target_languages: Vec<Language>,
    glossary_pairs: Vec<GlossaryLanguagePair>,
    document_statuses: Mutex<VecDeque<DocumentStatus>>,
    document_content: Vec<u8>,
    upload_error: Option<ProviderError>,
    usage_delay: Option<Duration>,
    batch_limit: Option<usize>,
    pub translate_calls: Mutex<Vec<TranslateCall>>,
    pub batch_calls: Mutex<Vec<Vec<String>>>,
    pub usage_calls: Mutex<usize>,
    pub uploads: Mutex<Vec<(String, usize, DocumentOptions)>>,
    pub status_polls: Mutex<usize>,
}

/// Default translation: `"[DE] text"`, source reported as `EN`.
fn tagging_translator(text: &str, options: &TranslateOptions) -> ProviderResult<TextResult> {
    Ok(TextResult {
        text: format!("[{}] {}", options.target_lang, text),
        detected_source_lang: "EN".to_string(),
        billed_characters: None,
    })
}

impl StubProvider {
    pub fn new() -> Self {
        Self {
            translator: Box::new(tagging_translator),
            usage: Mutex::new(Ok(Usage {
                character: UsageDetail {
                    count: 1_000,
                    limit: Some(500_000),
                },
                document: None,
            })),
            source_languages: vec![
                language("EN", "English", None),
                language("DE", "German", None),
            ],
            target_languages: vec![
                language("DE", "German", Some(true)),
                language("EN-GB", "English (British)", Some(false)),
                language("JA", "Japanese", None),
            ],
            glossary_pairs: vec![GlossaryLanguagePair {
                source_lang: "en".into(),
                target_lang: "de".into(),
            }],
            document_statuses: Mutex::new(VecDeque::from(vec![DocumentStatus::new(
                DocumentState::Done,
            )])),
            document_content: b"translated document".to_vec(),
            upload_error: None,
            usage_delay: None,
            batch_limit: None,
            translate_calls: Mutex::new(Vec::new()),
            batch_calls: Mutex::new(Vec::new()),
            usage_calls: Mutex::new(0),
            uploads: Mutex::new(Vec::new()),
            status_polls: Mutex::new(0),
        }
    }

    pub fn with_translator<F>(mut self, translator: F) -> Self
    where
        F: Fn(&str, &TranslateOptions) -> ProviderResult<TextResult> + Send + Sync + 'static,
    {
        self.translator = Box::new(translator);
        self
    }

    /// Every text operation fails with `error`.
    pub fn failing_with(self, error: ProviderError) -> Self {
        self.with_translator(move |_, _| Err(error.clone()))
    }

    pub fn with_usage(self, usage: ProviderResult<Usage>) -> Self {
        *self.usage.lock().unwrap() = usage;
        self
    }

    /// Statuses returned by successive polls; the last one repeats.
    pub fn with_document_statuses(self, statuses: Vec<DocumentStatus>) -> Self {
        *self.document_statuses.lock().unwrap() = VecDeque::from(statuses);
        self
    }

    /// Usage lookups sleep for `delay` before answering.
    pub fn with_usage_delay(mut self, delay: Duration) -> Self {
        self.usage_delay = Some(delay);
        self
    }

    /// Batch calls answer at most `limit` texts.
    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = Some(limit);
        self
    }

    pub fn with_upload_error(mut self, error: ProviderError) -> Self {
        self.upload_error = Some(error);
        self
    }

    pub fn translate_count(&self) -> usize {
        self.translate_calls.lock().unwrap().len()
    }

    pub fn batch_count(&self) -> usize {
        self.batch_calls.lock().unwrap().len()
    }

    pub fn usage_count(&self) -> usize {
        *self.usage_calls.lock().unwrap()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn poll_count(&self) -> usize {
        *self.status_polls.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<TranslateCall> {
        self.translate_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranslationProvider for StubProvider {
    async fn translate_text(&self, text: &str, options: &TranslateOptions) -> ProviderResult<TextResult> {
        self.translate_calls.lock().unwrap().push(TranslateCall {
            text: text.to_string(),
            options: options.clone(),
        });
        (self.translator)(text, options)
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        options: &TranslateOptions,
    ) -> ProviderResult<Vec<TextResult>> {
        self.batch_calls.lock().unwrap().push(texts.to_vec());
        texts
            .iter()
            .take(self.batch_limit.unwrap_or(texts.len()))
            .map(|text| (self.translator)(text, options))
            .collect()
    }

    async fn source_languages(&self) -> ProviderResult<Vec<Language>> {
        Ok(self.source_languages.clone())
    }

    async fn target_languages(&self) -> ProviderResult<Vec<Language>> {
        Ok(self.target_languages.clone())
    }

    async fn glossary_languages(&self) -> ProviderResult<Vec<GlossaryLanguagePair>> {
        Ok(self.glossary_pairs.clone())
    }

    async fn usage(&self) -> ProviderResult<Usage> {
        *self.usage_calls.lock().unwrap() += 1;
        if let Some(delay) = self.usage_delay {
            tokio::time::sleep(delay).await;
        }
        self.usage.lock().unwrap().clone()
    }

    async fn upload_document(
        &self,
        file_name: &str,
        content: Vec<u8>,
        options: &DocumentOptions,
    ) -> ProviderResult<DocumentHandle> {
        self.uploads
            .lock()
            .unwrap()
            .push((file_name.to_string(), content.len(), options.clone()));
        if let Some(error) = &self.upload_error {
            return Err(error.clone());
        }
        Ok(DocumentHandle {
            document_id: "doc-1".into(),
            document_key: "key-1".into(),
        })
    }

    async fn document_status(&self, _: &DocumentHandle) -> ProviderResult<DocumentStatus> {
        *self.status_polls.lock().unwrap() += 1;
        let mut statuses = self.document_statuses.lock().unwrap();
        let status = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().cloned()
        };
        Ok(status.unwrap_or_else(|| DocumentStatus::new(DocumentState::Done)))
    }

    async fn download_document(&self, _: &DocumentHandle) -> ProviderResult<Vec<u8>> {
        Ok(self.document_content.clone())
    }

    fn provider_name(&self) -> &str {
        "stub"
    }
}

pub fn language(code: &str, name: &str, supports_formality: Option<bool>) -> Language {
    Language {
        code: code.into(),
        name: name.into(),
        supports_formality,
    }
}

pub fn status(state: DocumentState) -> DocumentStatus {
    DocumentStatus::new(state)
}

/// Settings with millisecond polling so document tests run fast.
pub fn fast_settings() -> SessionSettings {
    SessionSettings {
        document_poll_interval: Duration::from_millis(5),
        document_timeout: Duration::from_secs(5),
        ..SessionSettings::default()
    }
}

pub fn session_with(provider: StubProvider) -> (Arc<StubProvider>, TranslationSession) {
    session_with_settings(provider, fast_settings())
}

pub fn session_with_settings(
    provider: StubProvider,
    settings: SessionSettings,
) -> (Arc<StubProvider>, TranslationSession) {
    let provider = Arc::new(provider);
    let session = TranslationSession::with_settings(provider.clone(), settings);
    (provider, session)
}
