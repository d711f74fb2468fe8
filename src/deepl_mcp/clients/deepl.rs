//! DeepL API v2 client.
//!
//! [`DeepLClient`] implements [`TranslationProvider`] over HTTPS with
//! `reqwest`. Every request carries `Authorization: DeepL-Auth-Key <key>`.
//! HTTP failures are mapped onto [`ProviderError`] variants so callers can
//! tell a bad credential (403) from an exhausted quota (456) or throttling (429).
//!
//! # Example
//!
//! ```rust,no_run
//! use deepl_mcp::clients::deepl::DeepLClient;
//! use deepl_mcp::config::DeepLConfig;
//! use deepl_mcp::provider::{TranslateOptions, TranslationProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Fails fast if the key is rejected.
//!     let client = DeepLClient::connect(DeepLConfig::from_env()?).await?;
//!     let result = client
//!         .translate_text("Hello world", &TranslateOptions::new("DE"))
//!         .await?;
//!     println!("{} ({})", result.text, result.detected_source_lang);
//!     Ok(())
//! }
//! ```

use crate::config::DeepLConfig;
use crate::provider::{
    DocumentHandle, DocumentOptions, DocumentState, DocumentStatus, GlossaryLanguagePair,
    Language, ProviderError, ProviderResult, TextResult, TranslateOptions, TranslationProvider,
    Usage, UsageDetail,
};
use async_trait::async_trait;
use log::{error, info};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP status DeepL uses for an exhausted quota.
const STATUS_QUOTA_EXCEEDED: u16 = 456;

/// Client for the DeepL REST API.
#[derive(Clone)]
pub struct DeepLClient {
    client: Client,
    auth_key: String,
    base_url: String,
}

impl DeepLClient {
    /// Build a client without contacting the API.
    pub fn new(config: DeepLConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            auth_key: config.auth_key,
            base_url: config.server_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a client and query the usage endpoint to confirm the credential.
    ///
    /// Any error here is meant to abort startup.
    pub async fn connect(config: DeepLConfig) -> ProviderResult<Self> {
        let client = Self::new(config)?;
        match client.usage().await {
            Ok(usage) => {
                let limit = usage
                    .character
                    .finite_limit()
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "unlimited".to_string());
                info!(
                    "DeepL initialized at {}. Usage: {}/{}",
                    client.base_url, usage.character.count, limit
                );
                Ok(client)
            }
            Err(e) => {
                error!("Failed to initialize DeepL: {}", e);
                Err(e)
            }
        }
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v2/{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(
            reqwest::header::AUTHORIZATION,
            format!("DeepL-Auth-Key {}", self.auth_key),
        )
    }

    fn document_url(&self, handle: &DocumentHandle, suffix: &str) -> String {
        let id = urlencoding::encode(&handle.document_id);
        self.url(&format!("document/{}{}", id, suffix))
    }

    async fn send(&self, request: RequestBuilder) -> ProviderResult<Response> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        check_status(response).await
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ProviderResult<T> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }

    async fn translate_many(
        &self,
        texts: Vec<String>,
        options: &TranslateOptions,
    ) -> ProviderResult<Vec<TextResult>> {
        let expected = texts.len();
        let body = TranslateRequest::new(texts, options);
        let response: TranslateResponse = self
            .send_json(self.client.post(self.url("translate")).json(&body))
            .await?;

        if response.translations.len() != expected {
            return Err(ProviderError::Decode(format!(
                "expected {} translations, received {}",
                expected,
                response.translations.len()
            )));
        }

        Ok(response
            .translations
            .into_iter()
            .map(|t| TextResult {
                text: t.text,
                detected_source_lang: t.detected_source_language,
                billed_characters: t.billed_characters,
            })
            .collect())
    }

    async fn languages(&self, kind: &str) -> ProviderResult<Vec<Language>> {
        let languages: Vec<LanguageWire> = self
            .send_json(
                self.client
                    .get(self.url("languages"))
                    .query(&[("type", kind)]),
            )
            .await?;

        Ok(languages
            .into_iter()
            .map(|l| Language {
                code: l.language,
                name: l.name,
                supports_formality: l.supports_formality,
            })
            .collect())
    }
}

/// Turn a non-success response into the matching [`ProviderError`].
async fn check_status(response: Response) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body, status);

    Err(match status.as_u16() {
        403 => ProviderError::Authorization(message),
        STATUS_QUOTA_EXCEEDED => ProviderError::QuotaExceeded(message),
        429 => ProviderError::TooManyRequests(message),
        code => ProviderError::Api {
            status: code,
            message,
        },
    })
}

/// Prefer the `message` (and `detail`) from a DeepL error body, fall back to the raw text.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorWire>(body) {
        if let Some(message) = parsed.message {
            return match parsed.detail {
                Some(detail) if !detail.is_empty() => format!("{}, {}", message, detail),
                _ => message,
            };
        }
    }
    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string()
    } else {
        body.trim().to_string()
    }
}

#[async_trait]
impl TranslationProvider for DeepLClient {
    async fn translate_text(
        &self,
        text: &str,
        options: &TranslateOptions,
    ) -> ProviderResult<TextResult> {
        let mut results = self.translate_many(vec![text.to_string()], options).await?;
        results
            .pop()
            .ok_or_else(|| ProviderError::Decode("empty translation list".to_string()))
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        options: &TranslateOptions,
    ) -> ProviderResult<Vec<TextResult>> {
        self.translate_many(texts.to_vec(), options).await
    }

    async fn source_languages(&self) -> ProviderResult<Vec<Language>> {
        self.languages("source").await
    }

    async fn target_languages(&self) -> ProviderResult<Vec<Language>> {
        self.languages("target").await
    }

    async fn glossary_languages(&self) -> ProviderResult<Vec<GlossaryLanguagePair>> {
        let response: GlossaryPairsWire = self
            .send_json(self.client.get(self.url("glossary-language-pairs")))
            .await?;
        Ok(response
            .supported_languages
            .into_iter()
            .map(|p| GlossaryLanguagePair {
                source_lang: p.source_lang,
                target_lang: p.target_lang,
            })
            .collect())
    }

    async fn usage(&self) -> ProviderResult<Usage> {
        let wire: UsageWire = self.send_json(self.client.get(self.url("usage"))).await?;
        Ok(wire.into())
    }

    async fn upload_document(
        &self,
        file_name: &str,
        content: Vec<u8>,
        options: &DocumentOptions,
    ) -> ProviderResult<DocumentHandle> {
        let mut form = Form::new().text("target_lang", options.target_lang.clone());
        if let Some(source_lang) = &options.source_lang {
            form = form.text("source_lang", source_lang.clone());
        }
        if let Some(formality) = &options.formality {
            form = form.text("formality", formality.clone());
        }
        form = form.part("file", Part::bytes(content).file_name(file_name.to_string()));

        let wire: DocumentHandleWire = self
            .send_json(self.client.post(self.url("document")).multipart(form))
            .await?;
        Ok(DocumentHandle {
            document_id: wire.document_id,
            document_key: wire.document_key,
        })
    }

    async fn document_status(&self, handle: &DocumentHandle) -> ProviderResult<DocumentStatus> {
        let wire: DocumentStatusWire = self
            .send_json(
                self.client
                    .post(self.document_url(handle, ""))
                    .json(&DocumentKeyBody {
                        document_key: &handle.document_key,
                    }),
            )
            .await?;
        Ok(DocumentStatus {
            state: DocumentState::parse(&wire.status),
            seconds_remaining: wire.seconds_remaining,
            billed_characters: wire.billed_characters,
            error_message: wire.error_message,
        })
    }

    async fn download_document(&self, handle: &DocumentHandle) -> ProviderResult<Vec<u8>> {
        let response = self
            .send(
                self.client
                    .post(self.document_url(handle, "/result"))
                    .json(&DocumentKeyBody {
                        document_key: &handle.document_key,
                    }),
            )
            .await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn provider_name(&self) -> &str {
        "DeepL"
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest {
    text: Vec<String>,
    target_lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    formality: Option<String>,
    preserve_formatting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    split_sentences: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag_handling: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<String>,
}

impl TranslateRequest {
    fn new(text: Vec<String>, options: &TranslateOptions) -> Self {
        Self {
            text,
            target_lang: options.target_lang.clone(),
            source_lang: options.source_lang.clone(),
            formality: options.formality.clone(),
            preserve_formatting: options.preserve_formatting,
            split_sentences: options.split_sentences.clone(),
            tag_handling: options.tag_handling.clone(),
            context: options.context.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<TranslationWire>,
}

#[derive(Debug, Deserialize)]
struct TranslationWire {
    detected_source_language: String,
    text: String,
    #[serde(default)]
    billed_characters: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct LanguageWire {
    language: String,
    name: String,
    #[serde(default)]
    supports_formality: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct GlossaryPairsWire {
    supported_languages: Vec<GlossaryPairWire>,
}

#[derive(Debug, Deserialize)]
struct GlossaryPairWire {
    source_lang: String,
    target_lang: String,
}

#[derive(Debug, Deserialize)]
struct UsageWire {
    #[serde(default)]
    character_count: u64,
    #[serde(default)]
    character_limit: Option<u64>,
    #[serde(default)]
    document_count: Option<u64>,
    #[serde(default)]
    document_limit: Option<u64>,
}

impl From<UsageWire> for Usage {
    fn from(wire: UsageWire) -> Self {
        let document = match (wire.document_count, wire.document_limit) {
            (None, None) => None,
            (count, limit) => Some(UsageDetail {
                count: count.unwrap_or(0),
                limit,
            }),
        };
        Usage {
            character: UsageDetail {
                count: wire.character_count,
                limit: wire.character_limit,
            },
            document,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DocumentHandleWire {
    document_id: String,
    document_key: String,
}

#[derive(Debug, Serialize)]
struct DocumentKeyBody<'a> {
    document_key: &'a str,
}

#[derive(Debug, Deserialize)]
struct DocumentStatusWire {
    status: String,
    #[serde(default)]
    seconds_remaining: Option<u64>,
    #[serde(default)]
    billed_characters: Option<u64>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorWire {
    message: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}
