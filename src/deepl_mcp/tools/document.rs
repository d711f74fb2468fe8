//! Document translation.
//!
//! A document job moves through `Uploaded → (Queued | Translating)* → Done | Failed`.
//! [`DocumentJob::advance`] performs one status poll and one transition;
//! [`DocumentJob::wait`] repeats it at a fixed interval under an overall
//! timeout. Dropping the future returned by `wait` abandons the job.

use super::{failure, formality_used, language_code, requested_formality};
use crate::history::iso_timestamp;
use crate::provider::{
    DocumentHandle, DocumentOptions, DocumentState, DocumentStatus, ProviderError,
    TranslationProvider,
};
use crate::session::TranslationSession;
use crate::tool_protocol::ToolResult;
use log::debug;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Arguments for `translate_document`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslateDocumentRequest {
    pub file_path: String,
    pub target_language: String,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub source_language: Option<String>,
    #[serde(default)]
    pub formality: Option<String>,
}

impl TranslateDocumentRequest {
    pub fn new(file_path: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            target_language: target_language.into(),
            ..Self::default()
        }
    }
}

/// Ways a document job can fail after validation.
#[derive(Debug)]
pub enum DocumentError {
    Provider(ProviderError),
    Io(io::Error),
    TimedOut(Duration),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Provider(e) => write!(f, "{}", e),
            DocumentError::Io(e) => write!(f, "{}", e),
            DocumentError::TimedOut(after) => {
                write!(f, "Document translation timed out after {:?}", after)
            }
        }
    }
}

impl std::error::Error for DocumentError {}

impl From<ProviderError> for DocumentError {
    fn from(e: ProviderError) -> Self {
        DocumentError::Provider(e)
    }
}

impl From<io::Error> for DocumentError {
    fn from(e: io::Error) -> Self {
        DocumentError::Io(e)
    }
}

/// Where a document job stands.
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    /// Uploaded, not yet polled.
    Uploaded,
    /// The provider reports queued or translating.
    InProgress(DocumentStatus),
    /// Translation finished; the result can be downloaded.
    Done(DocumentStatus),
    /// The provider reported a terminal state other than `done`.
    Failed(DocumentStatus),
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done(_) | JobState::Failed(_))
    }
}

/// One document translation tracked from upload to completion.
#[derive(Debug, Clone)]
pub struct DocumentJob {
    handle: DocumentHandle,
    state: JobState,
}

impl DocumentJob {
    pub fn new(handle: DocumentHandle) -> Self {
        Self {
            handle,
            state: JobState::Uploaded,
        }
    }

    pub fn handle(&self) -> &DocumentHandle {
        &self.handle
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    /// Poll the provider once and move to the matching state.
    pub async fn advance(&mut self, provider: &dyn TranslationProvider) -> Result<&JobState, ProviderError> {
        let status = provider.document_status(&self.handle).await?;
        let next = if status.state.is_pending() {
            JobState::InProgress(status)
        } else if status.state == DocumentState::Done {
            JobState::Done(status)
        } else {
            JobState::Failed(status)
        };
        debug!(
            "document {}: {:?} -> {:?}",
            self.handle.document_id, self.state, next
        );
        self.state = next;
        Ok(&self.state)
    }

    /// Poll every `interval` until a terminal state, giving up after `timeout`.
    pub async fn wait(
        &mut self,
        provider: &dyn TranslationProvider,
        interval: Duration,
        timeout: Duration,
    ) -> Result<DocumentStatus, DocumentError> {
        let polling = async {
            loop {
                match self.advance(provider).await? {
                    JobState::Done(status) | JobState::Failed(status) => {
                        return Ok::<_, ProviderError>(status.clone())
                    }
                    _ => tokio::time::sleep(interval).await,
                }
            }
        };

        match tokio::time::timeout(timeout, polling).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(DocumentError::TimedOut(timeout)),
        }
    }
}

/// `report.docx` + `DE` → `report_translated_de.docx`, next to the input.
pub fn default_output_path(input: &Path, target_language: &str) -> PathBuf {
    let suffix = format!("_translated_{}", target_language.to_lowercase());
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    input.with_file_name(file_name)
}

/// Translate a file on disk and write the result next to it (or to `output_path`).
pub async fn translate_document(session: &TranslationSession, request: TranslateDocumentRequest) -> ToolResult {
    let input = PathBuf::from(&request.file_path);
    let echo = |result: ToolResult| result.with_field("input_file", json!(request.file_path));

    let file_size = match tokio::fs::metadata(&input).await {
        Ok(meta) if meta.is_file() => meta.len(),
        _ => return echo(ToolResult::failure(format!("File not found: {}", request.file_path))),
    };

    let max_bytes = session.settings().max_document_bytes;
    if file_size > max_bytes {
        return echo(ToolResult::failure(format!(
            "File size exceeds {} limit",
            size_label(max_bytes)
        )));
    }

    match run_document_job(session, &request, &input).await {
        Ok(Completed::Done { output, status }) => {
            let mut result = ToolResult::success(json!({
                "input_file": request.file_path,
                "output_file": output.to_string_lossy(),
                "target_language": request.target_language.to_uppercase(),
                "formality_used": formality_used(request.formality.as_deref()),
                "file_size_bytes": file_size,
                "status": status.state.as_str(),
                "processed_at": iso_timestamp(),
            }));
            if let Some(billed) = status.billed_characters {
                result = result.with_field("billed_characters", json!(billed));
            }

            session.record(
                "translate_document",
                json!({
                    "target_lang": request.target_language.to_uppercase(),
                    "file_size": file_size,
                    "formality": request.formality,
                    "status": status.state.as_str(),
                }),
            );
            result
        }
        Ok(Completed::Failed(status)) => {
            let mut result = ToolResult::failure(format!(
                "Document translation failed with status: {}",
                status.state
            ));
            if let Some(message) = status.error_message {
                result = result.with_field("error_message", json!(message));
            }
            echo(result)
        }
        Err(e) => echo(failure("Document translation", e)),
    }
}

enum Completed {
    Done { output: PathBuf, status: DocumentStatus },
    Failed(DocumentStatus),
}

async fn run_document_job(
    session: &TranslationSession,
    request: &TranslateDocumentRequest,
    input: &Path,
) -> Result<Completed, DocumentError> {
    let provider = session.provider();
    let settings = session.settings();

    let content = tokio::fs::read(input).await?;
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| request.file_path.clone());
    let options = DocumentOptions {
        target_lang: request.target_language.to_uppercase(),
        source_lang: language_code(request.source_language.clone()),
        formality: requested_formality(request.formality.as_deref()),
    };

    let handle = provider.upload_document(&file_name, content, &options).await?;
    let mut job = DocumentJob::new(handle);
    let status = job
        .wait(
            provider,
            settings.document_poll_interval,
            settings.document_timeout,
        )
        .await?;

    if status.state != DocumentState::Done {
        return Ok(Completed::Failed(status));
    }

    let output = match request.output_path.as_deref() {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => default_output_path(input, &request.target_language),
    };
    let translated = provider.download_document(job.handle()).await?;
    tokio::fs::write(&output, translated).await?;

    Ok(Completed::Done { output, status })
}

/// `20MB` for whole mebibytes, otherwise the exact byte count.
fn size_label(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{} bytes", bytes)
    }
}
