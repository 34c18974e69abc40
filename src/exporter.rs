// src/exporter.rs
//! The end-to-end export workflow.
//!
//! [`DocumentExporter`] wires the pieces together: resolve the sheet
//! sub-id when the reference needs one, obtain a cached access token,
//! create the export task, drive the poll loop to a terminal state,
//! download the payload and persist it under the deterministic filename.
//! A failed export leaves no residual job state — the terminal error is
//! returned and nothing is cached.

use crate::api::{CredentialIssuer, ExportApi, GoogleClient, TokenCache};
use crate::delivery::{self, DownloadResult};
use crate::error::AppError;
use crate::pipeline::{ExportedPayload, PayloadSink, PayloadSource};
use crate::poller::{ExportJob, ExportPoller, JobState, PollPolicy};
use crate::resolver;
use crate::types::{DocumentRef, ExportFormat, Provider};
use std::path::PathBuf;
use tokio::sync::watch;

/// Orchestrates the full URL-to-file export workflow.
///
/// Generic over the provider API so tests can drive the whole workflow
/// with scripted implementations; production uses
/// [`FeishuClient`](crate::api::FeishuClient), which implements both the
/// export operations and credential issuance.
pub struct DocumentExporter<A> {
    api: A,
    google: GoogleClient,
    tokens: TokenCache,
    poller: ExportPoller,
    output_dir: PathBuf,
}

impl<A> DocumentExporter<A>
where
    A: ExportApi + CredentialIssuer,
{
    pub fn new(api: A, output_dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        Ok(Self {
            api,
            google: GoogleClient::new()?,
            tokens: TokenCache::new(),
            poller: ExportPoller::default(),
            output_dir: output_dir.into(),
        })
    }

    /// Overrides the default poll policy (2 s interval, 30 attempts).
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poller = ExportPoller::new(policy);
        self
    }

    /// Read access to the underlying provider API.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Exports the document behind a raw page URL.
    ///
    /// A URL no provider recognizes is a validation failure at this level:
    /// the caller asked for an export, not a classification.
    pub async fn export_url(
        &self,
        url: &str,
        format: ExportFormat,
    ) -> Result<DownloadResult, AppError> {
        let doc = resolver::resolve(url).ok_or_else(|| {
            AppError::Validation(format!("URL matches no supported document provider: {}", url))
        })?;
        self.export_document(&doc, format).await
    }

    /// Exports an already-resolved document reference to a local file.
    pub async fn export_document(
        &self,
        doc: &DocumentRef,
        format: ExportFormat,
    ) -> Result<DownloadResult, AppError> {
        let payload = self.fetch_payload(doc, format).await?;
        self.persist(payload)
    }

    /// Runs the Feishu export-task workflow up to its terminal job,
    /// without downloading the payload.
    ///
    /// This is the relay's contract: the caller receives the file token
    /// and fetches the payload itself. `cancel` aborts the poll loop
    /// between attempts.
    pub async fn run_export_task(
        &self,
        doc: &DocumentRef,
        format: ExportFormat,
        cancel: watch::Receiver<bool>,
    ) -> Result<ExportJob, AppError> {
        if !doc.provider.uses_export_tasks() {
            return Err(AppError::UnsupportedProvider(doc.provider.to_string()));
        }

        let access_token = self.tokens.token(&self.api).await?;

        // Spreadsheet exports are scoped to a single sheet; look the
        // first one up unless the reference already carries a hint.
        let doc = if doc.provider == Provider::FeishuSheet && doc.sub_id.is_none() {
            let sub_id = self.api.first_sheet_id(doc, &access_token).await?;
            log::debug!("Resolved sheet sub-id {} for {}", sub_id, doc.id);
            let mut scoped = doc.clone();
            scoped.sub_id = Some(sub_id);
            scoped
        } else {
            doc.clone()
        };

        let ticket = self
            .api
            .create_export_task(&doc, format, &access_token)
            .await?;
        log::info!("Export task created, ticket: {}", ticket);

        self.poller
            .run_with_cancel(&self.api, &doc, &ticket, &access_token, cancel)
            .await
    }

    /// Runs the export-task workflow and returns the file token of a
    /// successful export; any other terminal state becomes the matching
    /// typed error.
    pub async fn export_file_token(
        &self,
        doc: &DocumentRef,
        format: ExportFormat,
        cancel: watch::Receiver<bool>,
    ) -> Result<String, AppError> {
        let job = self.run_export_task(doc, format, cancel).await?;
        if job.status != JobState::Succeeded {
            return Err(Self::terminal_error(&job));
        }
        job.file_token.ok_or_else(|| {
            AppError::MalformedResponse("succeeded job is missing its file token".to_string())
        })
    }

    fn terminal_error(job: &ExportJob) -> AppError {
        match job.status {
            JobState::Failed => AppError::ExportFailed {
                status: job.failure_code.unwrap_or(-1),
                message: job
                    .error_detail
                    .clone()
                    .unwrap_or_else(|| "Unknown error".to_string()),
            },
            JobState::TimedOut => AppError::ExportTimedOut {
                attempts: job.attempts,
            },
            JobState::Cancelled => AppError::Cancelled,
            JobState::Created | JobState::Polling | JobState::Succeeded => {
                AppError::MalformedResponse(format!(
                    "export task {} ended in unexpected state {:?}",
                    job.ticket, job.status
                ))
            }
        }
    }
}

#[async_trait::async_trait]
impl<A> PayloadSource for DocumentExporter<A>
where
    A: ExportApi + CredentialIssuer,
{
    async fn fetch_payload(
        &self,
        doc: &DocumentRef,
        format: ExportFormat,
    ) -> Result<ExportedPayload, AppError> {
        if !doc.provider.supports_export() {
            return Err(AppError::UnsupportedProvider(doc.provider.to_string()));
        }

        if doc.provider == Provider::Google {
            let bytes = self.google.fetch_payload(doc, format).await?;
            return Ok(ExportedPayload {
                doc: doc.clone(),
                format,
                bytes,
                source_download_url: crate::api::google::export_url(doc, format),
            });
        }

        let (_keep_alive, cancel) = watch::channel(false);
        let file_token = self.export_file_token(doc, format, cancel).await?;

        let access_token = self.tokens.token(&self.api).await?;
        let bytes = self.api.download_export(&file_token, &access_token).await?;

        Ok(ExportedPayload {
            doc: doc.clone(),
            format,
            bytes,
            source_download_url: self.api.export_download_url(&file_token),
        })
    }
}

impl<A> PayloadSink for DocumentExporter<A>
where
    A: ExportApi + CredentialIssuer,
{
    fn persist(&self, payload: ExportedPayload) -> Result<DownloadResult, AppError> {
        let filename = payload.doc.filename(payload.format);
        let saved_path = delivery::save_payload(payload.bytes, &self.output_dir, &filename)?;
        Ok(DownloadResult {
            filename,
            saved_path,
            source_download_url: payload.source_download_url,
        })
    }
}
