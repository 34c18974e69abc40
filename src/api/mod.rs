// src/api/mod.rs
//! Provider API interaction — the ability to export documents through the
//! Feishu drive export-task workflow and Google's shared-link exports.
//!
//! Business logic (the poller, the exporter) depends on the [`ExportApi`]
//! trait, never on HTTP details, so the whole workflow can be driven by
//! scripted implementations in tests.

pub mod client;
pub mod google;
mod responses;
pub mod token;

use crate::error::{AppError, JobStatus};
use crate::types::{DocumentRef, ExportFormat};

/// The ability to drive a provider-side export task.
///
/// This is the fundamental algebra for the export workflow. One method per
/// provider capability; each is a single HTTP round trip.
#[async_trait::async_trait]
pub trait ExportApi: Send + Sync {
    /// Creates an asynchronous export job and returns its opaque ticket.
    async fn create_export_task(
        &self,
        doc: &DocumentRef,
        format: ExportFormat,
        access_token: &str,
    ) -> Result<String, AppError>;

    /// Checks an export job once. Never loops — that is the poller's job.
    async fn check_export_task(
        &self,
        ticket: &str,
        doc: &DocumentRef,
        access_token: &str,
    ) -> Result<ExportCheck, AppError>;

    /// Looks up the first sheet id of a spreadsheet document. Required
    /// before `create_export_task` for spreadsheet-type references.
    async fn first_sheet_id(
        &self,
        doc: &DocumentRef,
        access_token: &str,
    ) -> Result<String, AppError>;

    /// Downloads the finished export payload for a file token.
    async fn download_export(
        &self,
        file_token: &str,
        access_token: &str,
    ) -> Result<Vec<u8>, AppError>;

    /// The authenticated download endpoint for a finished export.
    ///
    /// Reported to callers as the source of a saved file; the bearer
    /// header still has to be attached when fetching it.
    fn export_download_url(&self, file_token: &str) -> String {
        format!(
            "{}/{}/file/{}/download",
            crate::constants::FEISHU_API_BASE_URL,
            crate::constants::FEISHU_EXPORT_TASKS_ENDPOINT,
            file_token
        )
    }
}

/// Outcome of a single export status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportCheck {
    pub status: JobStatus,
    /// Set only once the provider reports success.
    pub file_token: Option<String>,
    /// Provider-side failure detail, when present.
    pub error_message: Option<String>,
}

pub use client::FeishuClient;
pub use google::GoogleClient;
pub use token::{CredentialIssuer, IssuedCredential, TokenCache};
