// src/pipeline.rs
//! Pipeline capability traits — abstract the two stages of the
//! URL-to-file workflow.
//!
//! Each trait describes a single capability, enabling testing each stage
//! in isolation: producing the export payload for a resolved reference,
//! and persisting it locally.

use crate::delivery::DownloadResult;
use crate::error::AppError;
use crate::types::{DocumentRef, ExportFormat};

/// A fetched export payload, ready for delivery.
#[derive(Debug, Clone)]
pub struct ExportedPayload {
    pub doc: DocumentRef,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
    /// The provider URL the payload was downloaded from.
    pub source_download_url: String,
}

/// Produces the export payload for a resolved document reference.
#[async_trait::async_trait]
pub trait PayloadSource {
    async fn fetch_payload(
        &self,
        doc: &DocumentRef,
        format: ExportFormat,
    ) -> Result<ExportedPayload, AppError>;
}

/// Persists a fetched payload to its local destination.
pub trait PayloadSink {
    fn persist(&self, payload: ExportedPayload) -> Result<DownloadResult, AppError>;
}
