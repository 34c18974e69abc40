// src/api/google.rs
//! Google Sheets shared-link exports.
//!
//! Google has no task/ticket indirection: the export payload is the
//! direct GET of a constructed URL, and no credential is attached — these
//! are public shared-link exports.

use crate::constants::{GOOGLE_SHEETS_BASE_URL, HTTP_REQUEST_TIMEOUT};
use crate::error::AppError;
use crate::types::{DocumentRef, ExportFormat};
use reqwest::Client;

/// Builds the export download URL for a Google Sheets reference.
///
/// XLSX uses the spreadsheet export endpoint; CSV uses the `gviz/tq`
/// variant. The `gid` selects the tab and defaults to `0` at resolution
/// time, so it is always present here.
pub fn export_url(doc: &DocumentRef, format: ExportFormat) -> String {
    let gid = doc.sub_id.as_deref().unwrap_or("0");
    match format {
        ExportFormat::Xlsx => format!(
            "{}/{}/export?format=xlsx&gid={}",
            GOOGLE_SHEETS_BASE_URL, doc.id, gid
        ),
        ExportFormat::Csv => format!(
            "{}/{}/gviz/tq?tqx=out:csv&gid={}",
            GOOGLE_SHEETS_BASE_URL, doc.id, gid
        ),
    }
}

/// Unauthenticated client for Google Sheets export downloads.
#[derive(Clone)]
pub struct GoogleClient {
    client: Client,
}

impl GoogleClient {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder().timeout(HTTP_REQUEST_TIMEOUT).build()?;
        Ok(Self { client })
    }

    /// Fetches the export payload for a Google Sheets reference.
    pub async fn fetch_payload(
        &self,
        doc: &DocumentRef,
        format: ExportFormat,
    ) -> Result<Vec<u8>, AppError> {
        let url = export_url(doc, format);
        log::info!("Downloading Google Sheets export: {}", url);

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        log::debug!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Provider;
    use pretty_assertions::assert_eq;

    fn google_ref(gid: Option<&str>) -> DocumentRef {
        DocumentRef::new(
            Provider::Google,
            "1AbC",
            gid.map(String::from),
            "https://docs.google.com/spreadsheets/d/1AbC/edit",
        )
        .unwrap()
    }

    #[test]
    fn xlsx_uses_export_endpoint() {
        assert_eq!(
            export_url(&google_ref(Some("7")), ExportFormat::Xlsx),
            "https://docs.google.com/spreadsheets/d/1AbC/export?format=xlsx&gid=7"
        );
    }

    #[test]
    fn csv_uses_gviz_endpoint() {
        assert_eq!(
            export_url(&google_ref(Some("0")), ExportFormat::Csv),
            "https://docs.google.com/spreadsheets/d/1AbC/gviz/tq?tqx=out:csv&gid=0"
        );
    }

    #[test]
    fn missing_gid_falls_back_to_zero() {
        assert_eq!(
            export_url(&google_ref(None), ExportFormat::Xlsx),
            "https://docs.google.com/spreadsheets/d/1AbC/export?format=xlsx&gid=0"
        );
    }
}
