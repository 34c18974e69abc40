// src/api/client.rs
//! HTTP client for the Feishu open API.
//!
//! A thin wrapper around reqwest that carries the bearer credential,
//! unwraps the `{code, msg, data}` envelope, and maps failures into the
//! application error vocabulary. No polling or business logic lives here;
//! each method is a single request/response round trip.

use super::responses::{
    Envelope, ExportTaskChecked, ExportTaskCreated, SheetQueryData, TokenResponse,
};
use super::{CredentialIssuer, ExportApi, ExportCheck, IssuedCredential};
use crate::constants::{
    FEISHU_API_BASE_URL, FEISHU_EXPORT_TASKS_ENDPOINT, FEISHU_SPREADSHEETS_ENDPOINT,
    FEISHU_TOKEN_ENDPOINT, HTTP_REQUEST_TIMEOUT, TOKEN_LIFETIME,
};
use crate::error::AppError;
use crate::types::{DocumentRef, ExportFormat};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Request body for export task creation.
#[derive(Debug, Serialize)]
struct CreateExportTaskBody<'a> {
    file_extension: &'a str,
    /// The document id; the provider calls this field `token`.
    token: &'a str,
    #[serde(rename = "type")]
    doc_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub_id: Option<&'a str>,
}

/// Authenticated client for the Feishu drive export workflow.
#[derive(Clone)]
pub struct FeishuClient {
    client: Client,
    base_url: String,
    app_id: String,
    app_secret: String,
}

impl FeishuClient {
    /// Creates a client with the application credentials used for token
    /// issuance. Document-level calls take the access token per call.
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Result<Self, AppError> {
        Self::with_base_url(FEISHU_API_BASE_URL, app_id, app_secret)
    }

    /// Same as [`FeishuClient::new`] but against a custom API base URL.
    pub fn with_base_url(
        base_url: impl Into<String>,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Result<Self, AppError> {
        let client = Client::builder().timeout(HTTP_REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn get(&self, endpoint: &str, access_token: &str) -> Result<Response, AppError> {
        let url = self.url(endpoint);
        log::debug!("GET {}", url);
        Ok(self.client.get(url).bearer_auth(access_token).send().await?)
    }

    async fn post<T: Serialize>(
        &self,
        endpoint: &str,
        body: &T,
        access_token: Option<&str>,
    ) -> Result<Response, AppError> {
        let url = self.url(endpoint);
        log::debug!("POST {}", url);
        let mut request = self.client.post(url).json(body);
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    /// Reads an enveloped response body, preserving provider error detail.
    ///
    /// The provider sometimes returns its JSON envelope alongside a non-2xx
    /// status; in that case the envelope's `{code, msg}` is the more useful
    /// diagnosis, so the transport error is only reported when the body is
    /// not a parseable envelope.
    async fn envelope<T: DeserializeOwned>(
        response: Response,
        context: &str,
    ) -> Result<T, AppError> {
        let transport_error = response.error_for_status_ref().err();
        let body = response.text().await?;
        match serde_json::from_str::<Envelope<T>>(&body) {
            Ok(envelope) => envelope.into_data(context),
            Err(parse_error) => match transport_error {
                Some(e) => Err(AppError::Transport(e)),
                None => Err(AppError::MalformedResponse(format!(
                    "{}: {}",
                    context, parse_error
                ))),
            },
        }
    }
}

#[async_trait::async_trait]
impl CredentialIssuer for FeishuClient {
    async fn issue(&self) -> Result<IssuedCredential, AppError> {
        log::debug!("Requesting tenant access token for app {}", self.app_id);
        let body = serde_json::json!({
            "app_id": self.app_id,
            "app_secret": self.app_secret,
        });
        let response = self.post(FEISHU_TOKEN_ENDPOINT, &body, None).await?;
        let payload: TokenResponse = response.json().await?;

        if payload.code != 0 {
            return Err(AppError::Auth {
                code: payload.code,
                message: if payload.msg.is_empty() {
                    "token issuance rejected".to_string()
                } else {
                    payload.msg
                },
            });
        }

        let token = payload.tenant_access_token.ok_or_else(|| {
            AppError::MalformedResponse("token response missing tenant_access_token".to_string())
        })?;
        let lifetime = payload
            .expire
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(TOKEN_LIFETIME);

        Ok(IssuedCredential { token, lifetime })
    }
}

#[async_trait::async_trait]
impl ExportApi for FeishuClient {
    async fn create_export_task(
        &self,
        doc: &DocumentRef,
        format: ExportFormat,
        access_token: &str,
    ) -> Result<String, AppError> {
        if !doc.provider.uses_export_tasks() {
            return Err(AppError::UnsupportedProvider(doc.provider.to_string()));
        }

        let body = CreateExportTaskBody {
            file_extension: format.extension(),
            token: &doc.id,
            doc_type: doc.provider.doc_type(),
            sub_id: doc.sub_id.as_deref(),
        };
        log::info!(
            "Creating export task for {} (format: {})",
            doc,
            format.extension()
        );

        let response = self
            .post(FEISHU_EXPORT_TASKS_ENDPOINT, &body, Some(access_token))
            .await?;
        let created: ExportTaskCreated = Self::envelope(response, "create export task").await?;
        Ok(created.ticket)
    }

    async fn check_export_task(
        &self,
        ticket: &str,
        doc: &DocumentRef,
        access_token: &str,
    ) -> Result<ExportCheck, AppError> {
        let endpoint = format!(
            "{}/{}?token={}",
            FEISHU_EXPORT_TASKS_ENDPOINT, ticket, doc.id
        );
        let response = self.get(&endpoint, access_token).await?;
        let checked: ExportTaskChecked = Self::envelope(response, "check export task").await?;
        Ok(checked.result.into())
    }

    async fn first_sheet_id(
        &self,
        doc: &DocumentRef,
        access_token: &str,
    ) -> Result<String, AppError> {
        let endpoint = format!("{}/{}/sheets/query", FEISHU_SPREADSHEETS_ENDPOINT, doc.id);
        let response = self.get(&endpoint, access_token).await?;
        let data: SheetQueryData = Self::envelope(response, "query sheets").await?;

        data.sheets
            .into_iter()
            .next()
            .map(|sheet| sheet.sheet_id)
            .ok_or_else(|| AppError::NotFound(format!("spreadsheet {} has no sheets", doc.id)))
    }

    async fn download_export(
        &self,
        file_token: &str,
        access_token: &str,
    ) -> Result<Vec<u8>, AppError> {
        let endpoint = format!("{}/file/{}/download", FEISHU_EXPORT_TASKS_ENDPOINT, file_token);
        log::info!("Downloading export payload for file token {}", file_token);

        let response = self.get(&endpoint, access_token).await?;
        let response = response.error_for_status()?;
        let bytes = response.bytes().await?;
        log::debug!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }

    fn export_download_url(&self, file_token: &str) -> String {
        format!(
            "{}/{}/file/{}/download",
            self.base_url, FEISHU_EXPORT_TASKS_ENDPOINT, file_token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn create_body_omits_missing_sub_id() {
        let body = CreateExportTaskBody {
            file_extension: "xlsx",
            token: "ABC123",
            doc_type: "docx",
            sub_id: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "file_extension": "xlsx",
                "token": "ABC123",
                "type": "docx",
            })
        );
    }

    #[test]
    fn create_body_includes_sub_id_when_present() {
        let body = CreateExportTaskBody {
            file_extension: "xlsx",
            token: "ABC123",
            doc_type: "sheet",
            sub_id: Some("s0"),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["sub_id"], "s0");
        assert_eq!(json["type"], "sheet");
    }

    #[test]
    fn download_url_is_under_export_tasks() {
        let client = FeishuClient::new("app", "secret").unwrap();
        assert_eq!(
            client.export_download_url("F1"),
            "https://open.feishu.cn/open-apis/drive/v1/export_tasks/file/F1/download"
        );
    }
}
