// src/api/responses.rs
//! Wire-level response shapes for the Feishu open API.
//!
//! Every drive API response arrives in a `{code, msg, data}` envelope;
//! a non-zero `code` is a provider-reported failure even when the HTTP
//! status is 200. Token issuance is the one endpoint that is not
//! enveloped — its fields sit at the top level.

use crate::api::ExportCheck;
use crate::error::{AppError, JobStatus};
use serde::Deserialize;

/// The standard `{code, msg, data}` response envelope.
#[derive(Debug, Deserialize)]
pub(super) struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Unwraps the payload, turning a non-zero envelope code into a
    /// provider API error.
    pub fn into_data(self, context: &str) -> Result<T, AppError> {
        if self.code != 0 {
            return Err(AppError::ProviderApi {
                code: self.code,
                message: if self.msg.is_empty() {
                    format!("{} failed", context)
                } else {
                    self.msg
                },
            });
        }
        self.data.ok_or_else(|| {
            AppError::MalformedResponse(format!("{}: envelope has no data field", context))
        })
    }
}

/// `POST /open-apis/auth/v3/tenant_access_token/internal` response.
#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub tenant_access_token: Option<String>,
    /// Remaining validity in seconds, as reported by the provider.
    #[serde(default)]
    pub expire: Option<u64>,
}

/// `data` payload of an export task creation response.
#[derive(Debug, Deserialize)]
pub(super) struct ExportTaskCreated {
    pub ticket: String,
}

/// `data` payload of an export task status check.
#[derive(Debug, Deserialize)]
pub(super) struct ExportTaskChecked {
    pub result: ExportTaskResult,
}

/// The `result` object inside a status check payload.
#[derive(Debug, Deserialize)]
pub(super) struct ExportTaskResult {
    pub job_status: i64,
    pub file_token: Option<String>,
    pub job_error_msg: Option<String>,
}

impl From<ExportTaskResult> for ExportCheck {
    fn from(result: ExportTaskResult) -> Self {
        ExportCheck {
            status: JobStatus::from_code(result.job_status),
            file_token: result.file_token,
            error_message: result.job_error_msg,
        }
    }
}

/// `data` payload of a spreadsheet sheet-metadata query.
#[derive(Debug, Deserialize)]
pub(super) struct SheetQueryData {
    #[serde(default)]
    pub sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SheetMeta {
    pub sheet_id: String,
}
