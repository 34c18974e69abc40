// src/types/refs.rs
//! Typed document references.
//!
//! A [`DocumentRef`] is the normalized output of URL resolution: which
//! provider hosts the document, the opaque document identifier, and an
//! optional sub-resource hint (a `gid` for Google, a sheet id for Feishu
//! spreadsheets). References are immutable once resolved; the provider
//! determines which client operations are legal for them.

use crate::types::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The document hosting service a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Google Sheets — exported via a public shared-link URL, no auth
    Google,
    /// Feishu docx document — exported via the drive export-task API
    FeishuDocx,
    /// Feishu spreadsheet — exported via the drive export-task API,
    /// scoped to a sheet sub-id
    FeishuSheet,
    /// DingTalk workspace node — resolvable, but no export API here
    DingTalkNode,
    /// DingTalk file preview — resolvable, but no export API here
    DingTalkPreview,
}

impl Provider {
    /// Filename prefix used by the deterministic naming convention.
    pub fn filename_prefix(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::FeishuDocx | Self::FeishuSheet => "feishu",
            Self::DingTalkNode | Self::DingTalkPreview => "dingtalk",
        }
    }

    /// Document type label, both for filenames and for the Feishu
    /// export-task `type` field.
    pub fn doc_type(&self) -> &'static str {
        match self {
            Self::Google => "sheet",
            Self::FeishuDocx => "docx",
            Self::FeishuSheet => "sheet",
            Self::DingTalkNode => "node",
            Self::DingTalkPreview => "preview",
        }
    }

    /// Whether this provider is served by the Feishu export-task workflow.
    pub fn uses_export_tasks(&self) -> bool {
        matches!(self, Self::FeishuDocx | Self::FeishuSheet)
    }

    /// Whether an export workflow exists for this provider at all.
    ///
    /// DingTalk references are recognized so callers can display them,
    /// but there is no export API behind them.
    pub fn supports_export(&self) -> bool {
        !matches!(self, Self::DingTalkNode | Self::DingTalkPreview)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
            Self::FeishuDocx => write!(f, "feishu docx"),
            Self::FeishuSheet => write!(f, "feishu sheet"),
            Self::DingTalkNode => write!(f, "dingtalk node"),
            Self::DingTalkPreview => write!(f, "dingtalk preview"),
        }
    }
}

/// Target file format for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    /// The file extension, without a leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    /// MIME type used when rendering a payload as a data URL.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            other => Err(ValidationError::InvalidFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// A resolved, immutable reference to a document on a known provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub provider: Provider,
    /// The opaque document identifier (spreadsheet id, docx token, node id).
    pub id: String,
    /// Provider-specific sub-resource hint: the `gid` fragment for Google,
    /// unset for Feishu until the sheet lookup runs.
    pub sub_id: Option<String>,
    /// The URL the reference was resolved from.
    pub source_url: String,
}

impl DocumentRef {
    /// Builds a reference, rejecting empty document ids.
    pub fn new(
        provider: Provider,
        id: impl Into<String>,
        sub_id: Option<String>,
        source_url: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::EmptyField("document id"));
        }
        Ok(Self {
            provider,
            id,
            sub_id,
            source_url: source_url.into(),
        })
    }

    /// Deterministic local filename: `{provider}_{doc_type}_{id}.{ext}`.
    pub fn filename(&self, format: ExportFormat) -> String {
        format!(
            "{}_{}_{}.{}",
            self.provider.filename_prefix(),
            self.provider.doc_type(),
            self.id,
            format.extension()
        )
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.provider, self.id)
    }
}
