// src/lib.rs
//! doc2sheet library — exports hosted spreadsheet and document pages to
//! local XLSX/CSV files.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling** — `AppError`, `JobStatus`, `ValidationError`
//! - **Configuration** — `ExportConfig`, `RelayConfig`, `FeishuCredentials`
//! - **Domain types** — `DocumentRef`, `Provider`, `ExportFormat`
//! - **URL resolution** — `resolver::resolve`
//! - **API client** — `FeishuClient`, `GoogleClient`, `ExportApi`, `TokenCache`
//! - **Workflow** — `DocumentExporter`, `ExportPoller`, `ExportJob`
//! - **Delivery** — `DownloadResult`, `save_payload`
//! - **Relay** — the HTTP relay router and server

pub mod api;
pub mod config;
pub mod constants;
pub mod delivery;
pub mod error;
pub mod exporter;
pub mod pipeline;
pub mod poller;
pub mod relay;
pub mod resolver;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, JobStatus};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, ExportConfig, FeishuCredentials, RelayConfig};

// --- Domain Types ---
pub use crate::types::{DocumentRef, ExportFormat, Provider};

// --- API Client ---
pub use crate::api::{
    CredentialIssuer, ExportApi, ExportCheck, FeishuClient, GoogleClient, IssuedCredential,
    TokenCache,
};

// --- Workflow ---
pub use crate::exporter::DocumentExporter;
pub use crate::poller::{ExportJob, ExportPoller, JobState, PollPolicy};

// --- Delivery ---
pub use crate::delivery::{save_payload, DownloadResult};

// --- Pipeline Traits ---
pub use crate::pipeline::{ExportedPayload, PayloadSink, PayloadSource};
