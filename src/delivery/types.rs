// src/delivery/types.rs
//! Type definitions for payload delivery.

use base64::Engine;
use std::path::PathBuf;

/// A single planned delivery operation.
#[derive(Debug, Clone)]
pub enum DeliveryTarget {
    /// Write the payload bytes to a file
    WriteFile { path: PathBuf, bytes: Vec<u8> },
}

/// Outcome of a completed export workflow, returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    /// The deterministic filename (`{provider}_{doc_type}_{id}.{ext}`)
    pub filename: String,
    /// Where the payload was written locally
    pub saved_path: PathBuf,
    /// The provider URL the payload came from
    pub source_download_url: String,
}

/// Renders a payload as a base64 `data:` URL.
///
/// This is the hand-off form used when a host download facility accepts a
/// URL rather than raw bytes.
pub fn data_url(bytes: &[u8], mime_type: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime_type, encoded)
}
