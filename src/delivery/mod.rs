// src/delivery/mod.rs
//! Payload delivery with clear separation of planning and execution.
//!
//! A fetched export payload is turned into a write plan (pure) and then
//! persisted by the writer (the only place file I/O happens). Payloads
//! are held fully in memory — spreadsheet export limits bound their size,
//! so there is no streaming requirement.

mod types;
mod writer;

pub use types::{data_url, DeliveryTarget, DownloadResult};
pub use writer::execute;

use crate::error::AppError;
use std::path::{Path, PathBuf};

/// Persists an export payload under `dir` with the given filename.
///
/// Returns the path the payload was written to.
pub fn save_payload(payload: Vec<u8>, dir: &Path, filename: &str) -> Result<PathBuf, AppError> {
    let path = dir.join(filename);
    let target = DeliveryTarget::WriteFile {
        path: path.clone(),
        bytes: payload,
    };
    let bytes_written = execute(&target)?;
    log::info!("Saved {} bytes to {}", bytes_written, path.display());
    Ok(path)
}
