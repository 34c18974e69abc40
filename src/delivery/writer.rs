// src/delivery/writer.rs
//! Executes delivery operations by performing actual I/O.
//!
//! This module is the only place where payload file I/O occurs, keeping
//! the rest of the delivery layer pure and testable.

use super::types::DeliveryTarget;
use crate::error::AppError;
use std::fs;
use std::path::Path;

/// Executes a single delivery operation, returning the bytes written.
pub fn execute(target: &DeliveryTarget) -> Result<usize, AppError> {
    match target {
        DeliveryTarget::WriteFile { path, bytes } => write_file(path, bytes),
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<usize, AppError> {
    log::debug!("Writing {} bytes to {}", bytes.len(), path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;

    Ok(bytes.len())
}
