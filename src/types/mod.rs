// src/types/mod.rs
//! Domain types shared across the resolver, API client, poller and delivery.

use thiserror::Error;

mod refs;

pub use refs::*;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid document reference: {0}")]
    InvalidRef(String),

    #[error("Invalid export format: {0}")]
    InvalidFormat(String),

    #[error("Empty required field: {0}")]
    EmptyField(&'static str),
}
