// src/error.rs
//! Application error types with structured error handling.
//!
//! Error types form the vocabulary for failure modes in the system.
//! Each error variant tells the story of what went wrong and where:
//! credential issuance, a provider API envelope, the transport layer,
//! the export job itself, or the local filesystem.

use std::fmt;
use thiserror::Error;

/// Provider export job status as a typed vocabulary.
///
/// Instead of matching against magic integers like `107`, the provider's
/// `job_status` codes are encoded in the type system. Each variant tells
/// you exactly what the provider reported about an export ticket and
/// enables pattern-based transitions without stringly-typed dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// The export finished and a file token is available
    Success,
    /// The export is queued and has not started yet
    Queued,
    /// The export is running
    Processing,
    /// The export failed on the provider side; the code is preserved
    Failure(i64),
    /// A status code this client doesn't recognize yet
    Unrecognized(i64),
}

impl JobStatus {
    /// Parse a provider `job_status` integer into the typed vocabulary.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::Queued,
            2 => Self::Processing,
            3 | 107 | 108 | 109 => Self::Failure(code),
            other => Self::Unrecognized(other),
        }
    }

    /// Whether this status ends the poll loop.
    ///
    /// Unrecognized codes are deliberately treated as non-terminal, the
    /// same as queued. The provider has shipped undocumented transient
    /// codes before; the attempt cap still bounds the total wait.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure(_))
    }

    /// Whether the provider reported the export as failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// The raw provider code, for diagnostics.
    pub fn code(&self) -> i64 {
        match self {
            Self::Success => 0,
            Self::Queued => 1,
            Self::Processing => 2,
            Self::Failure(code) | Self::Unrecognized(code) => *code,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Queued => write!(f, "queued"),
            Self::Processing => write!(f, "processing"),
            Self::Failure(code) => write!(f, "failed (status {})", code),
            Self::Unrecognized(code) => write!(f, "unrecognized (status {})", code),
        }
    }
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Credential issuance rejected ({code}): {message}")]
    Auth { code: i64, message: String },

    #[error("Provider API returned an error ({code}): {message}")]
    ProviderApi { code: i64, message: String },

    #[error("Network failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Export failed: {message} (status: {status})")]
    ExportFailed { status: i64, message: String },

    #[error("Export timed out after {attempts} status checks")]
    ExportTimedOut { attempts: u32 },

    #[error("Export cancelled")]
    Cancelled,

    #[error("No export API available for {0} documents")]
    UnsupportedProvider(String),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_and_failure_codes_are_terminal() {
        assert!(JobStatus::from_code(0).is_terminal());
        for code in [3, 107, 108, 109] {
            let status = JobStatus::from_code(code);
            assert!(status.is_terminal());
            assert!(status.is_failure());
        }
    }

    #[test]
    fn in_progress_codes_are_not_terminal() {
        assert_eq!(JobStatus::from_code(1), JobStatus::Queued);
        assert_eq!(JobStatus::from_code(2), JobStatus::Processing);
        assert!(!JobStatus::from_code(1).is_terminal());
        assert!(!JobStatus::from_code(2).is_terminal());
    }

    #[test]
    fn unknown_codes_stay_non_terminal() {
        let status = JobStatus::from_code(42);
        assert_eq!(status, JobStatus::Unrecognized(42));
        assert!(!status.is_terminal());
        assert!(!status.is_failure());
    }

    #[test]
    fn raw_code_round_trips() {
        for code in [0, 1, 2, 3, 107, 108, 109, 42] {
            assert_eq!(JobStatus::from_code(code).code(), code);
        }
    }
}
