// Error types for the training ETL
//
// Field failures are values collected per record; everything else is a
// boundary error that aborts only its own stage.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One failing field of one raw record.
///
/// Rendered as `"<field>: <reason>"` in the rejection report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: &str, reason: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

impl std::error::Error for FieldError {}

/// Upstream statistics API failures. Always fatal for the run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("API request failed with status {0}")]
    Status(u16),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode API response: {0}")]
    Decode(String),
}

/// Store failures during the load step.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to connect to store: {0}")]
    Connect(String),

    #[error("Uniqueness constraint rejected the batch: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Staging error: {0}")]
    Staging(#[from] StagingError),
}

impl LoadError {
    /// True when a concurrent writer already holds one of the batch's keys.
    pub fn is_conflict(&self) -> bool {
        matches!(self, LoadError::Conflict(_))
    }
}

/// Staging CSV failures.
#[derive(Error, Debug)]
pub enum StagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Staging header mismatch: expected {expected}, got {actual}")]
    Header { expected: String, actual: String },
}

/// Rejection log failures.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_display() {
        let err = FieldError::new("user_id", "user_id is empty");
        assert_eq!(err.to_string(), "user_id: user_id is empty");
    }

    #[test]
    fn test_conflict_detection() {
        assert!(LoadError::Conflict("dup".to_string()).is_conflict());
        assert!(!LoadError::Connect("refused".to_string()).is_conflict());
    }
}
