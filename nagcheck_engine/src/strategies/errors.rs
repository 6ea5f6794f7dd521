// src/strategies/errors.rs
//! Error types for record collection
//!
//! Every collection error is fatal for the run: nothing is evaluated and the
//! probe reports UNKNOWN.

use crate::strategies::command_executor::CommandError;
use std::path::PathBuf;

/// Backend collection errors
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("Request to '{endpoint}' failed: {reason}")]
    TransportFailed { endpoint: String, reason: String },

    #[error("Request to '{endpoint}' timed out after {timeout_ms}ms")]
    Timeout { endpoint: String, timeout_ms: u64 },

    #[error("Access denied by '{endpoint}': {reason}")]
    AccessDenied { endpoint: String, reason: String },

    #[error("Backend '{endpoint}' returned an error: {message}")]
    BackendError { endpoint: String, message: String },

    #[error("Data format error: {reason}")]
    DataFormatError { reason: String },

    #[error("Required field missing from response: {field}")]
    MissingField { field: String },

    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Command error: {0}")]
    Command(#[from] CommandError),
}

impl CollectionError {
    pub fn data_format(reason: impl Into<String>) -> Self {
        CollectionError::DataFormatError {
            reason: reason.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        CollectionError::MissingField {
            field: field.into(),
        }
    }

    /// True when the backend could not be reached at all
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CollectionError::TransportFailed { .. }
                | CollectionError::Timeout { .. }
                | CollectionError::AccessDenied { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        let timeout = CollectionError::Timeout {
            endpoint: "https://switch1/command-api".to_string(),
            timeout_ms: 10_000,
        };
        assert!(timeout.is_transport());
        assert!(!CollectionError::missing_field("aclList").is_transport());
    }

    #[test]
    fn test_command_error_conversion() {
        let err: CollectionError = CommandError::Timeout { timeout_ms: 5000 }.into();
        assert_eq!(err.to_string(), "Command error: Command timed out after 5000ms");
    }
}
