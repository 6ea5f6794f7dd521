//! # Probe Errors

use crate::collectors::ossec::InstallationError;
use crate::config::ConfigError;
use crate::credentials::CredentialError;
use nagcheck_engine::snapshot::SnapshotError;
use nagcheck_engine::strategies::CollectionError;
use nagcheck_engine::types::Severity;

/// Any failure that stops a probe before it can produce a verdict
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Credential error: {0}")]
    Credentials(#[from] CredentialError),

    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Installation error: {0}")]
    Installation(#[from] InstallationError),

    /// Invalid or missing command-line arguments
    #[error("Usage error: {reason}")]
    Usage { reason: String },
}

impl ProbeError {
    pub fn usage(reason: impl Into<String>) -> Self {
        ProbeError::Usage {
            reason: reason.into(),
        }
    }

    /// Every probe error is reported as UNKNOWN
    pub fn severity(&self) -> Severity {
        Severity::Unknown
    }

    /// Check if the backend could not be reached
    pub fn is_transport(&self) -> bool {
        matches!(self, ProbeError::Collection(e) if e.is_transport())
    }

    /// Get a user-friendly error message for the status line
    pub fn user_message(&self) -> String {
        match self {
            ProbeError::Config(e) => format!("Configuration error: {}", e),
            ProbeError::Credentials(e) => e.user_message(),
            ProbeError::Collection(e) => format!("Unable to collect data: {}", e),
            ProbeError::Snapshot(e) => format!("Unable to store history: {}", e.user_message()),
            ProbeError::Installation(e) => e.to_string(),
            ProbeError::Usage { reason } => reason.clone(),
        }
    }
}
