use crate::types::severity::Severity;
use serde::{Deserialize, Serialize};

/// Result of evaluating one record against one rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub identity: String,
    pub severity: Severity,
    pub detail: String,
}

impl EvaluationOutcome {
    pub fn new(identity: impl Into<String>, severity: Severity, detail: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            severity,
            detail: detail.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        !self.severity.is_ok()
    }

    /// One-line rendering used for per-item report lines
    pub fn to_line(&self) -> String {
        if self.detail.is_empty() {
            format!("{}: {}", self.severity, self.identity)
        } else {
            format!("{}: {} {}", self.severity, self.identity, self.detail)
        }
    }
}
