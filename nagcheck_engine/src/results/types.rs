//! # Check Report Types
//!
//! One report per probe run: an overall severity, a summary line and one
//! line per failing item. Serializes to JSON for `--json` output.

use crate::execution::Aggregation;
use crate::snapshot::SnapshotState;
use crate::types::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Host the probe ran on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostContext {
    pub hostname: String,
    pub os_info: String,
}

impl HostContext {
    pub fn from_system() -> Self {
        Self {
            hostname: hostname::get()
                .unwrap_or_else(|_| std::ffi::OsString::from("unknown"))
                .to_string_lossy()
                .to_string(),
            os_info: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
        }
    }

    pub fn new(hostname: impl Into<String>, os_info: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            os_info: os_info.into(),
        }
    }
}

/// Final verdict of one check run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    /// Unique identifier for this run
    pub run_id: String,

    /// Check type, e.g. `interface_status`
    pub check: String,

    pub severity: Severity,

    /// Text after `SEVERITY: ` on the status line
    pub summary: String,

    /// Per-item lines, failing items only
    pub details: Vec<String>,

    /// Items that took part in aggregation
    pub evaluated: usize,

    pub host: HostContext,

    pub checked_at: DateTime<Utc>,
}

impl CheckReport {
    pub fn new(check: impl Into<String>, severity: Severity, summary: impl Into<String>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            check: check.into(),
            severity,
            summary: summary.into(),
            details: Vec::new(),
            evaluated: 0,
            host: HostContext::from_system(),
            checked_at: Utc::now(),
        }
    }

    /// Build from an aggregation, picking the summary by outcome
    ///
    /// `ok_summary` is used when the overall severity is OK, otherwise
    /// `failure_summary`. Failing items become detail lines in order.
    pub fn from_aggregation(
        check: impl Into<String>,
        aggregation: &Aggregation,
        ok_summary: impl Into<String>,
        failure_summary: impl Into<String>,
    ) -> Self {
        let summary = if aggregation.severity.is_ok() {
            ok_summary.into()
        } else {
            failure_summary.into()
        };
        Self::summarize(check, aggregation, summary)
    }

    /// Build from an aggregation with a caller-chosen summary
    pub fn summarize(
        check: impl Into<String>,
        aggregation: &Aggregation,
        summary: impl Into<String>,
    ) -> Self {
        let mut report = Self::new(check, aggregation.severity, summary);
        report.details = aggregation.failing.iter().map(|o| o.to_line()).collect();
        report.evaluated = aggregation.evaluated;
        report
    }

    pub fn from_snapshot(check: impl Into<String>, state: SnapshotState) -> Self {
        Self::new(check, state.severity(), state.summary())
    }

    /// Fatal-error report, always UNKNOWN
    pub fn unknown(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(check, Severity::Unknown, message)
    }

    pub fn with_host(mut self, host: HostContext) -> Self {
        self.host = host;
        self
    }

    pub fn status_line(&self) -> String {
        format!("{}: {}", self.severity, self.summary)
    }

    /// Status line first, then the detail lines
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.details.len() + 1);
        lines.push(self.status_line());
        lines.extend(self.details.iter().cloned());
        lines
    }

    pub fn exit_code(&self) -> i32 {
        self.severity.exit_code()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{aggregate, AggregationMode};
    use crate::types::EvaluationOutcome;

    #[test]
    fn test_report_from_failing_aggregation() {
        let aggregation = aggregate(
            vec![
                EvaluationOutcome::new("eth0", Severity::Ok, "status: up"),
                EvaluationOutcome::new("eth1", Severity::Critical, "status: down"),
            ],
            AggregationMode::WorstOfN,
        );

        let report = CheckReport::from_aggregation(
            "interface_status",
            &aggregation,
            "status check successful",
            "1 interfaces failed",
        );

        assert_eq!(report.exit_code(), 2);
        assert_eq!(
            report.lines(),
            vec![
                "CRITICAL: 1 interfaces failed".to_string(),
                "CRITICAL: eth1 status: down".to_string(),
            ]
        );
        assert_eq!(report.evaluated, 2);
    }

    #[test]
    fn test_report_from_clean_aggregation() {
        let aggregation = aggregate(Vec::new(), AggregationMode::WorstOfN);
        let report = CheckReport::from_aggregation("status", &aggregation, "All good", "Bad");

        assert_eq!(report.status_line(), "OK: All good");
        assert!(report.details.is_empty());
    }

    #[test]
    fn test_report_from_snapshot() {
        let report = CheckReport::from_snapshot("dumbno", SnapshotState::Unchanged);
        assert_eq!(report.status_line(), "CRITICAL: Entries haven't changed");

        let first = CheckReport::from_snapshot("dumbno", SnapshotState::NoBaseline);
        assert_eq!(first.exit_code(), 3);
    }

    #[test]
    fn test_report_json() {
        let report = CheckReport::unknown("connected", "agent_control not found")
            .with_host(HostContext::new("probe01", "linux x86_64"));
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["severity"], "UNKNOWN");
        assert_eq!(value["host"]["hostname"], "probe01");
        assert_eq!(value["check"], "connected");
        assert!(uuid::Uuid::parse_str(value["run_id"].as_str().unwrap()).is_ok());
    }
}
