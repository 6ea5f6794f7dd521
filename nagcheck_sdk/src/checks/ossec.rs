//! OSSEC server checks: agent connectivity, scan runtimes and services

use crate::checks::{run_record_check, ItemSelection};
use crate::collectors::ossec::{
    validate_installation, AgentCollector, ScanAgeCollector, ScanService, ServiceCollector,
    AGE_FIELD, STATE_FIELD, STATUS_FIELD,
};
use crate::commands::create_ossec_command_executor;
use crate::config::ProbeConfig;
use crate::error::ProbeError;
use nagcheck_engine::execution::{Aggregation, AggregationMode, ItemEvaluator, ItemRule, Threshold};
use nagcheck_engine::results::CheckReport;
use std::path::PathBuf;

pub const CONNECTED_STATES: [&str; 2] = ["Active", "Active/Local"];

/// Queue file the server writes for itself
pub const SERVER_QUEUE_ENTRY: &str = "rootcheck";

pub const DEFAULT_CRITICAL: f64 = 1.0;
pub const DEFAULT_WARNING: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum OssecCheck {
    Connected,
    Syscheck,
    Rootcheck,
    Status,
}

impl OssecCheck {
    pub fn as_str(&self) -> &'static str {
        match self {
            OssecCheck::Connected => "connected",
            OssecCheck::Syscheck => "syscheck",
            OssecCheck::Rootcheck => "rootcheck",
            OssecCheck::Status => "status",
        }
    }

    fn scan_service(&self) -> Option<ScanService> {
        match self {
            OssecCheck::Syscheck => Some(ScanService::Syscheck),
            OssecCheck::Rootcheck => Some(ScanService::Rootcheck),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OssecOptions {
    pub check: OssecCheck,
    pub selection: ItemSelection,
    /// Installation root overriding the configured one
    pub path: Option<PathBuf>,
    /// Agent count for `connected`, hours for scan checks
    pub critical: Option<f64>,
    pub warning: Option<f64>,
}

impl OssecOptions {
    pub fn threshold(&self) -> Threshold {
        Threshold::new(
            self.critical.unwrap_or(DEFAULT_CRITICAL),
            self.warning.unwrap_or(DEFAULT_WARNING),
        )
    }
}

/// Evaluator and aggregation mode for a check
pub fn plan(options: &OssecOptions) -> (ItemEvaluator, AggregationMode) {
    let threshold = options.threshold();

    match options.check {
        OssecCheck::Connected => (
            ItemEvaluator::new(ItemRule::membership(STATUS_FIELD, CONNECTED_STATES))
                .with_gate(options.selection.gate()),
            AggregationMode::CountThreshold(threshold),
        ),
        OssecCheck::Syscheck | OssecCheck::Rootcheck => {
            // The server's own queue entry only counts when asked for by name
            let selection = options.selection.clone().skipping([SERVER_QUEUE_ENTRY]);
            (
                ItemEvaluator::new(ItemRule::ceiling(AGE_FIELD, threshold).scaled(1.0, "hours"))
                    .with_gate(selection.gate()),
                AggregationMode::WorstOfN,
            )
        }
        OssecCheck::Status => (
            ItemEvaluator::new(ItemRule::equals(STATE_FIELD, "running"))
                .with_gate(options.selection.gate()),
            AggregationMode::WorstOfN,
        ),
    }
}

pub fn report(check: OssecCheck, aggregation: &Aggregation) -> CheckReport {
    match check {
        OssecCheck::Connected => {
            if aggregation.all_passed() {
                CheckReport::summarize(check.as_str(), aggregation, "All agents connected")
            } else {
                let summary = format!("{} agents not connected", aggregation.failed_count());
                CheckReport::summarize(check.as_str(), aggregation, summary)
            }
        }
        OssecCheck::Syscheck | OssecCheck::Rootcheck => CheckReport::from_aggregation(
            check.as_str(),
            aggregation,
            format!("Agent {} runtimes are up to date", check.as_str()),
            format!(
                "{} agents have stale {} runtimes",
                aggregation.failed_count(),
                check.as_str()
            ),
        ),
        OssecCheck::Status => CheckReport::from_aggregation(
            check.as_str(),
            aggregation,
            "All services running",
            "Some services not running",
        ),
    }
}

pub fn run(options: &OssecOptions, config: &ProbeConfig) -> Result<CheckReport, ProbeError> {
    let root = options.path.clone().unwrap_or_else(|| config.ossec_path.clone());
    validate_installation(&root, &config.ossec_init_conf)?;
    log::info!("Validated OSSEC server installation at {}", root.display());

    let (evaluator, mode) = plan(options);
    let executor = create_ossec_command_executor(&root, config.command_timeout());

    let aggregation = match options.check {
        OssecCheck::Connected => {
            run_record_check(&AgentCollector::new(&executor, &root), &evaluator, mode)?
        }
        OssecCheck::Status => {
            run_record_check(&ServiceCollector::new(&executor, &root), &evaluator, mode)?
        }
        OssecCheck::Syscheck | OssecCheck::Rootcheck => {
            let service = options.check.scan_service().ok_or_else(|| {
                ProbeError::usage(format!("{} is not a scan check", options.check.as_str()))
            })?;
            run_record_check(&ScanAgeCollector::new(&root, service)?, &evaluator, mode)?
        }
    };

    Ok(report(options.check, &aggregation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::evaluate_records;
    use crate::collectors::ossec::{parse_agent_list, parse_service_status};
    use nagcheck_engine::types::{FieldValue, Record, Severity};
    use std::fs;
    use tempfile::TempDir;

    const AGENT_LIST: &str = "\
OSSEC HIDS agent_control. List of available agents:
   ID: 000, Name: ossec-server (server), IP: 127.0.0.1, Active/Local
   ID: 001, Name: www1, IP: 10.0.0.11, Active
   ID: 002, Name: www2, IP: any, Disconnected
   ID: 003, Name: www3, IP: any, Never connected
";

    fn options(check: OssecCheck) -> OssecOptions {
        OssecOptions {
            check,
            selection: ItemSelection::default(),
            path: None,
            critical: None,
            warning: None,
        }
    }

    fn evaluate(options: &OssecOptions, records: &[Record]) -> CheckReport {
        let (evaluator, mode) = plan(options);
        report(options.check, &evaluate_records(records, &evaluator, mode))
    }

    #[test]
    fn test_connected_count_threshold() {
        let mut opts = options(OssecCheck::Connected);
        opts.critical = Some(3.0);
        opts.warning = Some(1.0);

        let report = evaluate(&opts, &parse_agent_list(AGENT_LIST.lines()));
        assert_eq!(report.severity, Severity::Warning);
        assert_eq!(report.status_line(), "WARNING: 2 agents not connected");
        assert_eq!(report.details.len(), 2);
    }

    #[test]
    fn test_connected_defaults_critical_on_first_failure() {
        let report = evaluate(&options(OssecCheck::Connected), &parse_agent_list(AGENT_LIST.lines()));
        assert_eq!(report.severity, Severity::Critical);
    }

    #[test]
    fn test_connected_with_skip_and_agents() {
        let mut opts = options(OssecCheck::Connected);
        opts.selection = ItemSelection::new(&["www2".to_string(), "www3".to_string()], &[]);
        let report = evaluate(&opts, &parse_agent_list(AGENT_LIST.lines()));
        assert_eq!(report.status_line(), "OK: All agents connected");

        opts.selection = ItemSelection::new(&["www2".to_string()], &["www2".to_string()]);
        let report = evaluate(&opts, &parse_agent_list(AGENT_LIST.lines()));
        assert_eq!(report.evaluated, 1);
        assert_eq!(report.status_line(), "CRITICAL: 1 agents not connected");
    }

    #[test]
    fn test_status_check() {
        let output = "ossec-monitord is running...\nossec-remoted not running...\n";
        let report = evaluate(&options(OssecCheck::Status), &parse_service_status(output.lines()));
        assert_eq!(report.status_line(), "CRITICAL: Some services not running");
        assert_eq!(
            report.details,
            vec!["CRITICAL: ossec-remoted state: not running".to_string()]
        );

        let mut opts = options(OssecCheck::Status);
        opts.selection = ItemSelection::new(&["ossec-remoted".to_string()], &[]);
        let report = evaluate(&opts, &parse_service_status(output.lines()));
        assert_eq!(report.status_line(), "OK: All services running");
    }

    #[test]
    fn test_scan_ages() {
        let records = vec![
            Record::new("rootcheck").with_field(AGE_FIELD, 40.0),
            Record::new("www1").with_field(AGE_FIELD, 3.0),
            Record::new("www2").with_field(AGE_FIELD, 8.0),
            Record::new("www3").with_field(AGE_FIELD, FieldValue::Null),
        ];

        let mut opts = options(OssecCheck::Syscheck);
        opts.critical = Some(12.0);
        opts.warning = Some(6.0);
        let report = evaluate(&opts, &records);

        // The server entry is skipped; the null age is UNKNOWN
        assert_eq!(report.severity, Severity::Unknown);
        assert_eq!(report.evaluated, 3);
        assert_eq!(
            report.details,
            vec![
                "WARNING: www2 age_hours: 8.00 hours".to_string(),
                "UNKNOWN: www3 age_hours: unknown".to_string(),
            ]
        );

        opts.selection = ItemSelection::new(&[], &["rootcheck".to_string(), "www1".to_string()]);
        let report = evaluate(&opts, &records);
        assert_eq!(report.severity, Severity::Critical);
        assert_eq!(report.evaluated, 2);
    }

    #[test]
    fn test_scan_ages_up_to_date() {
        let records = vec![Record::new("www1").with_field(AGE_FIELD, 0.5)];
        let report = evaluate(&options(OssecCheck::Rootcheck), &records);
        assert_eq!(report.status_line(), "OK: Agent rootcheck runtimes are up to date");
    }

    #[test]
    fn test_run_rejects_missing_installation() {
        let dir = TempDir::new().unwrap();
        let init = dir.path().join("ossec-init.conf");
        fs::write(&init, "TYPE=\"server\"\n").unwrap();

        let config = ProbeConfig::default()
            .with_ossec_path(dir.path().join("ossec"))
            .with_ossec_init_conf(&init);

        let err = run(&options(OssecCheck::Status), &config).unwrap_err();
        assert!(matches!(err, ProbeError::Installation(_)));
        assert!(err.user_message().starts_with("Installation missing file"));
    }
}
