//! Switch control-plane checks over Arista eAPI

use crate::checks::{run_change_check, run_record_check, snapshot_name, ItemSelection};
use crate::collectors::arista::{AclCollector, EapiClient, InterfaceCollector, LinkStatusCollector};
use crate::collectors::http::HttpSettings;
use crate::config::ProbeConfig;
use crate::credentials::Credentials;
use crate::error::ProbeError;
use nagcheck_engine::execution::{Aggregation, AggregationMode, ItemEvaluator, ItemRule, Threshold};
use nagcheck_engine::results::CheckReport;
use nagcheck_engine::snapshot::SnapshotStore;
use std::path::PathBuf;

/// Values accepted by the status membership checks
pub const HEALTHY_STATES: [&str; 3] = ["connected", "up", "duplexFull"];

/// Minimum link speed in bit/s
pub const MIN_BANDWIDTH: f64 = 10_000_000_000.0;

const DESCRIPTION_FIELD: &str = "description";
const BITS_TO_MBPS: f64 = 1.0 / 1_000_000.0;
const BITS_TO_GBPS: f64 = 1.0 / 1_000_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum AristaCheck {
    InterfaceStatus,
    ProtocolStatus,
    DuplexStatus,
    BandwidthStatus,
    InputRate,
    OutputRate,
    TrafficStatus,
    Dumbno,
    LinkStatus,
}

impl AristaCheck {
    pub fn as_str(&self) -> &'static str {
        match self {
            AristaCheck::InterfaceStatus => "interface_status",
            AristaCheck::ProtocolStatus => "protocol_status",
            AristaCheck::DuplexStatus => "duplex_status",
            AristaCheck::BandwidthStatus => "bandwidth_status",
            AristaCheck::InputRate => "input_rate",
            AristaCheck::OutputRate => "output_rate",
            AristaCheck::TrafficStatus => "traffic_status",
            AristaCheck::Dumbno => "dumbno",
            AristaCheck::LinkStatus => "link_status",
        }
    }

    /// Interface field a status check inspects
    pub fn status_field(&self) -> Option<&'static str> {
        match self {
            AristaCheck::InterfaceStatus => Some("interfaceStatus"),
            AristaCheck::ProtocolStatus => Some("lineProtocolStatus"),
            AristaCheck::DuplexStatus => Some("duplex"),
            AristaCheck::BandwidthStatus => Some("bandwidth"),
            _ => None,
        }
    }

    /// Rate field and default Ethernet range for the rate checks
    pub fn rate_target(&self) -> Option<(&'static str, &'static str)> {
        match self {
            AristaCheck::InputRate => Some(("interfaceStatistics.inBitsRate", "9/1-24")),
            AristaCheck::OutputRate => Some(("interfaceStatistics.outBitsRate", "3/1-16")),
            _ => None,
        }
    }

    pub fn is_change_check(&self) -> bool {
        matches!(self, AristaCheck::Dumbno | AristaCheck::LinkStatus)
    }
}

#[derive(Debug, Clone)]
pub struct AristaOptions {
    /// `<host>` or `<host:port>`
    pub host: String,
    pub credentials_file: PathBuf,
    pub check: AristaCheck,
    pub selection: ItemSelection,
    pub critical: Option<f64>,
    pub warning: Option<f64>,
    /// Ethernet range overriding the rate check default
    pub interfaces: Option<String>,
}

/// Evaluator, aggregation and summaries for a record-based check
#[derive(Debug, Clone)]
pub struct InterfacePlan {
    pub evaluator: ItemEvaluator,
    pub mode: AggregationMode,
    pub ok_summary: String,
    pub failure_label: String,
}

impl InterfacePlan {
    pub fn report(&self, check: AristaCheck, aggregation: &Aggregation) -> CheckReport {
        let failure = format!(
            "{} interfaces {}",
            aggregation.failed_count(),
            self.failure_label
        );
        CheckReport::from_aggregation(check.as_str(), aggregation, &self.ok_summary, failure)
    }
}

/// Build the plan for a record-based check
pub fn plan(check: AristaCheck, options: &AristaOptions) -> Result<InterfacePlan, ProbeError> {
    let gate = options
        .selection
        .gate()
        .require_description(DESCRIPTION_FIELD);

    let plan = match check {
        AristaCheck::InterfaceStatus | AristaCheck::ProtocolStatus | AristaCheck::DuplexStatus => {
            let field = status_field(check)?;
            InterfacePlan {
                evaluator: ItemEvaluator::new(ItemRule::membership(field, HEALTHY_STATES))
                    .with_gate(gate),
                mode: AggregationMode::WorstOfN,
                ok_summary: format!("{} check successful", field),
                failure_label: format!("failed {} check", field),
            }
        }
        AristaCheck::BandwidthStatus => {
            let field = status_field(check)?;
            InterfacePlan {
                evaluator: ItemEvaluator::new(
                    ItemRule::floor(field, MIN_BANDWIDTH).scaled(BITS_TO_GBPS, "Gbps"),
                )
                .with_gate(gate),
                mode: AggregationMode::WorstOfN,
                ok_summary: format!("{} check successful", field),
                failure_label: format!("failed {} check", field),
            }
        }
        AristaCheck::InputRate | AristaCheck::OutputRate => {
            let (field, _) = check
                .rate_target()
                .ok_or_else(|| ProbeError::usage(format!("{} is not a rate check", check.as_str())))?;
            let threshold = required_threshold(check, options)?;
            InterfacePlan {
                evaluator: ItemEvaluator::new(
                    ItemRule::ceiling(field, threshold).scaled(BITS_TO_MBPS, "Mbps"),
                )
                .with_gate(gate),
                mode: AggregationMode::WorstOfN,
                ok_summary: format!("{} within thresholds on all interfaces", check.as_str()),
                failure_label: format!("outside {} thresholds", check.as_str()),
            }
        }
        AristaCheck::TrafficStatus => InterfacePlan {
            evaluator: ItemEvaluator::new(ItemRule::idle([
                "interfaceStatistics.inPktsRate",
                "interfaceStatistics.outPktsRate",
            ]))
            .with_gate(
                gate.exclude_when("lineProtocolStatus", "notPresent")
                    .exclude_when("interfaceStatus", "notconnect"),
            ),
            mode: AggregationMode::WorstOfN,
            ok_summary: "Traffic is being processed by all connected interfaces".to_string(),
            failure_label: "are not processing traffic".to_string(),
        },
        AristaCheck::Dumbno | AristaCheck::LinkStatus => {
            return Err(ProbeError::usage(format!(
                "{} is a change check",
                check.as_str()
            )))
        }
    };
    Ok(plan)
}

fn status_field(check: AristaCheck) -> Result<&'static str, ProbeError> {
    check
        .status_field()
        .ok_or_else(|| ProbeError::usage(format!("{} is not a status check", check.as_str())))
}

fn required_threshold(check: AristaCheck, options: &AristaOptions) -> Result<Threshold, ProbeError> {
    match (options.critical, options.warning) {
        (Some(critical), Some(warning)) => {
            let threshold = Threshold::new(critical, warning);
            if threshold.is_inverted() {
                log::warn!(
                    "Critical {} is below warning {}; WARNING is unreachable",
                    critical,
                    warning
                );
            }
            Ok(threshold)
        }
        _ => Err(ProbeError::usage(format!(
            "{} requires both -c and -w in Mbps",
            check.as_str()
        ))),
    }
}

/// Run one check against a switch
pub fn run(options: &AristaOptions, config: &ProbeConfig) -> Result<CheckReport, ProbeError> {
    let credentials = Credentials::load(&options.credentials_file)?;
    let settings = HttpSettings {
        timeout: config.http_timeout(),
        accept_invalid_certs: config.accept_invalid_certs,
    };
    let client = EapiClient::new(&options.host, credentials, &settings)?;
    let check = options.check;

    if check.is_change_check() {
        let store = SnapshotStore::new(&config.state_dir);
        let name = snapshot_name("arista", &options.host, check.as_str());
        let skip = options.selection.skip.clone();

        return match check {
            AristaCheck::Dumbno => {
                run_change_check(check.as_str(), &name, &AclCollector::new(&client, skip), &store)
            }
            _ => run_change_check(
                check.as_str(),
                &name,
                &LinkStatusCollector::new(&client, skip),
                &store,
            ),
        };
    }

    let plan = plan(check, options)?;
    let collector = match check.rate_target() {
        Some((_, default_range)) => InterfaceCollector::ethernet_range(
            &client,
            options.interfaces.as_deref().unwrap_or(default_range),
        ),
        None => InterfaceCollector::all(&client),
    };
    log::debug!("Running {} via '{}'", check.as_str(), collector.command());

    let aggregation = run_record_check(&collector, &plan.evaluator, plan.mode)?;
    Ok(plan.report(check, &aggregation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::evaluate_records;
    use crate::collectors::arista::interface_records;
    use assert_matches::assert_matches;
    use nagcheck_engine::types::{Record, Severity};
    use serde_json::json;

    fn options(check: AristaCheck) -> AristaOptions {
        AristaOptions {
            host: "switch1.company.org:443".to_string(),
            credentials_file: PathBuf::from("/etc/nagcheck/arista.json"),
            check,
            selection: ItemSelection::default(),
            critical: None,
            warning: None,
            interfaces: None,
        }
    }

    fn interfaces() -> Vec<Record> {
        let payload = json!({
            "interfaces": {
                "Ethernet1": {
                    "description": "core-a", "interfaceStatus": "connected",
                    "lineProtocolStatus": "up", "duplex": "duplexFull",
                    "bandwidth": 10000000000i64,
                    "interfaceStatistics": {"inBitsRate": 912000000.0, "outBitsRate": 1000.0,
                                            "inPktsRate": 50.0, "outPktsRate": 20.0}
                },
                "Ethernet2": {
                    "description": "core-b", "interfaceStatus": "notconnect",
                    "lineProtocolStatus": "down", "duplex": "duplexFull",
                    "bandwidth": 1000000000i64,
                    "interfaceStatistics": {"inBitsRate": 0.0, "outBitsRate": 0.0,
                                            "inPktsRate": 0.0, "outPktsRate": 0.0}
                },
                "Ethernet3": {
                    "description": "tap", "interfaceStatus": "connected",
                    "lineProtocolStatus": "up", "duplex": "duplexHalf",
                    "bandwidth": 10000000000i64,
                    "interfaceStatistics": {"inBitsRate": 612000000.0, "outBitsRate": 0.0,
                                            "inPktsRate": 0.0, "outPktsRate": 0.0}
                },
                "Management1": {
                    "description": null, "interfaceStatus": "disabled",
                    "lineProtocolStatus": "down", "duplex": "duplexFull",
                    "bandwidth": 100000000i64
                }
            }
        });
        interface_records(&payload).unwrap()
    }

    fn evaluate(check: AristaCheck, options: &AristaOptions) -> CheckReport {
        let plan = plan(check, options).unwrap();
        let aggregation = evaluate_records(&interfaces(), &plan.evaluator, plan.mode);
        plan.report(check, &aggregation)
    }

    #[test]
    fn test_interface_status() {
        let report = evaluate(AristaCheck::InterfaceStatus, &options(AristaCheck::InterfaceStatus));

        assert_eq!(report.severity, Severity::Critical);
        assert_eq!(report.status_line(), "CRITICAL: 1 interfaces failed interfaceStatus check");
        assert_eq!(
            report.details,
            vec!["CRITICAL: Ethernet2 interfaceStatus: notconnect".to_string()]
        );
    }

    #[test]
    fn test_status_check_with_skip() {
        let mut opts = options(AristaCheck::DuplexStatus);
        opts.selection = ItemSelection::new(&["Ethernet3".to_string()], &[]);

        let report = evaluate(AristaCheck::DuplexStatus, &opts);
        assert_eq!(report.status_line(), "OK: duplex check successful");
    }

    #[test]
    fn test_device_list_includes_undescribed() {
        let mut opts = options(AristaCheck::InterfaceStatus);
        opts.selection = ItemSelection::new(&[], &["Management1".to_string()]);

        let report = evaluate(AristaCheck::InterfaceStatus, &opts);
        assert_eq!(report.evaluated, 1);
        assert_eq!(
            report.details,
            vec!["CRITICAL: Management1 interfaceStatus: disabled".to_string()]
        );
    }

    #[test]
    fn test_bandwidth_status() {
        let report = evaluate(AristaCheck::BandwidthStatus, &options(AristaCheck::BandwidthStatus));
        assert_eq!(
            report.details,
            vec!["CRITICAL: Ethernet2 bandwidth: 1.00 Gbps (minimum 10.00 Gbps)".to_string()]
        );
    }

    #[test]
    fn test_rate_requires_thresholds() {
        assert_matches!(
            plan(AristaCheck::InputRate, &options(AristaCheck::InputRate)),
            Err(ProbeError::Usage { .. })
        );
    }

    #[test]
    fn test_input_rate() {
        let mut opts = options(AristaCheck::InputRate);
        opts.critical = Some(900.0);
        opts.warning = Some(600.0);

        let report = evaluate(AristaCheck::InputRate, &opts);
        assert_eq!(report.severity, Severity::Critical);
        assert_eq!(
            report.details,
            vec![
                "CRITICAL: Ethernet1 interfaceStatistics.inBitsRate: 912.00 Mbps".to_string(),
                "WARNING: Ethernet3 interfaceStatistics.inBitsRate: 612.00 Mbps".to_string(),
            ]
        );
    }

    #[test]
    fn test_traffic_status() {
        let report = evaluate(AristaCheck::TrafficStatus, &options(AristaCheck::TrafficStatus));

        // Ethernet2 is notconnect and excluded; Ethernet3 is connected but idle
        assert_eq!(report.severity, Severity::Critical);
        assert_eq!(report.evaluated, 2);
        assert_eq!(report.details.len(), 1);
        assert!(report.details[0].starts_with("CRITICAL: Ethernet3"));
    }

    #[test]
    fn test_change_checks_have_no_plan() {
        assert!(AristaCheck::Dumbno.is_change_check());
        assert_matches!(
            plan(AristaCheck::LinkStatus, &options(AristaCheck::LinkStatus)),
            Err(ProbeError::Usage { .. })
        );
    }

    #[test]
    fn test_rate_targets() {
        assert_eq!(
            AristaCheck::InputRate.rate_target(),
            Some(("interfaceStatistics.inBitsRate", "9/1-24"))
        );
        assert_eq!(
            AristaCheck::OutputRate.rate_target(),
            Some(("interfaceStatistics.outBitsRate", "3/1-16"))
        );
        assert_eq!(AristaCheck::TrafficStatus.rate_target(), None);
    }
}
