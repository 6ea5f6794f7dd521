//! # Probe Checks
//!
//! Each check wires a collector to an evaluator, an aggregation mode and the
//! summary wording. Record checks go collect -> gate/rule -> aggregate;
//! change checks go collect facts -> snapshot store.

pub mod arista;
pub mod crashplan;
pub mod ossec;

use crate::error::ProbeError;
use nagcheck_engine::execution::{aggregate, Aggregation, AggregationMode, ItemEvaluator, RecordGate};
use nagcheck_engine::results::CheckReport;
use nagcheck_engine::snapshot::SnapshotStore;
use nagcheck_engine::strategies::{FactCollector, RecordCollector};
use nagcheck_engine::types::Record;
use std::collections::BTreeSet;

/// Trimmed, non-empty names from comma-split arguments
pub fn name_set<I, S>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .flat_map(|v| {
            v.as_ref()
                .split(',')
                .map(|s| s.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Skip set plus optional include set chosen on the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemSelection {
    pub skip: BTreeSet<String>,
    pub include: Option<BTreeSet<String>>,
}

impl ItemSelection {
    pub fn new(skip: &[String], include: &[String]) -> Self {
        let include = name_set(include);
        Self {
            skip: name_set(skip),
            include: if include.is_empty() {
                None
            } else {
                Some(include)
            },
        }
    }

    pub fn skipping<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn gate(&self) -> RecordGate {
        let gate = RecordGate::new().with_skip(self.skip.iter().cloned());
        match &self.include {
            Some(include) => gate.with_include(include.iter().cloned()),
            None => gate,
        }
    }
}

/// Evaluate already collected records
pub fn evaluate_records(
    records: &[Record],
    evaluator: &ItemEvaluator,
    mode: AggregationMode,
) -> Aggregation {
    let outcomes = evaluator.evaluate_all(records);
    log::debug!(
        "{} of {} records produced outcomes",
        outcomes.len(),
        records.len()
    );
    aggregate(outcomes, mode)
}

/// Collect then evaluate; a collection error stops before any evaluation
pub fn run_record_check(
    collector: &dyn RecordCollector,
    evaluator: &ItemEvaluator,
    mode: AggregationMode,
) -> Result<Aggregation, ProbeError> {
    log::info!("Collecting records with {}", collector.collector_id());
    let records = collector.collect()?;
    Ok(evaluate_records(&records, evaluator, mode))
}

/// Collect facts and compare them with the previous run
pub fn run_change_check(
    check: &str,
    snapshot_name: &str,
    collector: &dyn FactCollector,
    store: &SnapshotStore,
) -> Result<CheckReport, ProbeError> {
    log::info!("Collecting facts with {}", collector.collector_id());
    let facts = collector.collect_facts()?;
    log::debug!("{} facts for '{}'", facts.len(), snapshot_name);

    let state = store.record_run(snapshot_name, &facts)?;
    Ok(CheckReport::from_snapshot(check, state))
}

/// File-safe snapshot name for a check against one target
pub fn snapshot_name(probe: &str, target: &str, check: &str) -> String {
    let target: String = target
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_{}_{}", probe, target, check)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nagcheck_engine::execution::ItemRule;
    use nagcheck_engine::strategies::CollectionError;
    use nagcheck_engine::types::Severity;
    use tempfile::TempDir;

    struct FixedRecords(Vec<Record>);

    impl RecordCollector for FixedRecords {
        fn collector_id(&self) -> &str {
            "fixed"
        }

        fn collect(&self) -> Result<Vec<Record>, CollectionError> {
            Ok(self.0.clone())
        }
    }

    struct Unreachable;

    impl RecordCollector for Unreachable {
        fn collector_id(&self) -> &str {
            "unreachable"
        }

        fn collect(&self) -> Result<Vec<Record>, CollectionError> {
            Err(CollectionError::TransportFailed {
                endpoint: "https://switch1/command-api".to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    struct FixedFacts(Vec<String>);

    impl FactCollector for FixedFacts {
        fn collector_id(&self) -> &str {
            "fixed_facts"
        }

        fn collect_facts(&self) -> Result<Vec<String>, CollectionError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_name_set() {
        let names = name_set(["eth1, eth2", " ", "eth3,"]);
        let expected: BTreeSet<String> = ["eth1", "eth2", "eth3"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_selection_without_include() {
        let selection = ItemSelection::new(&["eth1".to_string()], &[]);
        assert!(selection.include.is_none());
        assert!(!selection.gate().admits(&Record::new("eth1")));
        assert!(selection.gate().admits(&Record::new("eth2")));
    }

    #[test]
    fn test_record_check() {
        let collector = FixedRecords(vec![
            Record::new("eth0").with_field("status", "up"),
            Record::new("eth1").with_field("status", "down"),
            Record::new("eth2").with_field("status", "up"),
        ]);
        let evaluator = ItemEvaluator::new(ItemRule::equals("status", "up"));

        let aggregation =
            run_record_check(&collector, &evaluator, AggregationMode::WorstOfN).unwrap();
        assert_eq!(aggregation.severity, Severity::Critical);
        assert_eq!(aggregation.failing[0].identity, "eth1");
    }

    #[test]
    fn test_transport_failure_stops_check() {
        let evaluator = ItemEvaluator::new(ItemRule::equals("status", "up"));
        let err = run_record_check(&Unreachable, &evaluator, AggregationMode::WorstOfN)
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_change_check() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        let facts = FixedFacts(vec!["acl - deny ip any any".to_string()]);

        let first = run_change_check("dumbno", "arista_sw1_dumbno", &facts, &store).unwrap();
        assert_eq!(first.severity, Severity::Unknown);

        let second = run_change_check("dumbno", "arista_sw1_dumbno", &facts, &store).unwrap();
        assert_eq!(second.status_line(), "CRITICAL: Entries haven't changed");
    }

    #[test]
    fn test_snapshot_name() {
        assert_eq!(
            snapshot_name("arista", "switch1.company.org:443", "link_status"),
            "arista_switch1.company.org_443_link_status"
        );
    }
}
