//! # Item Evaluator
//!
//! Runs the presence gate and one rule over a run's records. Backend
//! iteration order is not trusted, so records are sorted by identity first
//! and the returned outcomes follow that order.

use crate::execution::gate::RecordGate;
use crate::execution::rules::ItemRule;
use crate::types::{EvaluationOutcome, Record};

/// Evaluate one record against one rule without gating
pub fn evaluate(record: &Record, rule: &ItemRule) -> Option<EvaluationOutcome> {
    rule.evaluate(record)
}

#[derive(Debug, Clone)]
pub struct ItemEvaluator {
    gate: RecordGate,
    rule: ItemRule,
}

impl ItemEvaluator {
    pub fn new(rule: ItemRule) -> Self {
        Self {
            gate: RecordGate::new(),
            rule,
        }
    }

    pub fn with_gate(mut self, gate: RecordGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn rule(&self) -> &ItemRule {
        &self.rule
    }

    pub fn gate(&self) -> &RecordGate {
        &self.gate
    }

    /// Gate then evaluate a single record
    pub fn evaluate_one(&self, record: &Record) -> Option<EvaluationOutcome> {
        if let Some(reason) = self.gate.check(record) {
            log::debug!("Excluding '{}': {}", record.identity, reason.as_str());
            return None;
        }

        let outcome = self.rule.evaluate(record);
        if outcome.is_none() {
            log::debug!("Rule does not apply to '{}'", record.identity);
        }
        outcome
    }

    /// Evaluate every record in identity order
    pub fn evaluate_all(&self, records: &[Record]) -> Vec<EvaluationOutcome> {
        let mut ordered: Vec<&Record> = records.iter().collect();
        ordered.sort_by(|a, b| a.identity.cmp(&b.identity));

        ordered
            .into_iter()
            .filter_map(|record| self.evaluate_one(record))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn interfaces() -> Vec<Record> {
        vec![
            Record::new("eth2")
                .with_field("status", "up")
                .with_field("description", "db"),
            Record::new("eth0")
                .with_field("status", "up")
                .with_field("description", "web"),
            Record::new("eth1").with_field("status", "down"),
        ]
    }

    #[test]
    fn test_outcomes_sorted_by_identity() {
        let evaluator = ItemEvaluator::new(ItemRule::equals("status", "up"));
        let outcomes = evaluator.evaluate_all(&interfaces());

        let ids: Vec<&str> = outcomes.iter().map(|o| o.identity.as_str()).collect();
        assert_eq!(ids, vec!["eth0", "eth1", "eth2"]);
        assert_eq!(outcomes[1].severity, Severity::Critical);
    }

    #[test]
    fn test_gate_runs_before_rule() {
        let evaluator = ItemEvaluator::new(ItemRule::equals("status", "up"))
            .with_gate(RecordGate::new().require_description("description"));
        let outcomes = evaluator.evaluate_all(&interfaces());

        // eth1 has no description and produces no outcome at all
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.severity == Severity::Ok));
    }

    #[test]
    fn test_skip_overridden_by_include() {
        let evaluator = ItemEvaluator::new(ItemRule::equals("status", "up")).with_gate(
            RecordGate::new()
                .with_skip(["eth1"])
                .require_description("description")
                .with_include(["eth1"]),
        );
        let outcomes = evaluator.evaluate_all(&interfaces());

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].identity, "eth1");
        assert_eq!(outcomes[0].severity, Severity::Critical);
    }

    #[test]
    fn test_missing_field_produces_no_outcome() {
        let record = Record::new("eth9");
        assert!(evaluate(&record, &ItemRule::equals("status", "up")).is_none());
    }
}
