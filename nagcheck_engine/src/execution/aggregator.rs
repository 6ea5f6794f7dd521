//! # Aggregation
//!
//! Reduces per-item outcomes to one overall severity. The ordered list of
//! failing outcomes is part of the result so callers can report it.

use crate::execution::threshold::Threshold;
use crate::types::{worst_of, EvaluationOutcome, Severity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Most severe outcome wins; OK when nothing was evaluated
    WorstOfN,

    /// Classify the number of non-OK outcomes against the threshold
    CountThreshold(Threshold),
}

/// Overall verdict for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub severity: Severity,

    /// Number of outcomes that took part
    pub evaluated: usize,

    /// Non-OK outcomes in evaluation order
    pub failing: Vec<EvaluationOutcome>,
}

impl Aggregation {
    pub fn failed_count(&self) -> usize {
        self.failing.len()
    }

    pub fn all_passed(&self) -> bool {
        self.failing.is_empty()
    }
}

pub fn aggregate(outcomes: Vec<EvaluationOutcome>, mode: AggregationMode) -> Aggregation {
    let evaluated = outcomes.len();

    let severity = match mode {
        AggregationMode::WorstOfN => worst_of(outcomes.iter().map(|o| o.severity)),
        AggregationMode::CountThreshold(threshold) => {
            let failed = outcomes.iter().filter(|o| o.is_failure()).count();
            threshold.classify(failed as f64)
        }
    };

    let failing = outcomes.into_iter().filter(|o| o.is_failure()).collect();

    Aggregation {
        severity,
        evaluated,
        failing,
    }
}
