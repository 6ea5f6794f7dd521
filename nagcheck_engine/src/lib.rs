//! # nagcheck engine - Check Evaluation Core
//!
//! Turns backend records into a single monitoring verdict: per-item rules
//! behind a presence gate, threshold classification, worst-of-N or count
//! aggregation, and snapshot change detection for "stuck" checks.

pub mod execution;
pub mod results;
pub mod snapshot;
pub mod strategies;
pub mod types;

pub mod prelude {
    pub use crate::execution::{
        aggregate, classify, evaluate, Aggregation, AggregationMode, Exclusion, ItemEvaluator,
        ItemRule, RecordGate, Threshold,
    };

    pub use crate::results::{CheckReport, HostContext};
    pub use crate::snapshot::{SnapshotError, SnapshotState, SnapshotStore};

    pub use crate::strategies::{
        CollectionError, CommandError, CommandOutput, FactCollector, RecordCollector,
        SystemCommandExecutor,
    };

    pub use crate::types::{worst_of, EvaluationOutcome, FieldValue, Record, Severity};
}
