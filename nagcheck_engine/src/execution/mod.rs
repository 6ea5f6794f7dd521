pub mod aggregator;
pub mod evaluator;
pub mod gate;
pub mod rules;
pub mod threshold;

// Classification and aggregation
pub use aggregator::{aggregate, Aggregation, AggregationMode};
pub use threshold::{classify, Threshold};
// Per-item evaluation
pub use evaluator::{evaluate, ItemEvaluator};
pub use gate::{Exclusion, RecordGate};
pub use rules::ItemRule;
