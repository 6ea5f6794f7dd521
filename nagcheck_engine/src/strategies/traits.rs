// src/strategies/traits.rs
//! Collection traits implemented by backend adapters
//!
//! Adapters own transport, authentication and payload decoding. The engine
//! only ever sees the decoded records.

use crate::strategies::errors::CollectionError;
use crate::types::Record;

// ============================================================================
// Data Collection Traits
// ============================================================================

/// Source of per-item records for one check run
pub trait RecordCollector {
    /// Stable identifier used in log lines
    fn collector_id(&self) -> &str;

    /// Fetch every record for this run
    ///
    /// Records are returned fully in memory. Ordering is not significant;
    /// the evaluator sorts by identity.
    fn collect(&self) -> Result<Vec<Record>, CollectionError>;
}

/// Source of snapshot facts for change-detection checks
pub trait FactCollector {
    fn collector_id(&self) -> &str;

    /// Facts in the order they should be persisted
    fn collect_facts(&self) -> Result<Vec<String>, CollectionError>;
}
