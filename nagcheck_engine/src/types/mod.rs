//! # Core Types
//!
//! Severity scale, decoded records and per-item outcomes.

pub mod outcome;
pub mod record;
pub mod severity;

pub use outcome::EvaluationOutcome;
pub use record::{FieldValue, Record};
pub use severity::{worst_of, Severity};
