//! # Snapshot Change Detection
//!
//! Persists the facts of the current run next to the previous run's facts
//! and reports whether they changed. A check whose facts stop changing is
//! treated as stuck.

pub mod error;
pub mod store;

pub use error::SnapshotError;
pub use store::{SnapshotState, SnapshotStore};
