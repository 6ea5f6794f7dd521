//! # Check Results
//!
//! Report types handed from the engine to the CLI.
//!
//! ## Core Types
//! - [`CheckReport`] - Overall verdict, summary line and failing item lines
//! - [`HostContext`] - Host the probe ran on

pub mod types;

pub use types::*;
