//! # nagcheck SDK - Monitoring Probes
//!
//! Backend adapters and check wiring for the `nagcheck` binary:
//! Arista switches over eAPI, CrashPlan backup reports and OSSEC servers.
//! Evaluation itself lives in `nagcheck_engine`.

pub mod checks;
pub mod cli;
pub mod collectors;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;

pub use checks::ItemSelection;
pub use config::ProbeConfig;
pub use credentials::Credentials;
pub use error::ProbeError;
