//! Whitelisted command executors for command-backed probes

pub mod ossec;

pub use ossec::create_ossec_command_executor;
