//! OSSEC command executor configuration

use crate::collectors::ossec::{AGENT_CONTROL, OSSEC_CONTROL};
use nagcheck_engine::strategies::SystemCommandExecutor;
use std::path::Path;
use std::time::Duration;

/// Executor allowed to run only the OSSEC control binaries under `root`
///
/// Whitelist includes:
/// - `bin/agent_control`: agent connection state
/// - `bin/ossec-control`: server service state
pub fn create_ossec_command_executor(root: &Path, timeout: Duration) -> SystemCommandExecutor {
    SystemCommandExecutor::with_timeout(timeout).allowing([
        root.join(AGENT_CONTROL).to_string_lossy().to_string(),
        root.join(OSSEC_CONTROL).to_string_lossy().to_string(),
    ])
}
