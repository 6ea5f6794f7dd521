// snapshot/error.rs

use std::path::PathBuf;

/// Snapshot persistence errors
///
/// Any of these is fatal for the run: the caller reports UNKNOWN and stops.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Invalid check name '{name}' for snapshot storage")]
    InvalidCheckName { name: String },

    #[error("Failed to create snapshot directory '{}': {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to rotate snapshot '{}': {source}", path.display())]
    RotationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write snapshot '{}': {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read snapshot '{}': {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SnapshotError {
    /// Short message suitable for the status line
    pub fn user_message(&self) -> String {
        match self {
            SnapshotError::InvalidCheckName { name } => {
                format!("invalid check name '{}'", name)
            }
            SnapshotError::DirectoryCreation { path, .. } => {
                format!("cannot create state directory {}", path.display())
            }
            SnapshotError::RotationFailed { path, .. }
            | SnapshotError::WriteFailed { path, .. } => {
                format!("cannot write to {}", path.display())
            }
            SnapshotError::ReadFailed { path, .. } => {
                format!("cannot read {}", path.display())
            }
        }
    }
}
