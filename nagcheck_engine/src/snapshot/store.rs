// snapshot/store.rs

use crate::snapshot::error::SnapshotError;
use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CURRENT_SUFFIX: &str = "current";
const PREVIOUS_SUFFIX: &str = "old";

/// Result of comparing this run's facts with the previous run's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotState {
    /// First run for this check, nothing to compare against yet
    NoBaseline,
    /// A current snapshot existed but its rotated copy is gone
    NoPrevious,
    /// Facts are byte-identical to the previous run
    Unchanged,
    Changed,
}

impl SnapshotState {
    pub fn severity(&self) -> Severity {
        match self {
            SnapshotState::NoBaseline | SnapshotState::NoPrevious => Severity::Unknown,
            SnapshotState::Unchanged => Severity::Critical,
            SnapshotState::Changed => Severity::Ok,
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            SnapshotState::NoBaseline => "First run, waiting to create history",
            SnapshotState::NoPrevious => "Previous snapshot missing, waiting to create history",
            SnapshotState::Unchanged => "Entries haven't changed",
            SnapshotState::Changed => "Entries have changed",
        }
    }
}

/// Two-file snapshot store, one pair per check name
///
/// Layout is `<dir>/<check>.current` and `<dir>/<check>.old`, newline
/// delimited with no header. Rotation renames `current` over `old` and then
/// writes the new `current`. The sequence is not crash-atomic: a crash
/// between the rename and the write leaves only `old`, and the next run
/// reports `NoBaseline`. Concurrent runs of the same check are not
/// supported.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn current_path(&self, check: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", check, CURRENT_SUFFIX))
    }

    pub fn previous_path(&self, check: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", check, PREVIOUS_SUFFIX))
    }

    /// Rotate, persist `facts` and compare against the previous run
    pub fn record_run<I, S>(&self, check: &str, facts: I) -> Result<SnapshotState, SnapshotError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        validate_check_name(check)?;

        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|source| SnapshotError::DirectoryCreation {
                path: self.dir.clone(),
                source,
            })?;
        }

        let current = self.current_path(check);
        let previous = self.previous_path(check);

        let had_current = current.is_file();
        if had_current {
            log::debug!(
                "Rotating snapshot {} -> {}",
                current.display(),
                previous.display()
            );
            fs::rename(&current, &previous).map_err(|source| SnapshotError::RotationFailed {
                path: previous.clone(),
                source,
            })?;
        }

        let body = facts
            .into_iter()
            .map(|f| f.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");

        fs::write(&current, body.as_bytes()).map_err(|source| SnapshotError::WriteFailed {
            path: current.clone(),
            source,
        })?;

        if !had_current {
            log::debug!("No baseline for '{}' yet", check);
            return Ok(SnapshotState::NoBaseline);
        }
        if !previous.is_file() {
            return Ok(SnapshotState::NoPrevious);
        }

        let old_bytes = fs::read(&previous).map_err(|source| SnapshotError::ReadFailed {
            path: previous.clone(),
            source,
        })?;

        if old_bytes == body.as_bytes() {
            Ok(SnapshotState::Unchanged)
        } else {
            Ok(SnapshotState::Changed)
        }
    }
}

fn validate_check_name(check: &str) -> Result<(), SnapshotError> {
    let valid = !check.is_empty()
        && check != "."
        && check != ".."
        && !check.contains(|c| c == '/' || c == '\\' || c == '\0');

    if valid {
        Ok(())
    } else {
        Err(SnapshotError::InvalidCheckName {
            name: check.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    #[test]
    fn test_first_run_has_no_baseline() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());

        let state = store.record_run("dumbno", ["acl1 - deny ip any any"]).unwrap();
        assert_eq!(state, SnapshotState::NoBaseline);
        assert_eq!(state.severity(), Severity::Unknown);

        let written = fs::read_to_string(store.current_path("dumbno")).unwrap();
        assert_eq!(written, "acl1 - deny ip any any");
    }

    #[test]
    fn test_unchanged_is_critical() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        let facts = ["a - deny 1", "a - deny 2"];

        store.record_run("dumbno", facts).unwrap();
        let state = store.record_run("dumbno", facts).unwrap();

        assert_eq!(state, SnapshotState::Unchanged);
        assert_eq!(state.severity(), Severity::Critical);
    }

    #[test]
    fn test_changed_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());

        store.record_run("link", ["Ethernet1 1700000000.1"]).unwrap();
        let state = store.record_run("link", ["Ethernet1 1700000900.4"]).unwrap();

        assert_eq!(state, SnapshotState::Changed);
        assert_eq!(state.severity(), Severity::Ok);

        let old = fs::read_to_string(store.previous_path("link")).unwrap();
        assert_eq!(old, "Ethernet1 1700000000.1");
    }

    #[test]
    fn test_missing_previous() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());

        store.record_run("link", ["x"]).unwrap();
        store.record_run("link", ["y"]).unwrap();
        fs::remove_file(store.previous_path("link")).unwrap();

        // Rotation recreates `old` from the existing current
        let state = store.record_run("link", ["z"]).unwrap();
        assert_eq!(state, SnapshotState::Changed);
    }

    #[test]
    fn test_empty_facts_compare_equal() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());

        store.record_run("dumbno", Vec::<String>::new()).unwrap();
        let state = store.record_run("dumbno", Vec::<String>::new()).unwrap();
        assert_eq!(state, SnapshotState::Unchanged);
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("state").join("nagcheck");
        let store = SnapshotStore::new(&nested);

        store.record_run("dumbno", ["x"]).unwrap();
        assert!(nested.join("dumbno.current").is_file());
    }

    #[test]
    fn test_write_failure_is_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "file").unwrap();

        let store = SnapshotStore::new(&blocker);
        let result = store.record_run("dumbno", ["x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_path_like_names() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());

        assert_matches!(
            store.record_run("../escape", ["x"]),
            Err(SnapshotError::InvalidCheckName { .. })
        );
        assert_matches!(
            store.record_run("", ["x"]),
            Err(SnapshotError::InvalidCheckName { .. })
        );
    }
}
