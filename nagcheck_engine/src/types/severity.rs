//! # Severity Scale
//!
//! The four-level monitoring status shared by every probe. Ordering follows
//! the exit-code value, so "worse" is always the numerically larger variant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monitoring status with a fixed exit-code mapping
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[default]
    Ok = 0,
    Warning = 1,
    Critical = 2,
    Unknown = 3,
}

impl Severity {
    /// All severities in ascending order
    pub const ALL: [Severity; 4] = [
        Severity::Ok,
        Severity::Warning,
        Severity::Critical,
        Severity::Unknown,
    ];

    /// Return the worse (numerically larger) of two severities
    pub fn worse_of(self, other: Severity) -> Severity {
        self.max(other)
    }

    /// Process exit code for this severity
    pub fn exit_code(self) -> i32 {
        self as i32
    }

    /// Upper-case label used in status lines
    pub fn label(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::Unknown => "UNKNOWN",
        }
    }

    /// Inverse of [`Severity::exit_code`]
    pub fn from_exit_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Severity::Ok),
            1 => Some(Severity::Warning),
            2 => Some(Severity::Critical),
            3 => Some(Severity::Unknown),
            _ => None,
        }
    }

    pub fn is_ok(self) -> bool {
        self == Severity::Ok
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fold a sequence of severities with [`Severity::worse_of`]; empty input is OK
pub fn worst_of<I>(severities: I) -> Severity
where
    I: IntoIterator<Item = Severity>,
{
    severities
        .into_iter()
        .fold(Severity::Ok, Severity::worse_of)
}
