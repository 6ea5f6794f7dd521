//! # Threshold Classification
//!
//! Maps a scalar or count against critical/warning bounds. Bound ordering is
//! not validated: a critical bound below the warning bound simply makes the
//! warning branch unreachable.

use crate::types::Severity;
use serde::{Deserialize, Serialize};

/// Classify `value` against the bounds, first match wins
///
/// 1. `value >= critical_bound` -> CRITICAL
/// 2. `value >= warning_bound`  -> WARNING
/// 3. otherwise                 -> OK
///
/// Never returns UNKNOWN. NaN compares false against both bounds and so
/// classifies as OK.
pub fn classify(value: f64, critical_bound: f64, warning_bound: f64) -> Severity {
    if value >= critical_bound {
        Severity::Critical
    } else if value >= warning_bound {
        Severity::Warning
    } else {
        Severity::Ok
    }
}

/// Critical/warning bound pair supplied once per invocation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub critical: f64,
    pub warning: f64,
}

impl Threshold {
    pub fn new(critical: f64, warning: f64) -> Self {
        Self { critical, warning }
    }

    pub fn classify(&self, value: f64) -> Severity {
        classify(value, self.critical, self.warning)
    }

    /// True when the warning band can never be reached
    pub fn is_inverted(&self) -> bool {
        self.critical < self.warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bands() {
        assert_eq!(classify(10.0, 10.0, 5.0), Severity::Critical);
        assert_eq!(classify(11.0, 10.0, 5.0), Severity::Critical);
        assert_eq!(classify(5.0, 10.0, 5.0), Severity::Warning);
        assert_eq!(classify(9.99, 10.0, 5.0), Severity::Warning);
        assert_eq!(classify(4.0, 10.0, 5.0), Severity::Ok);
    }

    #[test]
    fn test_inverted_bounds_skip_warning() {
        let threshold = Threshold::new(3.0, 8.0);
        assert!(threshold.is_inverted());

        // Critical is checked first, so values in [3, 8) never reach WARNING
        assert_eq!(threshold.classify(5.0), Severity::Critical);
        assert_eq!(threshold.classify(9.0), Severity::Critical);
        assert_eq!(threshold.classify(2.0), Severity::Ok);
    }

    #[test]
    fn test_equal_bounds() {
        let threshold = Threshold::new(48.0, 48.0);
        assert!(!threshold.is_inverted());
        assert_eq!(threshold.classify(47.9), Severity::Ok);
        assert_eq!(threshold.classify(48.0), Severity::Critical);
    }

    #[test]
    fn test_nan_is_ok() {
        assert_eq!(classify(f64::NAN, 1.0, 0.0), Severity::Ok);
    }
}
