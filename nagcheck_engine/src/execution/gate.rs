//! Presence gate applied to every record before rule evaluation
//!
//! Excluded records produce no outcome at all, which is different from an
//! OK outcome: they never count towards aggregation.

use crate::types::{FieldValue, Record};
use std::collections::BTreeSet;

/// Why a record was dropped by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    NotIncluded,
    Skipped,
    MissingDescription,
    Predicate,
}

impl Exclusion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exclusion::NotIncluded => "not in include set",
            Exclusion::Skipped => "in skip set",
            Exclusion::MissingDescription => "missing description",
            Exclusion::Predicate => "matched exclusion predicate",
        }
    }
}

/// Filter stage deciding which records are evaluated
///
/// An include set, when supplied, is the sole identity filter: the skip set
/// and the description requirement are bypassed for it. Exclusion predicates
/// apply in both modes.
#[derive(Debug, Clone, Default)]
pub struct RecordGate {
    skip: BTreeSet<String>,
    include: Option<BTreeSet<String>>,
    description_field: Option<String>,
    exclude_when: Vec<(String, FieldValue)>,
}

impl RecordGate {
    /// Gate that admits every record
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip<I, S>(mut self, skip: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip.extend(skip.into_iter().map(Into::into));
        self
    }

    /// Restrict evaluation to the named items
    pub fn with_include<I, S>(mut self, include: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(include.into_iter().map(Into::into).collect());
        self
    }

    /// Drop records whose `field` is absent, null or empty
    pub fn require_description(mut self, field: impl Into<String>) -> Self {
        self.description_field = Some(field.into());
        self
    }

    /// Drop records where `field` equals `value`
    pub fn exclude_when(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.exclude_when.push((field.into(), value.into()));
        self
    }

    pub fn admits(&self, record: &Record) -> bool {
        self.check(record).is_none()
    }

    /// Return the reason a record is excluded, or `None` if it is admitted
    pub fn check(&self, record: &Record) -> Option<Exclusion> {
        match &self.include {
            Some(include) => {
                if !include.contains(&record.identity) {
                    return Some(Exclusion::NotIncluded);
                }
            }
            None => {
                if self.skip.contains(&record.identity) {
                    return Some(Exclusion::Skipped);
                }
                if let Some(field) = &self.description_field {
                    if !has_description(record, field) {
                        return Some(Exclusion::MissingDescription);
                    }
                }
            }
        }

        let excluded = self.exclude_when.iter().any(|(field, value)| {
            record
                .get(field)
                .map(|actual| actual.matches(value))
                .unwrap_or(false)
        });

        if excluded {
            Some(Exclusion::Predicate)
        } else {
            None
        }
    }
}

fn has_description(record: &Record, field: &str) -> bool {
    match record.get(field) {
        None | Some(FieldValue::Null) => false,
        Some(FieldValue::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iface(name: &str, description: Option<&str>) -> Record {
        Record::new(name)
            .with_field("description", description)
            .with_field("interfaceStatus", "connected")
    }

    #[test]
    fn test_default_gate_admits_all() {
        let gate = RecordGate::new();
        assert!(gate.admits(&Record::new("anything")));
    }

    #[test]
    fn test_skip_set() {
        let gate = RecordGate::new().with_skip(["Ethernet2"]);
        assert!(gate.admits(&iface("Ethernet1", Some("a"))));
        assert_eq!(
            gate.check(&iface("Ethernet2", Some("b"))),
            Some(Exclusion::Skipped)
        );
    }

    #[test]
    fn test_description_gate() {
        let gate = RecordGate::new().require_description("description");
        assert!(gate.admits(&iface("Ethernet1", Some("uplink"))));
        assert_eq!(
            gate.check(&iface("Ethernet2", None)),
            Some(Exclusion::MissingDescription)
        );
        assert_eq!(
            gate.check(&iface("Ethernet3", Some(""))),
            Some(Exclusion::MissingDescription)
        );
        assert_eq!(
            gate.check(&Record::new("Ethernet4")),
            Some(Exclusion::MissingDescription)
        );
    }

    #[test]
    fn test_include_set_bypasses_skip_and_description() {
        let gate = RecordGate::new()
            .with_skip(["Ethernet1"])
            .require_description("description")
            .with_include(["Ethernet1", "Ethernet2"]);

        // Skipped and undescribed, but included
        assert!(gate.admits(&iface("Ethernet1", None)));
        assert!(gate.admits(&iface("Ethernet2", None)));
        assert_eq!(
            gate.check(&iface("Ethernet3", Some("c"))),
            Some(Exclusion::NotIncluded)
        );
    }

    #[test]
    fn test_exclusion_predicate_applies_with_include_set() {
        let gate = RecordGate::new()
            .exclude_when("interfaceStatus", "notconnect")
            .with_include(["Ethernet1"]);

        let record = Record::new("Ethernet1").with_field("interfaceStatus", "notconnect");
        assert_eq!(gate.check(&record), Some(Exclusion::Predicate));
    }
}
