//! Per-item acceptance rules
//!
//! A rule addresses one or more record fields. A record missing an addressed
//! field is outside the rule's reach and produces no outcome.

use crate::execution::threshold::Threshold;
use crate::types::{EvaluationOutcome, FieldValue, Record, Severity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ItemRule {
    /// OK when the field value is in `allowed`, CRITICAL otherwise
    Membership {
        field: String,
        allowed: Vec<FieldValue>,
    },

    /// CRITICAL when the numeric field is below `minimum`; `scale` only
    /// affects the displayed values
    Floor {
        field: String,
        minimum: f64,
        scale: f64,
        unit: String,
    },

    /// Classify `value * scale` against the threshold; null is UNKNOWN
    Ceiling {
        field: String,
        threshold: Threshold,
        scale: f64,
        unit: String,
    },

    /// CRITICAL when every listed numeric field is zero
    Idle { fields: Vec<String> },
}

impl ItemRule {
    pub fn membership<I, V>(field: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        ItemRule::Membership {
            field: field.into(),
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// String equality as a single-element membership
    pub fn equals(field: impl Into<String>, expected: impl Into<FieldValue>) -> Self {
        ItemRule::Membership {
            field: field.into(),
            allowed: vec![expected.into()],
        }
    }

    pub fn floor(field: impl Into<String>, minimum: f64) -> Self {
        ItemRule::Floor {
            field: field.into(),
            minimum,
            scale: 1.0,
            unit: String::new(),
        }
    }

    pub fn ceiling(field: impl Into<String>, threshold: Threshold) -> Self {
        ItemRule::Ceiling {
            field: field.into(),
            threshold,
            scale: 1.0,
            unit: String::new(),
        }
    }

    /// Set the scale and unit of a floor or ceiling rule; no-op otherwise
    ///
    /// A ceiling classifies the scaled value. A floor compares the raw value
    /// and only scales what it prints.
    pub fn scaled(mut self, factor: f64, display_unit: impl Into<String>) -> Self {
        match &mut self {
            ItemRule::Ceiling { scale, unit, .. } | ItemRule::Floor { scale, unit, .. } => {
                *scale = factor;
                *unit = display_unit.into();
            }
            ItemRule::Membership { .. } | ItemRule::Idle { .. } => {}
        }
        self
    }

    pub fn idle<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ItemRule::Idle {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Evaluate one record; `None` when the rule does not apply
    pub fn evaluate(&self, record: &Record) -> Option<EvaluationOutcome> {
        match self {
            ItemRule::Membership { field, allowed } => {
                let actual = record.get(field)?;
                let severity = if allowed.iter().any(|v| actual.matches(v)) {
                    Severity::Ok
                } else {
                    Severity::Critical
                };
                Some(EvaluationOutcome::new(
                    &record.identity,
                    severity,
                    format!("{}: {}", field, actual),
                ))
            }

            ItemRule::Floor {
                field,
                minimum,
                scale,
                unit,
            } => {
                let actual = record.get(field)?.as_f64()?;
                let severity = if actual < *minimum {
                    Severity::Critical
                } else {
                    Severity::Ok
                };
                let detail = if unit.is_empty() {
                    format!("{}: {} (minimum {})", field, actual, minimum)
                } else {
                    format!(
                        "{}: {:.2} {} (minimum {:.2} {})",
                        field,
                        actual * scale,
                        unit,
                        minimum * scale,
                        unit
                    )
                };
                Some(EvaluationOutcome::new(&record.identity, severity, detail))
            }

            ItemRule::Ceiling {
                field,
                threshold,
                scale,
                unit,
            } => match record.get(field)? {
                FieldValue::Null => Some(EvaluationOutcome::new(
                    &record.identity,
                    Severity::Unknown,
                    format!("{}: unknown", field),
                )),
                value => {
                    let scaled = value.as_f64()? * scale;
                    let detail = if unit.is_empty() {
                        format!("{}: {:.2}", field, scaled)
                    } else {
                        format!("{}: {:.2} {}", field, scaled, unit)
                    };
                    Some(EvaluationOutcome::new(
                        &record.identity,
                        threshold.classify(scaled),
                        detail,
                    ))
                }
            },

            ItemRule::Idle { fields } => {
                let mut values = Vec::with_capacity(fields.len());
                for field in fields {
                    values.push((field, record.get(field)?.as_f64()?));
                }

                let idle = values.iter().all(|(_, v)| *v == 0.0);
                let detail = values
                    .iter()
                    .map(|(f, v)| format!("{}: {}", f, v))
                    .collect::<Vec<_>>()
                    .join(", ");

                Some(EvaluationOutcome::new(
                    &record.identity,
                    if idle {
                        Severity::Critical
                    } else {
                        Severity::Ok
                    },
                    detail,
                ))
            }
        }
    }
}
