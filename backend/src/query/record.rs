//! Uniform field access over the three record types.
//!
//! Predicates and sort keys address records through [`Field`], so one
//! evaluator serves pulsars, telescopes and observations alike.

use std::cmp::Ordering;

use crate::models::{Observation, Pulsar, Telescope};

/// Addressable record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Name,
    Ra,
    Dec,
    Pulsar,
    Telescope,
    Frequency,
    Project,
    Submitter,
    Backend,
    Receiver,
    Start,
    Stop,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Ra => "ra",
            Self::Dec => "dec",
            Self::Pulsar => "pulsar",
            Self::Telescope => "telescope",
            Self::Frequency => "frequency",
            Self::Project => "project",
            Self::Submitter => "submitter",
            Self::Backend => "backend",
            Self::Receiver => "receiver",
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

/// A borrowed field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
    /// Optional field not set, or field not present on this record type.
    Missing,
}

impl<'a> FieldValue<'a> {
    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Total order used for sorting: missing values first, then numbers, then text.
    pub fn total_cmp(&self, other: &FieldValue<'_>) -> Ordering {
        match (self, other) {
            (FieldValue::Missing, FieldValue::Missing) => Ordering::Equal,
            (FieldValue::Missing, _) => Ordering::Less,
            (_, FieldValue::Missing) => Ordering::Greater,
            (FieldValue::Number(a), FieldValue::Number(b)) => a.total_cmp(b),
            (FieldValue::Number(_), FieldValue::Text(_)) => Ordering::Less,
            (FieldValue::Text(_), FieldValue::Number(_)) => Ordering::Greater,
            (FieldValue::Text(a), FieldValue::Text(b)) => (**a).cmp(&**b),
        }
    }
}

/// Field access implemented by every queryable record.
pub trait Record {
    fn field(&self, field: Field) -> FieldValue<'_>;
}

fn optional_text(value: &Option<String>) -> FieldValue<'_> {
    value
        .as_deref()
        .map(FieldValue::Text)
        .unwrap_or(FieldValue::Missing)
}

impl Record for Observation {
    fn field(&self, field: Field) -> FieldValue<'_> {
        match field {
            Field::Id => FieldValue::Number(self.id.value() as f64),
            Field::Pulsar => FieldValue::Text(&self.pulsar),
            Field::Telescope => FieldValue::Text(&self.telescope),
            Field::Frequency => FieldValue::Number(self.frequency.value()),
            Field::Project => FieldValue::Text(&self.project),
            Field::Submitter => FieldValue::Text(&self.submitter),
            Field::Backend => optional_text(&self.backend),
            Field::Receiver => optional_text(&self.receiver),
            Field::Start => FieldValue::Number(self.start.value()),
            Field::Stop => FieldValue::Number(self.stop.value()),
            Field::Name | Field::Ra | Field::Dec => FieldValue::Missing,
        }
    }
}

impl Record for Pulsar {
    fn field(&self, field: Field) -> FieldValue<'_> {
        match field {
            Field::Name => FieldValue::Text(&self.name),
            Field::Ra => FieldValue::Number(self.ra.value()),
            Field::Dec => FieldValue::Number(self.dec.value()),
            _ => FieldValue::Missing,
        }
    }
}

impl Record for Telescope {
    fn field(&self, field: Field) -> FieldValue<'_> {
        match field {
            Field::Name => FieldValue::Text(&self.name),
            _ => FieldValue::Missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sorts_first() {
        assert_eq!(
            FieldValue::Missing.total_cmp(&FieldValue::Text("GUPPI")),
            Ordering::Less
        );
        assert_eq!(
            FieldValue::Number(2.0).total_cmp(&FieldValue::Number(1.0)),
            Ordering::Greater
        );
        assert_eq!(
            FieldValue::Text("AO").total_cmp(&FieldValue::Text("GBT")),
            Ordering::Less
        );
    }

    #[test]
    fn test_text_values_from_different_records_compare() {
        let a = Telescope::new("Arecibo");
        let b = Telescope::new("VLA");
        let lhs = a.field(Field::Name);
        let ordering = {
            let rhs = b.field(Field::Name);
            lhs.total_cmp(&rhs)
        };
        assert_eq!(ordering, Ordering::Less);
        assert_eq!(
            b.field(Field::Name).total_cmp(&a.field(Field::Name)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_pulsar_fields() {
        let psr = Pulsar::new("J0406+30", qtty::Degrees::new(61.7), qtty::Degrees::new(30.6));
        assert_eq!(psr.field(Field::Name).as_text(), Some("J0406+30"));
        assert_eq!(psr.field(Field::Dec).as_number(), Some(30.6));
        assert_eq!(psr.field(Field::Frequency), FieldValue::Missing);
    }
}
