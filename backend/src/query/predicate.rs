//! Compiled predicate clauses.
//!
//! These are the primitives the storage collaborator understands: set
//! membership (which covers equality), inclusive numeric ranges, interval
//! overlap against an observation window, and substring match.

use std::collections::BTreeSet;

use super::record::{Field, Record};
use crate::models::ModifiedJulianDate;

/// A single filter condition. A query is the logical AND of its predicates.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Text field equals one of `values`. An empty set never matches.
    OneOf {
        field: Field,
        values: BTreeSet<String>,
    },
    /// Numeric field within inclusive bounds; `None` leaves that side open.
    Range {
        field: Field,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// The record's `[start, stop]` window intersects `[lower, upper]`.
    Overlaps {
        lower: Option<ModifiedJulianDate>,
        upper: Option<ModifiedJulianDate>,
    },
    /// Text field contains `needle` (case-sensitive).
    Contains { field: Field, needle: String },
}

impl Predicate {
    pub fn one_of<I, S>(field: Field, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf {
            field,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this predicate can never be satisfied.
    pub fn is_unsatisfiable(&self) -> bool {
        match self {
            Self::OneOf { values, .. } => values.is_empty(),
            Self::Range {
                min: Some(min),
                max: Some(max),
                ..
            } => min > max,
            _ => false,
        }
    }

    /// Evaluate against a record.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        match self {
            Self::OneOf { field, values } => record
                .field(*field)
                .as_text()
                .is_some_and(|v| values.contains(v)),
            Self::Range { field, min, max } => {
                record.field(*field).as_number().is_some_and(|v| {
                    min.map_or(true, |lo| v >= lo) && max.map_or(true, |hi| v <= hi)
                })
            }
            Self::Overlaps { lower, upper } => {
                let (Some(start), Some(stop)) = (
                    record.field(Field::Start).as_number(),
                    record.field(Field::Stop).as_number(),
                ) else {
                    return false;
                };
                // Disjoint only when the window ends before `lower` or starts after `upper`.
                lower.map_or(true, |lo| stop >= lo.value())
                    && upper.map_or(true, |hi| start <= hi.value())
            }
            Self::Contains { field, needle } => record
                .field(*field)
                .as_text()
                .is_some_and(|v| v.contains(needle.as_str())),
        }
    }
}

/// Whether a record satisfies every predicate.
pub fn matches_all<R: Record + ?Sized>(predicates: &[Predicate], record: &R) -> bool {
    predicates.iter().all(|p| p.matches(record))
}
