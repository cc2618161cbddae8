//! Sort specifications and the stable sort applied to result rows.

use std::cmp::Ordering;

use super::record::{Field, Record};
use super::vocabulary::sort_keys_for;
use crate::error::{PulsarDbError, PulsarDbResult};
use crate::models::EntityKind;

/// Sort key plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: Field,
    pub descending: bool,
}

impl SortSpec {
    pub fn ascending(key: Field) -> Self {
        Self {
            key,
            descending: false,
        }
    }

    /// Default order when no `sort` is given: record id for observations,
    /// canonical name for the catalogs.
    pub fn default_for(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Observation => Self::ascending(Field::Id),
            EntityKind::Pulsar | EntityKind::Telescope => Self::ascending(Field::Name),
        }
    }

    /// Parse `key` or `-key` against the keys accepted for `kind`.
    pub fn parse(kind: EntityKind, raw: &str) -> PulsarDbResult<Self> {
        let raw = raw.trim();
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let key = sort_keys_for(kind)
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, field)| *field)
            .ok_or_else(|| {
                let accepted: Vec<&str> = sort_keys_for(kind).iter().map(|(k, _)| *k).collect();
                PulsarDbError::invalid_parameter(format!(
                    "cannot sort {} records by '{}' (accepted: {})",
                    kind,
                    name,
                    accepted.join(", ")
                ))
            })?;
        Ok(Self { key, descending })
    }

    pub fn compare<R: Record + ?Sized>(&self, a: &R, b: &R) -> Ordering {
        let ord = a.field(self.key).total_cmp(&b.field(self.key));
        if self.descending {
            ord.reverse()
        } else {
            ord
        }
    }

    /// Stable in-place sort: rows with equal keys keep their input order.
    pub fn apply<R: Record>(&self, rows: &mut [R]) {
        rows.sort_by(|a, b| self.compare(a, b));
    }
}
