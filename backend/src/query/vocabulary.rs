//! Per-entity parameter vocabularies.
//!
//! Every accepted query parameter is listed here together with the way it is
//! matched. Singular `pulsar`/`telescope` go through the alias index while the
//! plural and free-text parameters compare raw stored values; keeping that
//! asymmetry in one table makes it explicit.

use super::record::Field;
use crate::models::{CatalogKind, EntityKind};

/// Which end of an interval a bound parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Lower,
    Upper,
}

/// How a parameter's value turns into a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Each value resolved through the alias index to a canonical name.
    AliasExact { catalog: CatalogKind, field: Field },
    /// Canonical names containing the value; aliases are not consulted.
    CanonicalSubstring { catalog: CatalogKind, field: Field },
    /// Values compared verbatim against the stored field, OR-ed together.
    RawMembership { field: Field },
    /// One end of the overlap window against `[start, stop]`.
    TimeOverlap { bound: Bound },
    /// One inclusive end of the frequency range.
    FrequencyRange { bound: Bound },
    /// Sort key, optionally `-`-prefixed for descending.
    Sort,
}

/// A named parameter and its matching mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub mode: MatchMode,
}

const fn spec(name: &'static str, mode: MatchMode) -> ParamSpec {
    ParamSpec { name, mode }
}

pub const OBSERVATION_PARAMS: &[ParamSpec] = &[
    spec(
        "pulsar",
        MatchMode::AliasExact {
            catalog: CatalogKind::Pulsar,
            field: Field::Pulsar,
        },
    ),
    spec(
        "pulsar_contains",
        MatchMode::CanonicalSubstring {
            catalog: CatalogKind::Pulsar,
            field: Field::Pulsar,
        },
    ),
    spec(
        "project",
        MatchMode::RawMembership {
            field: Field::Project,
        },
    ),
    spec("min_time", MatchMode::TimeOverlap { bound: Bound::Lower }),
    spec("max_time", MatchMode::TimeOverlap { bound: Bound::Upper }),
    spec(
        "min_frequency",
        MatchMode::FrequencyRange { bound: Bound::Lower },
    ),
    spec(
        "max_frequency",
        MatchMode::FrequencyRange { bound: Bound::Upper },
    ),
    spec(
        "backend",
        MatchMode::RawMembership {
            field: Field::Backend,
        },
    ),
    spec(
        "receiver",
        MatchMode::RawMembership {
            field: Field::Receiver,
        },
    ),
    spec(
        "telescope",
        MatchMode::AliasExact {
            catalog: CatalogKind::Telescope,
            field: Field::Telescope,
        },
    ),
    spec(
        "telescopes",
        MatchMode::RawMembership {
            field: Field::Telescope,
        },
    ),
    spec("sort", MatchMode::Sort),
];

pub const PULSAR_PARAMS: &[ParamSpec] = &[
    spec(
        "name",
        MatchMode::AliasExact {
            catalog: CatalogKind::Pulsar,
            field: Field::Name,
        },
    ),
    spec(
        "name_contains",
        MatchMode::CanonicalSubstring {
            catalog: CatalogKind::Pulsar,
            field: Field::Name,
        },
    ),
    spec("sort", MatchMode::Sort),
];

pub const TELESCOPE_PARAMS: &[ParamSpec] = &[
    spec(
        "name",
        MatchMode::AliasExact {
            catalog: CatalogKind::Telescope,
            field: Field::Name,
        },
    ),
    spec("sort", MatchMode::Sort),
];

pub const OBSERVATION_SORT_KEYS: &[(&str, Field)] = &[
    ("frequency", Field::Frequency),
    ("pulsar", Field::Pulsar),
    ("telescope", Field::Telescope),
    ("project", Field::Project),
    ("submitter", Field::Submitter),
    ("start", Field::Start),
    ("stop", Field::Stop),
];

pub const PULSAR_SORT_KEYS: &[(&str, Field)] =
    &[("name", Field::Name), ("ra", Field::Ra), ("dec", Field::Dec)];

pub const TELESCOPE_SORT_KEYS: &[(&str, Field)] = &[("name", Field::Name)];

/// Parameter table for an entity type, in predicate emission order.
pub fn params_for(kind: EntityKind) -> &'static [ParamSpec] {
    match kind {
        EntityKind::Observation => OBSERVATION_PARAMS,
        EntityKind::Pulsar => PULSAR_PARAMS,
        EntityKind::Telescope => TELESCOPE_PARAMS,
    }
}

pub fn sort_keys_for(kind: EntityKind) -> &'static [(&'static str, Field)] {
    match kind {
        EntityKind::Observation => OBSERVATION_SORT_KEYS,
        EntityKind::Pulsar => PULSAR_SORT_KEYS,
        EntityKind::Telescope => TELESCOPE_SORT_KEYS,
    }
}

/// Matching mode of `name` for `kind`, if the parameter is recognized.
pub fn lookup(kind: EntityKind, name: &str) -> Option<MatchMode> {
    params_for(kind)
        .iter()
        .find(|p| p.name == name)
        .map(|p| p.mode)
}
