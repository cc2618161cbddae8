//! Turns a parameter bag into predicates plus a sort specification.

use super::params::Params;
use super::predicate::Predicate;
use super::resolver::{AliasResolver, ResolveMode};
use super::sort::SortSpec;
use super::vocabulary::{params_for, Bound, MatchMode};
use super::record::Field;
use crate::db::repository::FullRepository;
use crate::error::{PulsarDbError, PulsarDbResult};
use crate::models::EntityKind;

/// The compiled form of one query: AND of `predicates`, ordered by `sort`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub kind: EntityKind,
    pub predicates: Vec<Predicate>,
    pub sort: SortSpec,
}

impl CompiledQuery {
    /// Query with no predicates and the default order.
    pub fn unfiltered(kind: EntityKind) -> Self {
        Self {
            kind,
            predicates: Vec::new(),
            sort: SortSpec::default_for(kind),
        }
    }

    /// True when some predicate can never match, so execution can skip the store.
    pub fn is_unsatisfiable(&self) -> bool {
        self.predicates.iter().any(Predicate::is_unsatisfiable)
    }
}

/// Compiles parameters for one entity type using the matching-mode tables.
pub struct FilterCompiler<'a> {
    resolver: AliasResolver<'a>,
}

impl<'a> FilterCompiler<'a> {
    pub fn new(repository: &'a dyn FullRepository) -> Self {
        Self {
            resolver: AliasResolver::new(repository),
        }
    }

    /// Compile `params` for `kind`.
    ///
    /// Predicates come out in the order of the entity's parameter table, one
    /// per recognized parameter.
    ///
    /// # Errors
    /// * [`PulsarDbError::InvalidParameter`] - Unrecognized parameter or sort key
    /// * [`PulsarDbError::Validation`] - Malformed time, frequency or value shape
    pub async fn compile(&self, kind: EntityKind, params: &Params) -> PulsarDbResult<CompiledQuery> {
        let table = params_for(kind);
        let unknown: Vec<&str> = params
            .keys()
            .filter(|key| !table.iter().any(|spec| spec.name == *key))
            .collect();
        if !unknown.is_empty() {
            let accepted: Vec<&str> = table.iter().map(|spec| spec.name).collect();
            return Err(PulsarDbError::invalid_parameter(format!(
                "unrecognized {} parameter(s): {} (accepted: {})",
                kind,
                unknown.join(", "),
                accepted.join(", ")
            )));
        }

        let mut query = CompiledQuery::unfiltered(kind);
        for spec in table.iter().filter(|spec| params.contains(spec.name)) {
            match spec.mode {
                MatchMode::Sort => {
                    let raw = params.text(spec.name)?.unwrap_or_default();
                    query.sort = SortSpec::parse(kind, &raw)?;
                }
                mode => {
                    let predicate = self.predicate_for(spec.name, mode, params).await?;
                    query.predicates.push(predicate);
                }
            }
        }

        log::debug!(
            "Compiled {} query: {} predicate(s), sort by {}{}",
            kind,
            query.predicates.len(),
            if query.sort.descending { "-" } else { "" },
            query.sort.key.as_str()
        );
        Ok(query)
    }

    async fn predicate_for(
        &self,
        name: &str,
        mode: MatchMode,
        params: &Params,
    ) -> PulsarDbResult<Predicate> {
        let predicate = match mode {
            MatchMode::AliasExact { catalog, field } => {
                let names = params.list(name)?.unwrap_or_default();
                let values = self
                    .resolver
                    .resolve_all(catalog, &names, ResolveMode::Exact)
                    .await?;
                Predicate::OneOf { field, values }
            }
            MatchMode::CanonicalSubstring { catalog, field } => {
                let needle = params.text(name)?.unwrap_or_default();
                let values = self
                    .resolver
                    .resolve(catalog, &needle, ResolveMode::Substring)
                    .await?;
                Predicate::OneOf { field, values }
            }
            MatchMode::RawMembership { field } => {
                Predicate::one_of(field, params.list(name)?.unwrap_or_default())
            }
            MatchMode::TimeOverlap { bound } => {
                let at = params.time(name)?;
                match bound {
                    Bound::Lower => Predicate::Overlaps {
                        lower: at,
                        upper: None,
                    },
                    Bound::Upper => Predicate::Overlaps {
                        lower: None,
                        upper: at,
                    },
                }
            }
            MatchMode::FrequencyRange { bound } => {
                let at = params.frequency(name)?.map(|f| f.value());
                let (min, max) = match bound {
                    Bound::Lower => (at, None),
                    Bound::Upper => (None, at),
                };
                Predicate::Range {
                    field: Field::Frequency,
                    min,
                    max,
                }
            }
            MatchMode::Sort => {
                return Err(PulsarDbError::invalid_parameter(format!(
                    "'{}' is not a filter parameter",
                    name
                )))
            }
        };
        Ok(predicate)
    }
}
