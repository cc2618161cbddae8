//! Name-to-canonical-identifier resolution for pulsars and telescopes.

use std::collections::BTreeSet;

use super::predicate::Predicate;
use super::record::Field;
use crate::db::repository::{CatalogRepository, FullRepository};
use crate::error::PulsarDbResult;
use crate::models::CatalogKind;

/// How a name is matched against a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Canonical name or any alias, compared exactly. At most one match.
    Exact,
    /// Canonical names containing the value. Aliases are ignored.
    Substring,
}

/// Resolves user-supplied names to canonical names through the store.
pub struct AliasResolver<'a> {
    repository: &'a dyn FullRepository,
}

impl<'a> AliasResolver<'a> {
    pub fn new(repository: &'a dyn FullRepository) -> Self {
        Self { repository }
    }

    /// Canonical names matching `name`. An empty set means no match and is
    /// not an error.
    pub async fn resolve(
        &self,
        kind: CatalogKind,
        name: &str,
        mode: ResolveMode,
    ) -> PulsarDbResult<BTreeSet<String>> {
        let resolved: BTreeSet<String> = match mode {
            ResolveMode::Exact => self
                .repository
                .find_canonical(kind, name)
                .await?
                .into_iter()
                .collect(),
            ResolveMode::Substring => {
                let predicate = [Predicate::Contains {
                    field: Field::Name,
                    needle: name.to_string(),
                }];
                match kind {
                    CatalogKind::Pulsar => self
                        .repository
                        .select_pulsars(&predicate)
                        .await?
                        .into_iter()
                        .map(|p| p.name)
                        .collect(),
                    CatalogKind::Telescope => self
                        .repository
                        .select_telescopes(&predicate)
                        .await?
                        .into_iter()
                        .map(|t| t.name)
                        .collect(),
                }
            }
        };
        log::debug!(
            "Resolved {} '{}' ({:?}) to {} canonical name(s)",
            kind,
            name,
            mode,
            resolved.len()
        );
        Ok(resolved)
    }

    /// Union of the resolutions of every name.
    pub async fn resolve_all(
        &self,
        kind: CatalogKind,
        names: &[String],
        mode: ResolveMode,
    ) -> PulsarDbResult<BTreeSet<String>> {
        let mut union = BTreeSet::new();
        for name in names {
            union.extend(self.resolve(kind, name, mode).await?);
        }
        Ok(union)
    }

    /// Canonical name for an exact reference, if it resolves.
    pub async fn canonical(&self, kind: CatalogKind, name: &str) -> PulsarDbResult<Option<String>> {
        Ok(self.resolve(kind, name, ResolveMode::Exact).await?.into_iter().next())
    }
}
