//! Catalog (pulsar and telescope) storage operations.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{CatalogKind, Pulsar, Telescope};
use crate::query::Predicate;

/// Repository trait for the two alias-bearing catalogs.
///
/// Each catalog kind has its own name namespace: a canonical name or alias
/// must be unique among all names of the same kind.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Check that the store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Insert a pulsar with its initial aliases.
    ///
    /// # Returns
    /// * `Ok(Pulsar)` - The stored entry
    /// * `Err(RepositoryError::Conflict)` - If the name or any alias is already
    ///   used by a pulsar, or repeats within the entry itself
    async fn insert_pulsar(&self, pulsar: Pulsar) -> RepositoryResult<Pulsar>;

    /// Insert a telescope with its initial aliases. Same uniqueness rules as
    /// [`insert_pulsar`](Self::insert_pulsar).
    async fn insert_telescope(&self, telescope: Telescope) -> RepositoryResult<Telescope>;

    /// Append `alias` to the entry that `name` (canonical or alias) resolves to.
    ///
    /// # Returns
    /// * `Ok(String)` - Canonical name of the updated entry
    /// * `Err(RepositoryError::NotFound)` - If `name` resolves to nothing
    /// * `Err(RepositoryError::Conflict)` - If `alias` is already taken; the
    ///   store is left unchanged
    async fn add_alias(
        &self,
        kind: CatalogKind,
        name: &str,
        alias: &str,
    ) -> RepositoryResult<String>;

    /// Canonical name of the entry whose name or alias equals `name` exactly.
    async fn find_canonical(&self, kind: CatalogKind, name: &str)
        -> RepositoryResult<Option<String>>;

    /// Pulsars satisfying every predicate, in canonical-name order.
    async fn select_pulsars(&self, predicates: &[Predicate]) -> RepositoryResult<Vec<Pulsar>>;

    /// Telescopes satisfying every predicate, in canonical-name order.
    async fn select_telescopes(&self, predicates: &[Predicate])
        -> RepositoryResult<Vec<Telescope>>;
}
