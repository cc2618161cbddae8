//! Observation storage operations.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{NewObservation, Observation};
use crate::query::Predicate;

/// Repository trait for the append-only observation log.
#[async_trait]
pub trait ObservationRepository: Send + Sync {
    /// Append an observation and assign its id.
    ///
    /// References in `observation` are already canonical names.
    async fn insert_observation(&self, observation: NewObservation)
        -> RepositoryResult<Observation>;

    /// Observations satisfying every predicate, in ascending id order.
    async fn select_observations(
        &self,
        predicates: &[Predicate],
    ) -> RepositoryResult<Vec<Observation>>;

    /// Number of stored observations.
    async fn count_observations(&self) -> RepositoryResult<usize>;
}
