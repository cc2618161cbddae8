//! Runs compiled queries against the store.

use super::compile::CompiledQuery;
use super::predicate::matches_all;
use super::record::Record;
use super::record_set::RecordSet;
use crate::db::repository::{CatalogRepository, FullRepository, ObservationRepository};
use crate::error::{PulsarDbError, PulsarDbResult};
use crate::models::{EntityKind, Observation, Pulsar, Telescope};

/// Pushes predicates to the store, re-checks the returned rows, then applies
/// the stable sort.
pub struct QueryExecutor<'a> {
    repository: &'a dyn FullRepository,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(repository: &'a dyn FullRepository) -> Self {
        Self { repository }
    }

    pub async fn execute_observations(
        &self,
        query: &CompiledQuery,
    ) -> PulsarDbResult<RecordSet<Observation>> {
        expect_kind(query, EntityKind::Observation)?;
        if query.is_unsatisfiable() {
            return Ok(RecordSet::empty());
        }
        let rows = self
            .repository
            .select_observations(&query.predicates)
            .await?;
        Ok(finish(query, rows))
    }

    pub async fn execute_pulsars(&self, query: &CompiledQuery) -> PulsarDbResult<RecordSet<Pulsar>> {
        expect_kind(query, EntityKind::Pulsar)?;
        if query.is_unsatisfiable() {
            return Ok(RecordSet::empty());
        }
        let rows = self.repository.select_pulsars(&query.predicates).await?;
        Ok(finish(query, rows))
    }

    pub async fn execute_telescopes(
        &self,
        query: &CompiledQuery,
    ) -> PulsarDbResult<RecordSet<Telescope>> {
        expect_kind(query, EntityKind::Telescope)?;
        if query.is_unsatisfiable() {
            return Ok(RecordSet::empty());
        }
        let rows = self.repository.select_telescopes(&query.predicates).await?;
        Ok(finish(query, rows))
    }
}

fn expect_kind(query: &CompiledQuery, kind: EntityKind) -> PulsarDbResult<()> {
    if query.kind == kind {
        Ok(())
    } else {
        Err(PulsarDbError::invalid_parameter(format!(
            "query compiled for {} records cannot run against {} records",
            query.kind, kind
        )))
    }
}

fn finish<T: Record>(query: &CompiledQuery, mut rows: Vec<T>) -> RecordSet<T> {
    let returned = rows.len();
    rows.retain(|row| matches_all(&query.predicates, row));
    if rows.len() != returned {
        log::debug!(
            "Store returned {} {} row(s) failing the predicates",
            returned - rows.len(),
            query.kind
        );
    }
    query.sort.apply(&mut rows);
    RecordSet::new(rows)
}
