//! Pulsar collection coordinator.

use super::fields::{name_list, required_number, required_text, FieldSet};
use super::PulsarDb;
use crate::db::repository::{CatalogRepository, RepositoryError};
use crate::error::{PulsarDbError, PulsarDbResult};
use crate::format::{render, OutputFormat, Rendered};
use crate::models::{CatalogKind, EntityKind, Pulsar};
use crate::query::{FilterCompiler, Params, QueryExecutor, RecordSet};

const FIELDS: FieldSet = FieldSet {
    entity: EntityKind::Pulsar,
    required: &["name", "ra", "dec"],
    optional: &["aliases"],
};

/// Pulsar collection: `post`, `get` and alias maintenance.
pub struct Pulsars<'a> {
    db: &'a PulsarDb,
}

impl<'a> Pulsars<'a> {
    pub(crate) fn new(db: &'a PulsarDb) -> Self {
        Self { db }
    }

    /// Create a pulsar from `name`, `ra`, `dec` (degrees) and optional `aliases`.
    ///
    /// # Errors
    /// * [`PulsarDbError::Authentication`] - Missing or rejected key; nothing is written
    /// * [`PulsarDbError::Validation`] - Missing/unknown/malformed fields, position
    ///   out of range, or a name/alias already taken by another pulsar
    pub async fn post(&self, fields: &Params, key: Option<&str>) -> PulsarDbResult<Pulsar> {
        self.db.authenticate(EntityKind::Pulsar, key)?;
        let result = self.insert(fields).await;
        match &result {
            Ok(pulsar) => log::info!(
                "Posted pulsar {} ({} alias(es))",
                pulsar.name,
                pulsar.aliases.len()
            ),
            Err(e) => log::warn!("Rejected pulsar post: {}", e),
        }
        result
    }

    async fn insert(&self, fields: &Params) -> PulsarDbResult<Pulsar> {
        FIELDS.check(fields)?;
        let name = required_text(fields, "name")?;
        let ra = required_number(fields, "ra")?;
        let dec = required_number(fields, "dec")?;
        if !(0.0..360.0).contains(&ra) {
            return Err(PulsarDbError::validation(format!(
                "ra must be in [0, 360) degrees, got {}",
                ra
            )));
        }
        if !(-90.0..=90.0).contains(&dec) {
            return Err(PulsarDbError::validation(format!(
                "dec must be in [-90, 90] degrees, got {}",
                dec
            )));
        }
        let pulsar = Pulsar::new(name, qtty::Degrees::new(ra), qtty::Degrees::new(dec))
            .with_aliases(name_list(fields, "aliases")?);
        Ok(self.db.repo().insert_pulsar(pulsar).await?)
    }

    /// Add `alias` to the pulsar that `name` (canonical or alias) refers to.
    ///
    /// Returns the canonical name.
    pub async fn add_alias(
        &self,
        name: &str,
        alias: &str,
        key: Option<&str>,
    ) -> PulsarDbResult<String> {
        self.db.authenticate(EntityKind::Pulsar, key)?;
        add_alias(self.db, CatalogKind::Pulsar, name, alias).await
    }

    /// Filtered, sorted pulsars.
    pub async fn query(&self, params: &Params) -> PulsarDbResult<RecordSet<Pulsar>> {
        let repo = self.db.repo();
        let query = FilterCompiler::new(repo)
            .compile(EntityKind::Pulsar, params)
            .await?;
        QueryExecutor::new(repo).execute_pulsars(&query).await
    }

    pub async fn get(&self, params: &Params, format: OutputFormat) -> PulsarDbResult<Rendered> {
        render(&self.query(params).await?, format)
    }
}

/// Shared alias maintenance for both catalogs.
pub(crate) async fn add_alias(
    db: &PulsarDb,
    kind: CatalogKind,
    name: &str,
    alias: &str,
) -> PulsarDbResult<String> {
    let alias = alias.trim();
    if alias.is_empty() {
        return Err(PulsarDbError::validation("alias must not be empty"));
    }
    match db.repo().add_alias(kind, name, alias).await {
        Ok(canonical) => {
            log::info!("Added {} alias '{}' to {}", kind, alias, canonical);
            Ok(canonical)
        }
        Err(RepositoryError::NotFound { .. }) => {
            log::warn!("Rejected {} alias '{}': '{}' does not resolve", kind, alias, name);
            Err(PulsarDbError::reference(kind.into(), name))
        }
        Err(e) => {
            log::warn!("Rejected {} alias '{}': {}", kind, alias, e);
            Err(e.into())
        }
    }
}
