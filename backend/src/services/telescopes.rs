//! Telescope collection coordinator.

use super::fields::{name_list, required_text, FieldSet};
use super::pulsars::add_alias;
use super::PulsarDb;
use crate::db::repository::CatalogRepository;
use crate::error::PulsarDbResult;
use crate::format::{render, OutputFormat, Rendered};
use crate::models::{CatalogKind, EntityKind, Telescope};
use crate::query::{FilterCompiler, Params, QueryExecutor, RecordSet};

const FIELDS: FieldSet = FieldSet {
    entity: EntityKind::Telescope,
    required: &["name"],
    optional: &["aliases", "receivers", "backends"],
};

/// Telescope collection: `post`, `get`, alias maintenance and instrument lookup.
pub struct Telescopes<'a> {
    db: &'a PulsarDb,
}

impl<'a> Telescopes<'a> {
    pub(crate) fn new(db: &'a PulsarDb) -> Self {
        Self { db }
    }

    /// Create a telescope from `name` and optional `aliases`, `receivers`, `backends`.
    pub async fn post(&self, fields: &Params, key: Option<&str>) -> PulsarDbResult<Telescope> {
        self.db.authenticate(EntityKind::Telescope, key)?;
        let result = self.insert(fields).await;
        match &result {
            Ok(telescope) => log::info!("Posted telescope {}", telescope.name),
            Err(e) => log::warn!("Rejected telescope post: {}", e),
        }
        result
    }

    async fn insert(&self, fields: &Params) -> PulsarDbResult<Telescope> {
        FIELDS.check(fields)?;
        let telescope = Telescope::new(required_text(fields, "name")?)
            .with_aliases(name_list(fields, "aliases")?)
            .with_receivers(name_list(fields, "receivers")?)
            .with_backends(name_list(fields, "backends")?);
        Ok(self.db.repo().insert_telescope(telescope).await?)
    }

    /// Add `alias` to the telescope that `name` refers to. Returns the canonical name.
    pub async fn add_alias(
        &self,
        name: &str,
        alias: &str,
        key: Option<&str>,
    ) -> PulsarDbResult<String> {
        self.db.authenticate(EntityKind::Telescope, key)?;
        add_alias(self.db, CatalogKind::Telescope, name, alias).await
    }

    /// The telescope hosting both `receiver` and `backend`.
    ///
    /// When several telescopes qualify, the last one in canonical-name order wins.
    pub async fn infer(&self, receiver: &str, backend: &str) -> PulsarDbResult<Option<Telescope>> {
        let telescopes = self.db.repo().select_telescopes(&[]).await?;
        let found = telescopes
            .into_iter()
            .filter(|t| t.hosts(receiver, backend))
            .last();
        log::debug!(
            "Inferred telescope for {}/{}: {}",
            receiver,
            backend,
            found.as_ref().map_or("none", |t| t.name.as_str())
        );
        Ok(found)
    }

    /// Filtered, sorted telescopes.
    pub async fn query(&self, params: &Params) -> PulsarDbResult<RecordSet<Telescope>> {
        let repo = self.db.repo();
        let query = FilterCompiler::new(repo)
            .compile(EntityKind::Telescope, params)
            .await?;
        QueryExecutor::new(repo).execute_telescopes(&query).await
    }

    pub async fn get(&self, params: &Params, format: OutputFormat) -> PulsarDbResult<Rendered> {
        render(&self.query(params).await?, format)
    }
}
