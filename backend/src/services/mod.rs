//! Entity collections façade.
//!
//! [`PulsarDb`] wires a repository and credentials together and hands out one
//! coordinator per collection. Each coordinator exposes `post` (authenticate,
//! validate, normalize, write) and `get` (compile, execute, render).

mod fields;
pub mod observations;
pub mod pulsars;
pub mod telescopes;

pub use observations::Observations;
pub use pulsars::Pulsars;
pub use telescopes::Telescopes;

use serde::Serialize;
use std::sync::Arc;

use crate::auth::Credentials;
use crate::db::repository::{CatalogRepository, FullRepository};
use crate::error::PulsarDbResult;
use crate::format::{OutputFormat, Rendered};
use crate::models::{EntityKind, Observation, Pulsar, Telescope};
use crate::query::Params;

/// Record created by a successful post.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "lowercase")]
pub enum Posted {
    Pulsar(Pulsar),
    Telescope(Telescope),
    Observation(Observation),
}

/// Entry point: a store plus the credentials used for mutating calls.
#[derive(Clone)]
pub struct PulsarDb {
    repository: Arc<dyn FullRepository>,
    credentials: Credentials,
}

impl PulsarDb {
    pub fn new(repository: Arc<dyn FullRepository>, credentials: Credentials) -> Self {
        Self {
            repository,
            credentials,
        }
    }

    pub fn repository(&self) -> &Arc<dyn FullRepository> {
        &self.repository
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn pulsars(&self) -> Pulsars<'_> {
        Pulsars::new(self)
    }

    pub fn telescopes(&self) -> Telescopes<'_> {
        Telescopes::new(self)
    }

    pub fn observations(&self) -> Observations<'_> {
        Observations::new(self)
    }

    pub async fn health_check(&self) -> PulsarDbResult<bool> {
        Ok(self.repository.health_check().await?)
    }

    /// Post to the collection for `kind`.
    pub async fn post(
        &self,
        kind: EntityKind,
        fields: &Params,
        key: Option<&str>,
    ) -> PulsarDbResult<Posted> {
        Ok(match kind {
            EntityKind::Pulsar => Posted::Pulsar(self.pulsars().post(fields, key).await?),
            EntityKind::Telescope => Posted::Telescope(self.telescopes().post(fields, key).await?),
            EntityKind::Observation => {
                Posted::Observation(self.observations().post(fields, key).await?)
            }
        })
    }

    /// Query the collection for `kind` and render the result.
    pub async fn get(
        &self,
        kind: EntityKind,
        params: &Params,
        format: OutputFormat,
    ) -> PulsarDbResult<Rendered> {
        match kind {
            EntityKind::Pulsar => self.pulsars().get(params, format).await,
            EntityKind::Telescope => self.telescopes().get(params, format).await,
            EntityKind::Observation => self.observations().get(params, format).await,
        }
    }

    fn repo(&self) -> &dyn FullRepository {
        self.repository.as_ref()
    }

    /// Authenticate a post, logging rejections.
    fn authenticate(&self, kind: EntityKind, key: Option<&str>) -> PulsarDbResult<()> {
        self.credentials.authenticate(key).inspect_err(|e| {
            log::warn!("Rejected {} post: {}", kind, e);
        })
    }
}

impl std::fmt::Debug for PulsarDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PulsarDb")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
