//! Observation collection coordinator.

use super::fields::{optional_text, required_label, required_text, FieldSet};
use super::PulsarDb;
use crate::db::repository::ObservationRepository;
use crate::error::{PulsarDbError, PulsarDbResult};
use crate::format::{render, OutputFormat, Rendered};
use crate::models::{CatalogKind, EntityKind, ModifiedJulianDate, NewObservation, Observation};
use crate::query::{AliasResolver, FilterCompiler, Params, QueryExecutor, RecordSet};

const FIELDS: FieldSet = FieldSet {
    entity: EntityKind::Observation,
    required: &[
        "pulsar",
        "telescope",
        "frequency",
        "project",
        "submitter",
        "start",
    ],
    optional: &["stop", "duration", "backend", "receiver", "notes"],
};

/// Observation collection: append-only `post` and `get`.
pub struct Observations<'a> {
    db: &'a PulsarDb,
}

impl<'a> Observations<'a> {
    pub(crate) fn new(db: &'a PulsarDb) -> Self {
        Self { db }
    }

    /// Record an observation.
    ///
    /// `pulsar` and `telescope` may be canonical names or aliases; the stored
    /// reference is canonical. The window end is `stop`, or `start + duration`
    /// (seconds) when only a duration is given.
    ///
    /// # Errors
    /// * [`PulsarDbError::Authentication`] - Missing or rejected key; nothing is written
    /// * [`PulsarDbError::Validation`] - Missing/unknown/malformed fields, non-positive
    ///   frequency, negative duration, or `start > stop`
    /// * [`PulsarDbError::Reference`] - `pulsar` or `telescope` does not resolve
    pub async fn post(&self, fields: &Params, key: Option<&str>) -> PulsarDbResult<Observation> {
        self.db.authenticate(EntityKind::Observation, key)?;
        let result = self.insert(fields).await;
        match &result {
            Ok(obs) => log::info!(
                "Posted observation {} ({} at {}, MJD {} to {})",
                obs.id,
                obs.pulsar,
                obs.telescope,
                obs.start,
                obs.stop
            ),
            Err(e) => log::warn!("Rejected observation post: {}", e),
        }
        result
    }

    async fn insert(&self, fields: &Params) -> PulsarDbResult<Observation> {
        let observation = self.validate(fields).await?;
        Ok(self.db.repo().insert_observation(observation).await?)
    }

    async fn validate(&self, fields: &Params) -> PulsarDbResult<NewObservation> {
        FIELDS.check(fields)?;

        let frequency = fields
            .frequency("frequency")?
            .ok_or_else(|| PulsarDbError::validation("missing required field 'frequency'"))?;
        let start = fields
            .time("start")?
            .ok_or_else(|| PulsarDbError::validation("missing required field 'start'"))?;
        let stop = window_end(fields, start)?;
        if start > stop {
            return Err(PulsarDbError::validation(format!(
                "start ({}) is after stop ({})",
                start, stop
            )));
        }

        let resolver = AliasResolver::new(self.db.repo());
        let pulsar_name = required_text(fields, "pulsar")?;
        let pulsar = resolver
            .canonical(CatalogKind::Pulsar, &pulsar_name)
            .await?
            .ok_or_else(|| PulsarDbError::reference(EntityKind::Pulsar, pulsar_name))?;
        let telescope_name = required_text(fields, "telescope")?;
        let telescope = resolver
            .canonical(CatalogKind::Telescope, &telescope_name)
            .await?
            .ok_or_else(|| PulsarDbError::reference(EntityKind::Telescope, telescope_name))?;

        Ok(NewObservation {
            pulsar,
            telescope,
            frequency,
            project: required_label(fields, "project")?,
            submitter: required_label(fields, "submitter")?,
            backend: optional_text(fields, "backend")?,
            receiver: optional_text(fields, "receiver")?,
            start,
            stop,
            notes: fields.text("notes")?.unwrap_or_default(),
        })
    }

    /// Filtered, sorted observations.
    pub async fn query(&self, params: &Params) -> PulsarDbResult<RecordSet<Observation>> {
        let repo = self.db.repo();
        let query = FilterCompiler::new(repo)
            .compile(EntityKind::Observation, params)
            .await?;
        QueryExecutor::new(repo).execute_observations(&query).await
    }

    pub async fn get(&self, params: &Params, format: OutputFormat) -> PulsarDbResult<Rendered> {
        render(&self.query(params).await?, format)
    }
}

/// `stop`, or `start + duration`. Exactly one of the two must be given.
fn window_end(fields: &Params, start: ModifiedJulianDate) -> PulsarDbResult<ModifiedJulianDate> {
    match (fields.time("stop")?, fields.duration("duration")?) {
        (Some(stop), None) => Ok(stop),
        (None, Some(duration)) => {
            if duration.value() < 0.0 {
                return Err(PulsarDbError::validation(format!(
                    "duration must not be negative, got {} s",
                    duration.value()
                )));
            }
            Ok(start.offset_by(duration))
        }
        (Some(_), Some(_)) => Err(PulsarDbError::validation(
            "give either 'stop' or 'duration', not both",
        )),
        (None, None) => Err(PulsarDbError::validation(
            "missing required field: one of 'stop' or 'duration'",
        )),
    }
}
