//! Observation fact records.

use serde::{Deserialize, Serialize};

use super::frequency::MegaHertz;
use super::time::ModifiedJulianDate;
use crate::define_id_type;

define_id_type!(i64, ObservationId);

/// A validated observation ready to be inserted. References are canonical names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewObservation {
    pub pulsar: String,
    pub telescope: String,
    pub frequency: MegaHertz,
    pub project: String,
    pub submitter: String,
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub receiver: Option<String>,
    pub start: ModifiedJulianDate,
    pub stop: ModifiedJulianDate,
    #[serde(default)]
    pub notes: String,
}

/// A stored observation. Immutable once posted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: ObservationId,
    pub pulsar: String,
    pub telescope: String,
    pub frequency: MegaHertz,
    pub project: String,
    pub submitter: String,
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub receiver: Option<String>,
    pub start: ModifiedJulianDate,
    pub stop: ModifiedJulianDate,
    #[serde(default)]
    pub notes: String,
}

impl Observation {
    pub fn from_new(id: ObservationId, new: NewObservation) -> Self {
        Self {
            id,
            pulsar: new.pulsar,
            telescope: new.telescope,
            frequency: new.frequency,
            project: new.project,
            submitter: new.submitter,
            backend: new.backend,
            receiver: new.receiver,
            start: new.start,
            stop: new.stop,
            notes: new.notes,
        }
    }
}
