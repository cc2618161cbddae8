//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing, local development and the command-line tool.
//! All data is stored in memory; a JSON snapshot can be loaded from and saved
//! to disk.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::{
    CatalogEntry, CatalogKind, NewObservation, Observation, ObservationId, Pulsar, Telescope,
};
use crate::query::{matches_all, Predicate, Record};

/// One catalog kind: entries keyed by canonical name plus a name-or-alias index.
#[derive(Debug, Clone)]
struct Catalog<T> {
    entries: BTreeMap<String, T>,
    index: HashMap<String, String>,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: CatalogEntry + Record + Clone> Catalog<T> {
    fn resolve(&self, name: &str) -> Option<&str> {
        self.index.get(name).map(String::as_str)
    }

    fn conflict(&self, name: &str, operation: &str) -> RepositoryError {
        let owner = self.resolve(name).unwrap_or(name);
        RepositoryError::conflict_with_context(
            format!(
                "{} name '{}' is already used by '{}'",
                T::KIND,
                name,
                owner
            ),
            ErrorContext::new(operation)
                .with_entity(T::KIND.to_string())
                .with_name(name),
        )
    }

    /// Check every name of `entry` and insert it; nothing changes on failure.
    fn insert(&mut self, entry: T) -> RepositoryResult<T> {
        let names = entry.all_names();
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(RepositoryError::validation_with_context(
                    format!("{} names must not be empty", T::KIND),
                    ErrorContext::new("insert").with_entity(T::KIND.to_string()),
                ));
            }
            if self.index.contains_key(*name) || names[..i].contains(name) {
                return Err(self.conflict(name, "insert"));
            }
        }

        let canonical = entry.name().to_string();
        for name in names {
            self.index.insert(name.to_string(), canonical.clone());
        }
        self.entries.insert(canonical, entry.clone());
        Ok(entry)
    }

    fn add_alias(&mut self, name: &str, alias: &str) -> RepositoryResult<String> {
        let canonical = self
            .resolve(name)
            .map(str::to_string)
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("no {} named '{}'", T::KIND, name),
                    ErrorContext::new("add_alias")
                        .with_entity(T::KIND.to_string())
                        .with_name(name),
                )
            })?;
        if alias.is_empty() {
            return Err(RepositoryError::validation("alias must not be empty"));
        }
        if self.index.contains_key(alias) {
            return Err(self.conflict(alias, "add_alias"));
        }
        let entry = self.entries.get_mut(&canonical).ok_or_else(|| {
            RepositoryError::internal(format!("alias index points at missing '{}'", canonical))
        })?;
        entry.push_alias(alias.to_string());
        self.index.insert(alias.to_string(), canonical.clone());
        Ok(canonical)
    }

    fn select(&self, predicates: &[Predicate]) -> Vec<T> {
        self.entries
            .values()
            .filter(|entry| matches_all(predicates, *entry))
            .cloned()
            .collect()
    }

    fn from_entries(entries: Vec<T>) -> RepositoryResult<Self> {
        let mut catalog = Self::default();
        for entry in entries {
            catalog.insert(entry)?;
        }
        Ok(catalog)
    }
}

struct LocalData {
    pulsars: Catalog<Pulsar>,
    telescopes: Catalog<Telescope>,
    observations: Vec<Observation>,
    next_observation_id: ObservationId,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            pulsars: Catalog::default(),
            telescopes: Catalog::default(),
            observations: Vec::new(),
            next_observation_id: ObservationId::new(1),
            is_healthy: true,
        }
    }
}

/// Serialized form of a [`LocalRepository`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub pulsars: Vec<Pulsar>,
    #[serde(default)]
    pub telescopes: Vec<Telescope>,
    #[serde(default)]
    pub observations: Vec<Observation>,
}

/// In-memory local repository.
///
/// Clones share the same underlying data. Alias uniqueness checks and the
/// corresponding inserts happen under a single write lock.
///
/// # Example
/// ```
/// use pulsardb::db::repositories::LocalRepository;
/// use pulsardb::db::repository::CatalogRepository;
/// use pulsardb::models::Telescope;
///
/// # tokio_test_block(async {
/// let repo = LocalRepository::new();
/// repo.insert_telescope(Telescope::new("Arecibo").with_aliases(["AO"])).await.unwrap();
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

impl std::fmt::Debug for LocalRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalRepository").finish_non_exhaustive()
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Build a repository from a snapshot, re-checking every rule enforced on insert.
    ///
    /// Observations must have distinct ids, a window with `start <= stop`, a
    /// positive finite frequency, and pulsar and telescope fields holding
    /// canonical names present in the snapshot's catalogs.
    pub fn from_snapshot(snapshot: Snapshot) -> RepositoryResult<Self> {
        let pulsars = Catalog::from_entries(snapshot.pulsars)?;
        let telescopes = Catalog::from_entries(snapshot.telescopes)?;
        let mut observations = snapshot.observations;
        observations.sort_by_key(|o| o.id);
        for (i, obs) in observations.iter().enumerate() {
            if i > 0 && observations[i - 1].id == obs.id {
                return Err(invalid_observation(obs, "duplicate observation id".to_string()));
            }
            check_stored_observation(obs, &pulsars, &telescopes)?;
        }
        let next_observation_id = observations
            .last()
            .map(|o| o.id.next())
            .unwrap_or_else(|| ObservationId::new(1));

        Ok(Self {
            data: Arc::new(RwLock::new(LocalData {
                pulsars,
                telescopes,
                observations,
                next_observation_id,
                is_healthy: true,
            })),
        })
    }

    /// Current contents as a snapshot.
    pub fn snapshot(&self) -> Snapshot {
        let data = self.data.read();
        Snapshot {
            pulsars: data.pulsars.entries.values().cloned().collect(),
            telescopes: data.telescopes.entries.values().cloned().collect(),
            observations: data.observations.clone(),
        }
    }

    /// Load a JSON snapshot file.
    pub fn load_snapshot(path: impl AsRef<Path>) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| RepositoryError::snapshot_io("load_snapshot", path, e))?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .map_err(|e| RepositoryError::snapshot_format("load_snapshot", path, e))?;
        log::debug!(
            "Loaded snapshot {} ({} pulsars, {} telescopes, {} observations)",
            path.display(),
            snapshot.pulsars.len(),
            snapshot.telescopes.len(),
            snapshot.observations.len()
        );
        Self::from_snapshot(snapshot).map_err(|e| e.with_operation("load_snapshot"))
    }

    /// Write the current contents to a JSON snapshot file.
    ///
    /// The JSON goes to a sibling `<name>.tmp` file which is then renamed over
    /// `path`. A failed save leaves the previous file at `path` untouched.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> RepositoryResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| RepositoryError::snapshot_format("save_snapshot", path, e))?;
        let tmp = staging_path(path)?;
        fs::write(&tmp, json).map_err(|e| RepositoryError::snapshot_io("save_snapshot", &tmp, e))?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(RepositoryError::snapshot_io("save_snapshot", path, e));
        }
        Ok(())
    }

    /// Mark the store unavailable (or available again); used to exercise storage failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    pub fn pulsar_count(&self) -> usize {
        self.data.read().pulsars.entries.len()
    }

    pub fn telescope_count(&self) -> usize {
        self.data.read().telescopes.entries.len()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::unavailable("Local repository is not healthy"));
        }
        Ok(())
    }
}

fn staging_path(path: &Path) -> RepositoryResult<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        RepositoryError::configuration_with_context(
            "snapshot path has no file name",
            ErrorContext::snapshot("save_snapshot", path),
        )
    })?;
    let mut staged = file_name.to_os_string();
    staged.push(".tmp");
    Ok(path.with_file_name(staged))
}

fn invalid_observation(obs: &Observation, message: String) -> RepositoryError {
    RepositoryError::validation_with_context(
        message,
        ErrorContext::new("from_snapshot")
            .with_entity("observation")
            .with_name(obs.id),
    )
}

fn check_stored_observation(
    obs: &Observation,
    pulsars: &Catalog<Pulsar>,
    telescopes: &Catalog<Telescope>,
) -> RepositoryResult<()> {
    if obs.start.value() > obs.stop.value() {
        return Err(invalid_observation(
            obs,
            format!("window starts at MJD {} after it stops at MJD {}", obs.start, obs.stop),
        ));
    }
    let frequency = obs.frequency.value();
    if !frequency.is_finite() || frequency <= 0.0 {
        return Err(invalid_observation(
            obs,
            format!("frequency {} MHz is not positive", frequency),
        ));
    }
    if !pulsars.entries.contains_key(&obs.pulsar) {
        return Err(invalid_observation(
            obs,
            format!("pulsar '{}' is not a catalogued canonical name", obs.pulsar),
        ));
    }
    if !telescopes.entries.contains_key(&obs.telescope) {
        return Err(invalid_observation(
            obs,
            format!("telescope '{}' is not a catalogued canonical name", obs.telescope),
        ));
    }
    Ok(())
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn insert_pulsar(&self, pulsar: Pulsar) -> RepositoryResult<Pulsar> {
        self.check_health()?;
        self.data
            .write()
            .pulsars
            .insert(pulsar)
            .map_err(|e| e.with_operation("insert_pulsar"))
    }

    async fn insert_telescope(&self, telescope: Telescope) -> RepositoryResult<Telescope> {
        self.check_health()?;
        self.data
            .write()
            .telescopes
            .insert(telescope)
            .map_err(|e| e.with_operation("insert_telescope"))
    }

    async fn add_alias(
        &self,
        kind: CatalogKind,
        name: &str,
        alias: &str,
    ) -> RepositoryResult<String> {
        self.check_health()?;
        let mut data = self.data.write();
        match kind {
            CatalogKind::Pulsar => data.pulsars.add_alias(name, alias),
            CatalogKind::Telescope => data.telescopes.add_alias(name, alias),
        }
    }

    async fn find_canonical(
        &self,
        kind: CatalogKind,
        name: &str,
    ) -> RepositoryResult<Option<String>> {
        self.check_health()?;
        let data = self.data.read();
        let found = match kind {
            CatalogKind::Pulsar => data.pulsars.resolve(name),
            CatalogKind::Telescope => data.telescopes.resolve(name),
        };
        Ok(found.map(str::to_string))
    }

    async fn select_pulsars(&self, predicates: &[Predicate]) -> RepositoryResult<Vec<Pulsar>> {
        self.check_health()?;
        Ok(self.data.read().pulsars.select(predicates))
    }

    async fn select_telescopes(
        &self,
        predicates: &[Predicate],
    ) -> RepositoryResult<Vec<Telescope>> {
        self.check_health()?;
        Ok(self.data.read().telescopes.select(predicates))
    }
}

#[async_trait]
impl ObservationRepository for LocalRepository {
    async fn insert_observation(
        &self,
        observation: NewObservation,
    ) -> RepositoryResult<Observation> {
        self.check_health()?;
        let mut data = self.data.write();
        let id = data.next_observation_id;
        data.next_observation_id = id.next();
        let stored = Observation::from_new(id, observation);
        data.observations.push(stored.clone());
        Ok(stored)
    }

    async fn select_observations(
        &self,
        predicates: &[Predicate],
    ) -> RepositoryResult<Vec<Observation>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .observations
            .iter()
            .filter(|o| matches_all(predicates, *o))
            .cloned()
            .collect())
    }

    async fn count_observations(&self) -> RepositoryResult<usize> {
        self.check_health()?;
        Ok(self.data.read().observations.len())
    }
}
