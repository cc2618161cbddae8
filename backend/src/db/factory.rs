//! Repository factory for dependency injection.
//!
//! This module provides utilities for creating and configuring repository instances
//! based on runtime configuration.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};

/// Environment variable selecting the repository type.
pub const REPOSITORY_TYPE_ENV: &str = "REPOSITORY_TYPE";

/// Environment variable naming the local store's snapshot file.
pub const SNAPSHOT_ENV: &str = "PULSARDB_SNAPSHOT";

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory local repository, optionally backed by a JSON snapshot
    Local,
}

impl FromStr for RepositoryType {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            _ => Err(RepositoryError::configuration(format!(
                "Unknown repository type: {}",
                s
            ))),
        }
    }
}

impl RepositoryType {
    /// Get repository type from the `REPOSITORY_TYPE` environment variable.
    ///
    /// Unset means Local; an unrecognized value is a configuration error.
    pub fn from_env() -> RepositoryResult<Self> {
        match std::env::var(REPOSITORY_TYPE_ENV) {
            Ok(val) => val.parse(),
            Err(_) => Ok(Self::Local),
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```
/// use pulsardb::db::repository::CatalogRepository;
/// use pulsardb::db::{RepositoryFactory, RepositoryType};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let repo = RepositoryFactory::create(RepositoryType::Local, None).await.unwrap();
/// assert!(repo.health_check().await.unwrap());
/// # });
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// # Arguments
    /// * `repo_type` - Type of repository to create
    /// * `snapshot` - Optional snapshot file to load the local store from
    pub async fn create(
        repo_type: RepositoryType,
        snapshot: Option<&Path>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Local => match snapshot {
                Some(path) => Ok(Self::open_snapshot(path)? as Arc<dyn FullRepository>),
                None => Ok(Self::create_local()),
            },
        }
    }

    /// Create an empty in-memory local repository.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Open a local repository over a snapshot file.
    ///
    /// A missing file yields an empty store; saving later creates it.
    pub fn open_snapshot(path: &Path) -> RepositoryResult<Arc<LocalRepository>> {
        if path.exists() {
            Ok(Arc::new(LocalRepository::load_snapshot(path)?))
        } else {
            log::info!(
                "Snapshot {} not found, starting with an empty store",
                path.display()
            );
            Ok(Arc::new(LocalRepository::new()))
        }
    }

    /// Create repository from environment configuration.
    ///
    /// Reads `REPOSITORY_TYPE` and `PULSARDB_SNAPSHOT`.
    pub async fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        RepositoryBuilder::new().from_env()?.build().await
    }

    /// Create repository from a TOML configuration file.
    pub async fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config).await
    }

    /// Create repository from a RepositoryConfig instance.
    pub async fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = config.repository_type()?;
        Self::create(repo_type, config.repository.snapshot.as_deref()).await
    }
}

/// Builder for configuring repository creation.
///
/// # Example
/// ```
/// use pulsardb::db::{RepositoryBuilder, RepositoryType};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let repo = RepositoryBuilder::new()
///     .repository_type(RepositoryType::Local)
///     .build()
///     .await
///     .unwrap();
/// # let _ = repo;
/// # });
/// ```
pub struct RepositoryBuilder {
    repo_type: RepositoryType,
    snapshot: Option<PathBuf>,
}

impl RepositoryBuilder {
    /// Create a new repository builder with default settings (local, no snapshot).
    pub fn new() -> Self {
        Self {
            repo_type: RepositoryType::Local,
            snapshot: None,
        }
    }

    /// Set the repository type.
    pub fn repository_type(mut self, repo_type: RepositoryType) -> Self {
        self.repo_type = repo_type;
        self
    }

    /// Set the snapshot file.
    pub fn snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot = Some(path.into());
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env(mut self) -> Result<Self, RepositoryError> {
        self.repo_type = RepositoryType::from_env()?;
        if let Ok(path) = std::env::var(SNAPSHOT_ENV) {
            if !path.trim().is_empty() {
                self.snapshot = Some(PathBuf::from(path));
            }
        }
        Ok(self)
    }

    /// Load configuration from a TOML file.
    pub fn from_config_file<P: AsRef<Path>>(
        mut self,
        config_path: P,
    ) -> Result<Self, RepositoryError> {
        let repo_config = RepositoryConfig::from_file(config_path)?;
        self.repo_type = repo_config.repository_type()?;
        self.snapshot = repo_config.repository.snapshot;
        Ok(self)
    }

    /// Build the repository instance.
    pub async fn build(self) -> RepositoryResult<Arc<dyn FullRepository>> {
        RepositoryFactory::create(self.repo_type, self.snapshot.as_deref()).await
    }
}

impl Default for RepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::CatalogRepository;

    #[test]
    fn test_repository_type_from_str() {
        assert_eq!(
            RepositoryType::from_str("local").unwrap(),
            RepositoryType::Local
        );
        assert_eq!(
            RepositoryType::from_str("Memory").unwrap(),
            RepositoryType::Local
        );
        assert!(RepositoryType::from_str("postgres").is_err());
    }

    #[tokio::test]
    async fn test_create_local_repository() {
        let repo = RepositoryFactory::create_local();
        assert!(repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_builder_local_repository() {
        let repo = RepositoryBuilder::new()
            .repository_type(RepositoryType::Local)
            .build()
            .await
            .unwrap();

        assert!(repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_snapshot_opens_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepositoryBuilder::new()
            .snapshot(dir.path().join("absent.json"))
            .build()
            .await
            .unwrap();
        assert!(repo.select_pulsars(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_from_config_file_loads_snapshot() {
        use crate::models::Telescope;

        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("db.json");
        let seeded = LocalRepository::new();
        seeded.insert_telescope(Telescope::new("VLA")).await.unwrap();
        seeded.save_snapshot(&snapshot).unwrap();

        let config = dir.path().join("pulsardb.toml");
        std::fs::write(
            &config,
            format!(
                "[repository]\ntype = \"local\"\nsnapshot = {:?}\n",
                snapshot.display().to_string()
            ),
        )
        .unwrap();

        let repo = RepositoryFactory::from_config_file(&config).await.unwrap();
        let telescopes = repo.select_telescopes(&[]).await.unwrap();
        assert_eq!(telescopes.len(), 1);
    }
}
