//! Repository configuration file support.
//!
//! This module reads `pulsardb.toml`, which selects the store, names the
//! environment variable holding the default API key, lists the accepted key
//! digests and sets the default output format.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::factory::RepositoryType;
use super::repository::{ErrorContext, RepositoryError};
use crate::auth::{ApiKeyRegistry, Credentials, API_KEY_ENV};
use crate::format::OutputFormat;

/// Name of the configuration file searched for in the default locations.
pub const CONFIG_FILE_NAME: &str = "pulsardb.toml";

/// Repository configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
    /// JSON snapshot backing the local store. Missing file means an empty store.
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
}

/// Credential settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// SHA-256 hex digests of the accepted keys.
    #[serde(default)]
    pub accepted_key_hashes: Vec<String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            accepted_key_hashes: Vec::new(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_format")]
    pub default_format: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            default_format: default_format(),
        }
    }
}

fn default_api_key_env() -> String {
    API_KEY_ENV.to_string()
}

fn default_format() -> String {
    "json".to_string()
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            repository: RepositorySettings {
                repo_type: "local".to_string(),
                snapshot: None,
            },
            auth: AuthSettings::default(),
            output: OutputSettings::default(),
        }
    }
}

impl RepositoryConfig {
    /// Load repository configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(RepositoryConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        let context = || ErrorContext::new("load_config").with_details(path.display().to_string());

        let content = fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to read config file: {}", e),
                context(),
            )
        })?;

        let config: RepositoryConfig = toml::from_str(&content).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to parse config file: {}", e),
                context(),
            )
        })?;

        Ok(config)
    }

    /// Load `pulsardb.toml` from the first standard location under `base`
    /// that has one.
    ///
    /// Searches, relative to `base`:
    /// 1. `pulsardb.toml`
    /// 2. `backend/pulsardb.toml`
    /// 3. `../pulsardb.toml`
    ///
    /// # Returns
    /// * `Ok(None)` if no location has a config file
    /// * `Err(RepositoryError)` if a file exists but cannot be read or parsed
    pub fn from_standard_locations(base: &Path) -> Result<Option<Self>, RepositoryError> {
        let search_paths = [
            base.join(CONFIG_FILE_NAME),
            base.join("backend").join(CONFIG_FILE_NAME),
            base.join("..").join(CONFIG_FILE_NAME),
        ];

        match search_paths.iter().find(|path| path.exists()) {
            Some(path) => {
                log::debug!("Using config file {}", path.display());
                Self::from_file(path).map(Some)
            }
            None => Ok(None),
        }
    }

    /// [`from_standard_locations`](Self::from_standard_locations) relative to
    /// the working directory.
    pub fn from_default_location() -> Result<Option<Self>, RepositoryError> {
        Self::from_standard_locations(Path::new("."))
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, RepositoryError> {
        RepositoryType::from_str(&self.repository.repo_type)
    }

    /// Default output format.
    pub fn output_format(&self) -> Result<OutputFormat, RepositoryError> {
        OutputFormat::from_str(&self.output.default_format).map_err(|e| {
            RepositoryError::configuration(format!("Invalid output.default_format: {}", e))
        })
    }

    /// Credentials with the configured key digests, taking the default key
    /// from the configured environment variable.
    pub fn credentials(&self) -> Result<Credentials, RepositoryError> {
        let mut registry = ApiKeyRegistry::new();
        for digest in &self.auth.accepted_key_hashes {
            registry = registry.with_digest(digest).map_err(|e| {
                RepositoryError::configuration(format!("Invalid auth.accepted_key_hashes: {}", e))
            })?;
        }
        Ok(Credentials::from_env_var(&self.auth.api_key_env, registry))
    }
}
