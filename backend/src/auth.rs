//! Credentials for mutating calls.
//!
//! A post needs a key, taken from the explicit argument or else from the
//! default stored in [`Credentials`]. Keys are checked by a [`KeyValidator`];
//! the bundled [`ApiKeyRegistry`] keeps only SHA-256 digests.

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{PulsarDbError, PulsarDbResult};

/// Environment variable holding the process-wide default key.
pub const API_KEY_ENV: &str = "PULSAR_API_KEY";

/// Decides whether a presented key is acceptable.
pub trait KeyValidator: Send + Sync {
    fn validate(&self, key: &str) -> bool;
}

/// Set of accepted keys, stored as lowercase hex SHA-256 digests.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyRegistry {
    digests: HashSet<String>,
}

impl ApiKeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hex SHA-256 digest of a key.
    pub fn hash_key(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Accept `key`. Only its digest is retained.
    pub fn with_key(mut self, key: &str) -> Self {
        self.digests.insert(Self::hash_key(key));
        self
    }

    /// Accept the key whose digest is `digest` (64 hex characters).
    pub fn with_digest(mut self, digest: &str) -> PulsarDbResult<Self> {
        let digest = digest.trim().to_ascii_lowercase();
        match hex::decode(&digest) {
            Ok(bytes) if bytes.len() == 32 => {
                self.digests.insert(digest);
                Ok(self)
            }
            _ => Err(PulsarDbError::validation(format!(
                "'{}' is not a SHA-256 hex digest",
                digest
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

impl KeyValidator for ApiKeyRegistry {
    fn validate(&self, key: &str) -> bool {
        self.digests.contains(&Self::hash_key(key))
    }
}

/// Default key plus validator, threaded explicitly into every post.
#[derive(Clone)]
pub struct Credentials {
    default_key: Option<String>,
    validator: Arc<dyn KeyValidator>,
}

impl Credentials {
    /// Credentials with no default key.
    pub fn new(validator: impl KeyValidator + 'static) -> Self {
        Self {
            default_key: None,
            validator: Arc::new(validator),
        }
    }

    /// Set the default key. An empty key counts as no key.
    pub fn with_default_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.default_key = (!key.is_empty()).then_some(key);
        self
    }

    /// Take the default key from `PULSAR_API_KEY`, if set.
    pub fn from_env(validator: impl KeyValidator + 'static) -> Self {
        Self::from_env_var(API_KEY_ENV, validator)
    }

    /// Take the default key from the named environment variable, if set.
    pub fn from_env_var(var: &str, validator: impl KeyValidator + 'static) -> Self {
        let credentials = Self::new(validator);
        match std::env::var(var) {
            Ok(key) => credentials.with_default_key(key),
            Err(_) => credentials,
        }
    }

    pub fn default_key(&self) -> Option<&str> {
        self.default_key.as_deref()
    }

    /// Check the explicit key, or the default when none is given.
    ///
    /// # Errors
    /// [`PulsarDbError::Authentication`] when no key is available or the key
    /// is rejected.
    pub fn authenticate(&self, explicit: Option<&str>) -> PulsarDbResult<()> {
        let key = explicit
            .filter(|k| !k.is_empty())
            .or(self.default_key.as_deref())
            .ok_or_else(|| {
                PulsarDbError::authentication(format!(
                    "an API key is required (pass one explicitly or set {})",
                    API_KEY_ENV
                ))
            })?;
        if self.validator.validate(key) {
            Ok(())
        } else {
            Err(PulsarDbError::authentication("API key rejected"))
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("default_key", &self.default_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}
