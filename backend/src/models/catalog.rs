//! Dimension entities: pulsars and telescopes, both addressable by a canonical
//! name or any of their aliases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three entity collections exposed by the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Pulsar,
    Telescope,
    Observation,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pulsar => "pulsar",
            Self::Telescope => "telescope",
            Self::Observation => "observation",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity types that carry a canonical name plus aliases.
///
/// Each kind has its own alias namespace: a telescope alias may equal a
/// pulsar alias without conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Pulsar,
    Telescope,
}

impl From<CatalogKind> for EntityKind {
    fn from(kind: CatalogKind) -> Self {
        match kind {
            CatalogKind::Pulsar => EntityKind::Pulsar,
            CatalogKind::Telescope => EntityKind::Telescope,
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        EntityKind::from(*self).fmt(f)
    }
}

/// Common shape of catalog entries, used by stores to maintain the alias index.
pub trait CatalogEntry {
    const KIND: CatalogKind;

    fn name(&self) -> &str;
    fn aliases(&self) -> &[String];
    fn push_alias(&mut self, alias: String);

    /// Canonical name followed by every alias.
    fn all_names(&self) -> Vec<&str> {
        std::iter::once(self.name())
            .chain(self.aliases().iter().map(String::as_str))
            .collect()
    }
}

/// A pulsar with its sky position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pulsar {
    pub name: String,
    /// Right ascension in degrees.
    pub ra: qtty::Degrees,
    /// Declination in degrees.
    pub dec: qtty::Degrees,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Pulsar {
    pub fn new(name: impl Into<String>, ra: qtty::Degrees, dec: qtty::Degrees) -> Self {
        Self {
            name: name.into(),
            ra,
            dec,
            aliases: Vec::new(),
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }
}

impl CatalogEntry for Pulsar {
    const KIND: CatalogKind = CatalogKind::Pulsar;

    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }

    fn push_alias(&mut self, alias: String) {
        self.aliases.push(alias);
    }
}

/// A telescope, with the receivers and backends it hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telescope {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub receivers: Vec<String>,
    #[serde(default)]
    pub backends: Vec<String>,
}

impl Telescope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            receivers: Vec::new(),
            backends: Vec::new(),
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn with_receivers<I, S>(mut self, receivers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.receivers.extend(receivers.into_iter().map(Into::into));
        self
    }

    pub fn with_backends<I, S>(mut self, backends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.backends.extend(backends.into_iter().map(Into::into));
        self
    }

    /// Whether this telescope hosts both the given receiver and backend.
    pub fn hosts(&self, receiver: &str, backend: &str) -> bool {
        self.receivers.iter().any(|r| r == receiver) && self.backends.iter().any(|b| b == backend)
    }
}

impl CatalogEntry for Telescope {
    const KIND: CatalogKind = CatalogKind::Telescope;

    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }

    fn push_alias(&mut self, alias: String) {
        self.aliases.push(alias);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_names_lists_canonical_first() {
        let psr = Pulsar::new("J0406+30", qtty::Degrees::new(61.7), qtty::Degrees::new(30.6))
            .with_aliases(["B0403+30"]);
        assert_eq!(psr.all_names(), vec!["J0406+30", "B0403+30"]);
    }

    #[test]
    fn test_telescope_hosts() {
        let gbt = Telescope::new("GBT")
            .with_receivers(["Rcvr1_2", "Rcvr_800"])
            .with_backends(["GUPPI", "VEGAS"]);
        assert!(gbt.hosts("Rcvr1_2", "VEGAS"));
        assert!(!gbt.hosts("Rcvr1_2", "PUPPI"));
        assert!(!gbt.hosts("L-wide", "GUPPI"));
    }

    #[test]
    fn test_pulsar_serde_defaults_aliases() {
        let psr: Pulsar = serde_json::from_str(r#"{"name":"J1713+0747","ra":258.45,"dec":7.79}"#).unwrap();
        assert!(psr.aliases.is_empty());
        assert_eq!(psr.ra.value(), 258.45);
    }

    #[test]
    fn test_entity_kind_display() {
        assert_eq!(EntityKind::Observation.to_string(), "observation");
        assert_eq!(CatalogKind::Telescope.to_string(), "telescope");
    }
}
