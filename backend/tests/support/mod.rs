//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use pulsardb::auth::{ApiKeyRegistry, Credentials};
use pulsardb::db::LocalRepository;
use pulsardb::models::EntityKind;
use pulsardb::query::Params;
use pulsardb::PulsarDb;

pub const TEST_KEY: &str = "observer-key";

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the previous values on unwind and serializes access to the
/// process environment across parallel tests.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    saved: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let saved = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { saved }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.saved.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Credentials accepting [`TEST_KEY`], with no default key.
pub fn test_credentials() -> Credentials {
    Credentials::new(ApiKeyRegistry::new().with_key(TEST_KEY))
}

/// An empty database over a fresh local store.
pub fn empty_db() -> (PulsarDb, Arc<LocalRepository>) {
    let repo = Arc::new(LocalRepository::new());
    let db = PulsarDb::new(repo.clone(), test_credentials());
    (db, repo)
}

/// A database with three pulsars, two telescopes and no observations.
///
/// - `J0406+30` (alias `B0403+30`)
/// - `J1713+0747` (alias `B1711+07`)
/// - `J2000+0404` (alias `PSR2000`; `040` appears in its canonical name)
/// - `Arecibo` (alias `AO`; receivers `430`, `L-wide`; backend `PUPPI`)
/// - `VLA` (receiver `L-band`; backend `YUPPI`)
pub async fn seeded_db() -> (PulsarDb, Arc<LocalRepository>) {
    let (db, repo) = empty_db();
    for (name, ra, dec, alias) in [
        ("J0406+30", 61.5, 30.6, "B0403+30"),
        ("J1713+0747", 258.4, 7.8, "B1711+07"),
        ("J2000+0404", 300.0, 4.1, "PSR2000"),
    ] {
        let fields = Params::new()
            .with("name", name)
            .with("ra", ra)
            .with("dec", dec)
            .with("aliases", vec![alias]);
        db.post(EntityKind::Pulsar, &fields, Some(TEST_KEY))
            .await
            .unwrap();
    }

    let arecibo = Params::new()
        .with("name", "Arecibo")
        .with("aliases", vec!["AO"])
        .with("receivers", vec!["430", "L-wide"])
        .with("backends", vec!["PUPPI"]);
    db.post(EntityKind::Telescope, &arecibo, Some(TEST_KEY))
        .await
        .unwrap();
    let vla = Params::new()
        .with("name", "VLA")
        .with("receivers", vec!["L-band"])
        .with("backends", vec!["YUPPI"]);
    db.post(EntityKind::Telescope, &vla, Some(TEST_KEY))
        .await
        .unwrap();

    (db, repo)
}

/// Post fields for an observation with a required-field baseline.
pub fn observation_fields(
    pulsar: &str,
    telescope: &str,
    frequency: &str,
    start: &str,
    stop: &str,
) -> Params {
    Params::new()
        .with("pulsar", pulsar)
        .with("telescope", telescope)
        .with("frequency", frequency)
        .with("project", "P2780")
        .with("submitter", "observer")
        .with("start", start)
        .with("stop", stop)
}
