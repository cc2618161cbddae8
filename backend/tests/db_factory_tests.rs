//! Tests for repository creation, snapshots and configuration-driven credentials.

mod support;

use std::str::FromStr;

use pulsardb::auth::{ApiKeyRegistry, Credentials};
use pulsardb::db::factory::{REPOSITORY_TYPE_ENV, SNAPSHOT_ENV};
use pulsardb::db::repository::{CatalogRepository, ObservationRepository, RepositoryError};
use pulsardb::db::{RepositoryBuilder, RepositoryConfig, RepositoryFactory, RepositoryType};
use pulsardb::models::{CatalogKind, EntityKind};
use pulsardb::query::Params;
use pulsardb::{PulsarDb, PulsarDbError};

use support::{observation_fields, seeded_db, with_scoped_env, TEST_KEY};

#[test]
fn test_repository_type_from_str() {
    assert_eq!(RepositoryType::from_str("local").unwrap(), RepositoryType::Local);
    assert_eq!(RepositoryType::from_str("LOCAL").unwrap(), RepositoryType::Local);
    assert_eq!(RepositoryType::from_str("memory").unwrap(), RepositoryType::Local);

    let err = RepositoryType::from_str("postgres").unwrap_err();
    assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
}

#[test]
fn test_repository_type_from_env() {
    with_scoped_env(&[(REPOSITORY_TYPE_ENV, None)], || {
        assert_eq!(RepositoryType::from_env().unwrap(), RepositoryType::Local);
    });
    with_scoped_env(&[(REPOSITORY_TYPE_ENV, Some("memory"))], || {
        assert_eq!(RepositoryType::from_env().unwrap(), RepositoryType::Local);
    });
    with_scoped_env(&[(REPOSITORY_TYPE_ENV, Some("mongodb"))], || {
        assert!(RepositoryType::from_env().is_err());
    });
}

#[tokio::test]
async fn test_snapshot_round_trip_through_factory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pulsars.json");

    let (db, repo) = seeded_db().await;
    let fields = observation_fields("J0406+30", "AO", "430", "2022-02-01", "2022-02-02");
    db.observations().post(&fields, Some(TEST_KEY)).await.unwrap();
    repo.save_snapshot(&path).unwrap();

    let reopened = RepositoryFactory::open_snapshot(&path).unwrap();
    assert_eq!(reopened.pulsar_count(), 3);
    assert_eq!(reopened.telescope_count(), 2);
    assert_eq!(reopened.count_observations().await.unwrap(), 1);
    assert_eq!(
        reopened
            .find_canonical(CatalogKind::Telescope, "AO")
            .await
            .unwrap()
            .as_deref(),
        Some("Arecibo")
    );

    // Ids continue after the stored observations.
    let db = PulsarDb::new(reopened, support::test_credentials());
    let next = db.observations().post(&fields, Some(TEST_KEY)).await.unwrap();
    assert_eq!(next.id.value(), 2);
}

#[tokio::test]
async fn test_missing_snapshot_opens_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let repo = RepositoryFactory::open_snapshot(&dir.path().join("absent.json")).unwrap();
    assert_eq!(repo.pulsar_count(), 0);
    assert!(repo.health_check().await.unwrap());
}

#[tokio::test]
async fn test_corrupt_snapshot_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        RepositoryFactory::open_snapshot(&path),
        Err(RepositoryError::SnapshotError { .. })
    ));
}

#[tokio::test]
async fn test_snapshot_with_dangling_observation_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pulsars.json");
    let (db, repo) = seeded_db().await;
    let fields = observation_fields("J0406+30", "AO", "430", "2022-02-01", "2022-02-02");
    db.observations().post(&fields, Some(TEST_KEY)).await.unwrap();
    repo.save_snapshot(&path).unwrap();

    // Hand edit: the observation now names a telescope the file does not list.
    let edited = std::fs::read_to_string(&path)
        .unwrap()
        .replace("\"telescope\": \"Arecibo\"", "\"telescope\": \"Effelsberg\"");
    std::fs::write(&path, edited).unwrap();

    match RepositoryFactory::open_snapshot(&path) {
        Err(RepositoryError::ValidationError { context, .. }) => {
            assert_eq!(context.operation.as_deref(), Some("load_snapshot"));
            assert_eq!(context.name.as_deref(), Some("1"));
        }
        Err(other) => panic!("expected an invalid observation, got {}", other),
        Ok(_) => panic!("dangling telescope reference was accepted"),
    }
}

#[tokio::test]
async fn test_builder_reads_snapshot_env() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("env.json");
    let (_, seeded) = seeded_db().await;
    seeded.save_snapshot(&path).unwrap();

    let path_text = path.to_string_lossy().to_string();
    let builder = with_scoped_env(
        &[
            (REPOSITORY_TYPE_ENV, Some("local")),
            (SNAPSHOT_ENV, Some(path_text.as_str())),
        ],
        || RepositoryBuilder::new().from_env().unwrap(),
    );
    let repo = builder.build().await.unwrap();
    let pulsars = repo.select_pulsars(&[]).await.unwrap();
    assert_eq!(pulsars.len(), 3);
}

#[tokio::test]
async fn test_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("db.json");
    let (_, seeded) = seeded_db().await;
    seeded.save_snapshot(&snapshot).unwrap();

    let config_path = dir.path().join("pulsardb.toml");
    let toml = format!(
        "[repository]\ntype = \"local\"\nsnapshot = {:?}\n",
        snapshot.to_string_lossy()
    );
    std::fs::write(&config_path, toml).unwrap();

    let repo = RepositoryFactory::from_config_file(&config_path).await.unwrap();
    assert_eq!(repo.select_telescopes(&[]).await.unwrap().len(), 2);

    let config = RepositoryConfig::from_file(&config_path).unwrap();
    assert_eq!(config.repository.snapshot.as_deref(), Some(snapshot.as_path()));
}

#[tokio::test]
async fn test_config_credentials_take_default_key_from_env() {
    let toml = format!(
        r#"
[repository]
type = "local"

[auth]
api_key_env = "PULSARDB_TEST_DEFAULT_KEY"
accepted_key_hashes = ["{}"]
"#,
        ApiKeyRegistry::hash_key(TEST_KEY)
    );
    let config: RepositoryConfig = toml::from_str(&toml).unwrap();

    let credentials = with_scoped_env(&[("PULSARDB_TEST_DEFAULT_KEY", Some(TEST_KEY))], || {
        config.credentials().unwrap()
    });
    assert_eq!(credentials.default_key(), Some(TEST_KEY));

    let repo = RepositoryFactory::create_local();
    let db = PulsarDb::new(repo, credentials);
    let fields = Params::new()
        .with("name", "Effelsberg")
        .with("aliases", vec!["EFF"]);
    db.post(EntityKind::Telescope, &fields, None).await.unwrap();

    // An explicit wrong key is not rescued by the default.
    let other = Params::new().with("name", "Parkes");
    assert!(matches!(
        db.post(EntityKind::Telescope, &other, Some("wrong")).await,
        Err(PulsarDbError::Authentication(_))
    ));
}

#[test]
fn test_credentials_from_api_key_env() {
    let registry = ApiKeyRegistry::new().with_key(TEST_KEY);

    let credentials = with_scoped_env(&[("PULSAR_API_KEY", None)], || {
        Credentials::from_env(registry.clone())
    });
    assert_eq!(credentials.default_key(), None);
    assert!(matches!(
        credentials.authenticate(None),
        Err(PulsarDbError::Authentication(_))
    ));

    let credentials = with_scoped_env(&[("PULSAR_API_KEY", Some(TEST_KEY))], || {
        Credentials::from_env(registry.clone())
    });
    assert!(credentials.authenticate(None).is_ok());
    // Debug output never shows the key.
    assert!(!format!("{:?}", credentials).contains(TEST_KEY));
}
