//! End-to-end tests for the collection façade: posting, querying and rendering.

mod support;

use pulsardb::db::repository::{CatalogRepository, ObservationRepository};
use pulsardb::format::{OutputFormat, Rendered};
use pulsardb::models::{CatalogKind, EntityKind};
use pulsardb::query::Params;
use pulsardb::services::Posted;
use pulsardb::PulsarDbError;

use support::{observation_fields, seeded_db, TEST_KEY};

#[tokio::test]
async fn test_arecibo_vla_scenario() {
    let (db, _repo) = seeded_db().await;

    let fields = observation_fields("J0406+30", "Arecibo", "200MHz", "2022-02-01", "2022-02-02");
    let posted = db
        .post(EntityKind::Observation, &fields, Some(TEST_KEY))
        .await
        .unwrap();
    let Posted::Observation(obs) = posted else {
        panic!("expected an observation");
    };
    assert_eq!(obs.telescope, "Arecibo");
    assert_eq!(obs.frequency.value(), 200.0);

    let at_arecibo = Params::new()
        .with("telescope", "Arecibo")
        .with("min_time", "2019-12-01");
    let results = db.observations().query(&at_arecibo).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, obs.id);

    let at_vla = Params::new()
        .with("telescope", "VLA")
        .with("min_time", "2019-12-01");
    assert!(db.observations().query(&at_vla).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_post_resolves_aliases_to_canonical_names() {
    let (db, _repo) = seeded_db().await;

    let fields = observation_fields("B0403+30", "AO", "1.4 GHz", "59611", "59612");
    let obs = db.observations().post(&fields, Some(TEST_KEY)).await.unwrap();

    assert_eq!(obs.pulsar, "J0406+30");
    assert_eq!(obs.telescope, "Arecibo");
    assert!((obs.frequency.value() - 1400.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_post_without_key_creates_nothing() {
    let (db, repo) = seeded_db().await;
    let fields = observation_fields("J0406+30", "Arecibo", "430", "2022-02-01", "2022-02-02");

    let missing = db.observations().post(&fields, None).await;
    assert!(matches!(missing, Err(PulsarDbError::Authentication(_))));

    let wrong = db.observations().post(&fields, Some("guess")).await;
    assert!(matches!(wrong, Err(PulsarDbError::Authentication(_))));

    let pulsar = Params::new()
        .with("name", "J0000+0000")
        .with("ra", 0.0)
        .with("dec", 0.0);
    let rejected = db.pulsars().post(&pulsar, Some("guess")).await;
    assert!(matches!(rejected, Err(PulsarDbError::Authentication(_))));

    assert_eq!(repo.count_observations().await.unwrap(), 0);
    assert_eq!(repo.pulsar_count(), 3);
}

#[tokio::test]
async fn test_default_key_is_used_when_none_is_passed() {
    let (_, repo) = seeded_db().await;
    let credentials = support::test_credentials().with_default_key(TEST_KEY);
    let db = pulsardb::PulsarDb::new(repo.clone(), credentials);

    let fields = observation_fields("J0406+30", "Arecibo", "430", "2022-02-01", "2022-02-02");
    db.observations().post(&fields, None).await.unwrap();
    assert_eq!(repo.count_observations().await.unwrap(), 1);
}

#[tokio::test]
async fn test_unknown_telescope_is_a_reference_error() {
    let (db, repo) = seeded_db().await;
    let fields = observation_fields("J0406+30", "GBT", "820", "2022-02-01", "2022-02-02");

    match db.observations().post(&fields, Some(TEST_KEY)).await {
        Err(PulsarDbError::Reference { entity, name }) => {
            assert_eq!(entity, EntityKind::Telescope);
            assert_eq!(name, "GBT");
        }
        other => panic!("expected a reference error, got {:?}", other),
    }
    assert_eq!(repo.count_observations().await.unwrap(), 0);
}

#[tokio::test]
async fn test_observation_post_validation() {
    let (db, repo) = seeded_db().await;
    let key = Some(TEST_KEY);

    let zero_frequency = observation_fields("J0406+30", "AO", "0 MHz", "2022-02-01", "2022-02-02");
    assert!(matches!(
        db.observations().post(&zero_frequency, key).await,
        Err(PulsarDbError::Validation(_))
    ));

    let reversed = observation_fields("J0406+30", "AO", "430", "2022-02-02", "2022-02-01");
    assert!(matches!(
        db.observations().post(&reversed, key).await,
        Err(PulsarDbError::Validation(_))
    ));

    let unknown_field =
        observation_fields("J0406+30", "AO", "430", "2022-02-01", "2022-02-02").with("seeing", 1.0);
    assert!(matches!(
        db.observations().post(&unknown_field, key).await,
        Err(PulsarDbError::Validation(_))
    ));

    let no_window_end = Params::new()
        .with("pulsar", "J0406+30")
        .with("telescope", "AO")
        .with("frequency", "430")
        .with("project", "P1")
        .with("submitter", "someone")
        .with("start", "2022-02-01");
    assert!(matches!(
        db.observations().post(&no_window_end, key).await,
        Err(PulsarDbError::Validation(_))
    ));

    let both_ends = observation_fields("J0406+30", "AO", "430", "2022-02-01", "2022-02-02")
        .with("duration", qtty::Seconds::new(60.0));
    assert!(matches!(
        db.observations().post(&both_ends, key).await,
        Err(PulsarDbError::Validation(_))
    ));

    assert_eq!(repo.count_observations().await.unwrap(), 0);
}

#[tokio::test]
async fn test_duration_sets_the_window_end() {
    let (db, _repo) = seeded_db().await;
    let fields = Params::new()
        .with("pulsar", "J1713+0747")
        .with("telescope", "VLA")
        .with("frequency", 1500.0)
        .with("project", "NANOGrav")
        .with("submitter", "someone")
        .with("start", 59000.0)
        .with("duration", qtty::Seconds::new(43200.0))
        .with("backend", "YUPPI");

    let obs = db.observations().post(&fields, Some(TEST_KEY)).await.unwrap();
    assert!((obs.stop.value() - 59000.5).abs() < 1e-9);
    assert_eq!(obs.backend.as_deref(), Some("YUPPI"));
    assert_eq!(obs.receiver, None);
    assert_eq!(obs.notes, "");
}

#[tokio::test]
async fn test_numeric_submitter_is_stored_as_text() {
    let (db, _repo) = seeded_db().await;
    let fields = Params::new()
        .with("pulsar", "J0406+30")
        .with("telescope", "AO")
        .with("frequency", "430")
        .with("project", 2780.0)
        .with("submitter", 42.0)
        .with("start", "2022-02-01")
        .with("stop", "2022-02-02");

    let obs = db.observations().post(&fields, Some(TEST_KEY)).await.unwrap();
    assert_eq!(obs.submitter, "42");
    assert_eq!(obs.project, "2780");

    let by_project = db
        .observations()
        .query(&Params::new().with("project", "2780"))
        .await
        .unwrap();
    assert_eq!(by_project.len(), 1);
}

#[tokio::test]
async fn test_pulsar_post_rejects_out_of_range_coordinates() {
    let (db, _repo) = seeded_db().await;
    let bad_dec = Params::new()
        .with("name", "J0000+9999")
        .with("ra", 10.0)
        .with("dec", 95.0);
    assert!(matches!(
        db.pulsars().post(&bad_dec, Some(TEST_KEY)).await,
        Err(PulsarDbError::Validation(_))
    ));

    let missing_ra = Params::new().with("name", "J0000+0000").with("dec", 0.0);
    assert!(matches!(
        db.pulsars().post(&missing_ra, Some(TEST_KEY)).await,
        Err(PulsarDbError::Validation(_))
    ));
}

#[tokio::test]
async fn test_alias_collision_leaves_state_unchanged() {
    let (db, repo) = seeded_db().await;

    // Collides with a canonical name.
    let result = db
        .pulsars()
        .add_alias("J0406+30", "J1713+0747", Some(TEST_KEY))
        .await;
    assert!(matches!(result, Err(PulsarDbError::Validation(_))));

    // Collides with another pulsar's alias.
    let result = db
        .pulsars()
        .add_alias("J0406+30", "B1711+07", Some(TEST_KEY))
        .await;
    assert!(matches!(result, Err(PulsarDbError::Validation(_))));

    // A new pulsar carrying an existing alias is rejected as a whole.
    let duplicate = Params::new()
        .with("name", "J9999+9")
        .with("ra", 1.0)
        .with("dec", 1.0)
        .with("aliases", vec!["PSR2000"]);
    assert!(matches!(
        db.pulsars().post(&duplicate, Some(TEST_KEY)).await,
        Err(PulsarDbError::Validation(_))
    ));

    assert_eq!(repo.pulsar_count(), 3);
    assert_eq!(
        repo.find_canonical(CatalogKind::Pulsar, "B1711+07")
            .await
            .unwrap()
            .as_deref(),
        Some("J1713+0747")
    );
    assert_eq!(
        repo.find_canonical(CatalogKind::Pulsar, "J9999+9").await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_alias_namespaces_are_per_entity_type() {
    let (db, _repo) = seeded_db().await;
    // "AO" is a telescope alias; a pulsar may use it too.
    let canonical = db
        .pulsars()
        .add_alias("J0406+30", "AO", Some(TEST_KEY))
        .await
        .unwrap();
    assert_eq!(canonical, "J0406+30");

    let by_alias = db
        .pulsars()
        .query(&Params::new().with("name", "AO"))
        .await
        .unwrap();
    assert_eq!(by_alias.len(), 1);
    assert_eq!(by_alias[0].name, "J0406+30");
}

#[tokio::test]
async fn test_add_alias_to_unknown_entry_is_a_reference_error() {
    let (db, _repo) = seeded_db().await;
    let result = db
        .telescopes()
        .add_alias("Effelsberg", "EFF", Some(TEST_KEY))
        .await;
    assert!(matches!(result, Err(PulsarDbError::Reference { .. })));
}

#[tokio::test]
async fn test_infer_telescope() {
    let (db, _repo) = seeded_db().await;
    let found = db.telescopes().infer("L-wide", "PUPPI").await.unwrap();
    assert_eq!(found.map(|t| t.name), Some("Arecibo".to_string()));

    assert!(db.telescopes().infer("L-wide", "YUPPI").await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_renders_each_format() {
    let (db, _repo) = seeded_db().await;
    let params = Params::new().with("sort", "-ra");

    let Rendered::Json(json) = db.pulsars().get(&params, OutputFormat::Json).await.unwrap() else {
        panic!("expected json");
    };
    assert_eq!(json["count"], 3);
    assert_eq!(json["results"][0]["name"], "J2000+0404");

    let Rendered::Table(table) = db.get(EntityKind::Telescope, &Params::new(), OutputFormat::Table)
        .await
        .unwrap()
    else {
        panic!("expected table");
    };
    let lines: Vec<&str> = table.lines().collect();
    assert!(lines[0].starts_with("name"));
    assert!(table.contains("Arecibo"));
    assert!(table.contains("VLA"));

    let Rendered::Frame(frame) = db.pulsars().get(&params, OutputFormat::Frame).await.unwrap()
    else {
        panic!("expected frame");
    };
    assert_eq!(frame.len(), 3);
    assert_eq!(frame.columns, vec!["name", "ra", "dec", "aliases"]);
    assert_eq!(frame.column("name").unwrap()[2], "J0406+30");
}

#[tokio::test]
async fn test_empty_result_is_success() {
    let (db, _repo) = seeded_db().await;
    let params = Params::new().with("project", "NOBODY");
    let rendered = db.observations().get(&params, OutputFormat::Json).await.unwrap();
    let Rendered::Json(json) = rendered else {
        panic!("expected json");
    };
    assert_eq!(json["count"], 0);
    assert_eq!(json["results"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_storage_failure_surfaces_as_repository_error() {
    let (db, repo) = seeded_db().await;
    repo.set_healthy(false);

    assert!(!db.health_check().await.unwrap_or(false));
    let result = db.pulsars().query(&Params::new()).await;
    assert!(matches!(result, Err(PulsarDbError::Repository(_))));
}
